use chrono::NaiveDate;
use pyo3::exceptions::{PyIOError, PyValueError};
use pyo3::prelude::*;
use std::path::{Path, PathBuf};
use ::xplan_umring::{
    assemble, NormalizedGeometry, PlanAttributes, PlanCategory, ReplaceReport, Settings,
    XPlanError,
};

#[pymodule]
fn xplan_umring(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPlanArchive>()?;
    m.add_class::<PyReplaceReport>()?;
    m.add_function(wrap_pyfunction!(build_plan_archive, m)?)?;
    m.add_function(wrap_pyfunction!(replace_geometry, m)?)?;
    m.add_function(wrap_pyfunction!(sanitize_file_name, m)?)?;
    m.add_function(wrap_pyfunction!(check_plan_name, m)?)?;
    Ok(())
}

fn to_py_err(e: XPlanError) -> PyErr {
    match e {
        XPlanError::Io(e) => PyErr::new::<PyIOError, _>(e.to_string()),
        other => PyErr::new::<PyValueError, _>(other.to_string()),
    }
}

fn parse_date(field: &str, value: Option<&str>) -> PyResult<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| {
                PyErr::new::<PyValueError, _>(format!(
                    "{field} must be YYYY-MM-DD, got '{value}': {e}"
                ))
            }),
        None => Ok(None),
    }
}

#[pyclass(name = "PlanArchive")]
#[derive(Clone)]
pub struct PyPlanArchive {
    #[pyo3(get)]
    pub path: String,
    #[pyo3(get)]
    pub file_stem: String,
    #[pyo3(get)]
    pub warnings: Vec<String>,
}

#[pymethods]
impl PyPlanArchive {
    fn __repr__(&self) -> String {
        format!(
            "PlanArchive(path='{}', warnings={})",
            self.path,
            self.warnings.len()
        )
    }
}

#[pyclass(name = "ReplaceReport")]
#[derive(Clone)]
pub struct PyReplaceReport {
    #[pyo3(get)]
    pub version: String,
    #[pyo3(get)]
    pub plan_record: String,
    #[pyo3(get)]
    pub crs: String,
}

impl From<ReplaceReport> for PyReplaceReport {
    fn from(report: ReplaceReport) -> Self {
        PyReplaceReport {
            version: report.version,
            plan_record: report.plan_record,
            crs: report.crs,
        }
    }
}

#[pymethods]
impl PyReplaceReport {
    fn __repr__(&self) -> String {
        format!(
            "ReplaceReport(version='{}', plan_record='{}', crs='{}')",
            self.version, self.plan_record, self.crs
        )
    }
}

/// Builds `<output_dir>/<sanitized name>.zip` from a GeoJSON boundary.
///
/// Unset municipality, AGS and district are taken from the settings file
/// when one is given; the file is updated afterwards.
#[pyfunction]
#[pyo3(signature = (
    category,
    boundary,
    output_dir,
    name,
    number=None,
    municipality=None,
    district=None,
    ags=None,
    authority=None,
    description=None,
    comment=None,
    plan_type=1000,
    status="1000",
    date=None,
    crs="EPSG:25832",
    scale=None,
    production_date=None,
    federal_state=None,
    external_effect=None,
    settings_path=None,
))]
#[allow(clippy::too_many_arguments)]
pub fn build_plan_archive(
    category: &str,
    boundary: &str,
    output_dir: &str,
    name: &str,
    number: Option<String>,
    municipality: Option<String>,
    district: Option<String>,
    ags: Option<String>,
    authority: Option<String>,
    description: Option<String>,
    comment: Option<String>,
    plan_type: u16,
    status: &str,
    date: Option<&str>,
    crs: &str,
    scale: Option<u32>,
    production_date: Option<&str>,
    federal_state: Option<u16>,
    external_effect: Option<bool>,
    settings_path: Option<PathBuf>,
) -> PyResult<PyPlanArchive> {
    let category: PlanCategory = category.parse().map_err(to_py_err)?;
    let schema = category.schema();
    let status = schema.status(status).ok_or_else(|| {
        PyErr::new::<PyValueError, _>(format!(
            "Unknown {} status '{}'",
            schema.display_name, status
        ))
    })?;

    let settings = match &settings_path {
        Some(path) => Settings::load(path).map_err(to_py_err)?,
        None => Settings::default(),
    };

    let geometry = NormalizedGeometry::read_geojson(Path::new(boundary)).map_err(to_py_err)?;

    let attributes = PlanAttributes {
        name: name.to_string(),
        number,
        municipality,
        district,
        municipality_key: ags,
        authority,
        description,
        comment,
        plan_type,
        legal_status: status.code,
        status_date: parse_date("date", date)?,
        crs: crs.to_string(),
        scale,
        production_date: parse_date("production_date", production_date)?,
        federal_state,
        external_effect,
    };

    let plan = assemble(category, &attributes, &geometry, &settings).map_err(to_py_err)?;
    let path = plan
        .write_archive(Path::new(output_dir))
        .map_err(to_py_err)?;

    if let Some(settings_path) = &settings_path {
        plan.settings.save(settings_path).map_err(to_py_err)?;
    }

    Ok(PyPlanArchive {
        path: path.display().to_string(),
        file_stem: plan.file_stem,
        warnings: plan.warnings.iter().map(|w| w.to_string()).collect(),
    })
}

#[pyfunction]
pub fn replace_geometry(gml_path: &str, boundary: &str, output_path: &str) -> PyResult<PyReplaceReport> {
    let geometry = NormalizedGeometry::read_geojson(Path::new(boundary)).map_err(to_py_err)?;
    let report = ::xplan_umring::replace_geometry_file(
        Path::new(gml_path),
        &geometry,
        Path::new(output_path),
    )
    .map_err(to_py_err)?;
    Ok(report.into())
}

#[pyfunction]
pub fn sanitize_file_name(name: &str) -> String {
    ::xplan_umring::sanitize_file_name(name)
}

/// Warnings the xPlanBox import would raise for this plan name.
#[pyfunction]
pub fn check_plan_name(name: &str) -> Vec<String> {
    ::xplan_umring::validation::check_plan_name(name)
        .iter()
        .map(|w| w.to_string())
        .collect()
}
