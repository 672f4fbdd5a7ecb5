use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use xplan_umring::{
    assemble, replace_geometry_file, NormalizedGeometry, PlanAttributes, PlanCategory, Settings,
    Tool,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (default: $XPLAN_UMRING_SETTINGS or ~/.config/xplan-umring/settings.json)
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bebauungsplan (zoning plan) to XPlanArchiv
    Bp(PlanArgs),
    /// Flächennutzungsplan (land-use plan) to XPlanArchiv
    Fp(PlanArgs),
    /// Landschaftsplan (landscape plan) to XPlanArchiv
    Lp(PlanArgs),
    /// Replace the boundary geometry of an existing XPlanGML file
    ReplaceGeometry(ReplaceArgs),
    /// Store the municipality preselected for new plans, e.g. "Viersen (05166032)"
    SetMunicipality {
        #[arg(value_name = "LABEL")]
        label: String,
    },
}

#[derive(Args, Debug)]
struct PlanArgs {
    /// GeoJSON with the boundary polygon, already in the target CRS
    #[arg(short, long, value_name = "GEOJSON")]
    input: PathBuf,

    /// Directory for <name>.zip
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,

    /// Plan name
    #[arg(long)]
    name: String,

    #[arg(long)]
    number: Option<String>,

    /// Municipality name (default: from settings)
    #[arg(long)]
    municipality: Option<String>,

    /// District (Ortsteil) name
    #[arg(long)]
    district: Option<String>,

    /// Amtlicher Gemeindeschlüssel, 8 digits (default: from settings)
    #[arg(long)]
    ags: Option<String>,

    /// Plangeber
    #[arg(long)]
    authority: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    comment: Option<String>,

    /// planArt code
    #[arg(long, default_value_t = 1000)]
    plan_type: u16,

    /// rechtsstand as code, label or alias (e.g. 4000, InkraftGetreten, in-force)
    #[arg(long, default_value = "1000")]
    status: String,

    /// Date belonging to the status (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    #[arg(long, default_value = xplan_umring::schema::DEFAULT_CRS)]
    crs: String,

    /// Erstellungsmaßstab
    #[arg(long)]
    scale: Option<u32>,

    /// technHerstellDatum (YYYY-MM-DD)
    #[arg(long)]
    production_date: Option<NaiveDate>,

    /// bundesland code (landscape plans)
    #[arg(long)]
    federal_state: Option<u16>,

    /// rechtlicheAussenwirkung (landscape plans)
    #[arg(long, action = clap::ArgAction::Set)]
    external_effect: Option<bool>,
}

#[derive(Args, Debug)]
struct ReplaceArgs {
    /// GeoJSON with the new boundary polygon, in the CRS of the document
    #[arg(short, long, value_name = "GEOJSON")]
    input: PathBuf,

    /// Existing XPlanGML file
    #[arg(long, value_name = "FILE")]
    gml: PathBuf,

    /// Output XPlanGML file
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let settings_path = cli.settings.clone().or_else(Settings::default_path);
    let settings = match &settings_path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let updated = match cli.command {
        Command::Bp(args) => build_plan(PlanCategory::Bebauungsplan, args, &settings)?,
        Command::Fp(args) => build_plan(PlanCategory::Flaechennutzungsplan, args, &settings)?,
        Command::Lp(args) => build_plan(PlanCategory::Landschaftsplan, args, &settings)?,
        Command::ReplaceGeometry(args) => {
            replace(&args)?;
            settings.remember(Tool::ReplaceGeometry, None)
        }
        Command::SetMunicipality { label } => {
            let mut updated = settings.clone();
            updated.select_municipality(&label);
            info!("Municipality set to {}", updated.municipality_label());
            updated
        }
    };

    if let Some(path) = settings_path {
        if let Err(e) = updated.save(&path) {
            warn!("Settings could not be saved to {}: {}", path.display(), e);
        }
    }

    Ok(())
}

fn build_plan(category: PlanCategory, args: PlanArgs, settings: &Settings) -> Result<Settings> {
    let schema = category.schema();
    let status = match schema.status(&args.status) {
        Some(status) => status,
        None => bail!(
            "Unknown {} status '{}', expected one of: {}",
            schema.display_name,
            args.status,
            schema
                .statuses
                .iter()
                .map(|s| format!("{} ({}, {})", s.code, s.label, s.alias))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };

    let geometry = read_geometry(&args.input)?;

    let attributes = PlanAttributes {
        name: args.name,
        number: args.number,
        municipality: args.municipality,
        district: args.district,
        municipality_key: args.ags,
        authority: args.authority,
        description: args.description,
        comment: args.comment,
        plan_type: args.plan_type,
        legal_status: status.code,
        status_date: args.date,
        crs: args.crs,
        scale: args.scale,
        production_date: args.production_date,
        federal_state: args.federal_state,
        external_effect: args.external_effect,
    };

    let plan = assemble(category, &attributes, &geometry, settings)
        .with_context(|| format!("Failed to assemble {category}"))?;

    fs::create_dir_all(&args.output)?;
    let path = plan.write_archive(&args.output)?;
    println!("{}", path.display());

    Ok(plan.settings)
}

fn replace(args: &ReplaceArgs) -> Result<()> {
    let geometry = read_geometry(&args.input)?;
    let report = replace_geometry_file(&args.gml, &geometry, &args.output)
        .with_context(|| format!("Failed to replace the geometry of {}", args.gml.display()))?;
    info!(
        "Geometry of {} (XPlanung {}, {}) replaced",
        report.plan_record, report.version, report.crs
    );
    println!("{}", args.output.display());
    Ok(())
}

fn read_geometry(path: &Path) -> Result<NormalizedGeometry> {
    NormalizedGeometry::read_geojson(path)
        .with_context(|| format!("Failed to read boundary from {}", path.display()))
}
