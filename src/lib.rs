pub mod archive;
pub mod assembler;
pub mod document;
pub mod error;
pub mod geometry;
pub mod gml;
pub mod identifiers;
pub mod model;
pub mod replace;
pub mod sanitize;
pub mod schema;
pub mod settings;
pub mod validation;

pub use assembler::{assemble, AssembledPlan};
pub use document::{Document, Element};
pub use error::{Result, XPlanError};
pub use geometry::{BoundingBox, NormalizedGeometry};
pub use model::{PlanAttributes, Warning};
pub use replace::{replace_geometry, replace_geometry_file, ReplaceReport};
pub use sanitize::sanitize_file_name;
pub use schema::PlanCategory;
pub use settings::{Settings, Tool};
