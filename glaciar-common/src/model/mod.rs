//! Project model
//!
//! One business entity: the engineering-service project ("proyecto").

pub mod fields;
pub mod project;

pub use fields::{field_spec, FieldKind, FieldSpec, FIELDS};
pub use project::{Estado, Project, ProjectFields, DEFAULT_MONTO_MAX, STATUS_OPTIONS};
