//! Configuration contracts and validation for facture.
//!
//! A configuration (`facture.toml` or `facture.json`) declares table schemas,
//! groups of rows and injection targets. Loading checks the document against
//! the generated JSON Schema, decodes it, then runs semantic checks that
//! produce a [`ValidationReport`].

pub mod errors;
pub mod load;
pub mod model;
pub mod schema;
pub mod validate;

pub use errors::{IssueSeverity, PlanError, Result, ValidationIssue, ValidationReport};
pub use load::{
    CONFIG_FILE_JSON, CONFIG_FILE_TOML, LoadedConfig, find_config_file, load_config,
    load_config_dir, read_config_value,
};
pub use model::{FactureConfig, GroupConfig, ReferenceSpec, RowBody, RowEntry};
pub use schema::{config_json_schema, config_json_schema_value};
pub use validate::{
    ValidatedConfig, validate_config, validate_config_json, validate_config_semantics,
};
