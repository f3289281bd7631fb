use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::FactureConfig;

/// Emit the JSON Schema for `facture.toml` / `facture.json`.
pub fn config_json_schema() -> RootSchema {
    schema_for!(FactureConfig)
}

/// The configuration JSON Schema as a `serde_json::Value`.
pub fn config_json_schema_value() -> crate::Result<serde_json::Value> {
    Ok(serde_json::to_value(config_json_schema())?)
}
