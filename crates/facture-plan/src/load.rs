use std::path::{Path, PathBuf};

use facture_core::ReferenceRegistry;
use serde_json::Value;

use crate::errors::{PlanError, Result, ValidationIssue};
use crate::model::FactureConfig;
use crate::schema::config_json_schema_value;
use crate::validate::validate_config;

pub const CONFIG_FILE_TOML: &str = "facture.toml";
pub const CONFIG_FILE_JSON: &str = "facture.json";

/// A configuration read from disk and validated.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: FactureConfig,
    pub warnings: Vec<ValidationIssue>,
}

/// Locate the configuration file inside `conf_dir`, preferring `facture.toml`.
pub fn find_config_file(conf_dir: &Path) -> Result<PathBuf> {
    if !conf_dir.is_dir() {
        return Err(PlanError::NotFound(format!(
            "conf-dir {} does not exist",
            conf_dir.display()
        )));
    }

    [CONFIG_FILE_TOML, CONFIG_FILE_JSON]
        .iter()
        .map(|name| conf_dir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            PlanError::NotFound(
                "Either put a facture.toml file in this directory or set --conf-dir".to_string(),
            )
        })
}

/// Read a configuration file as a JSON value. `.json` files are parsed as
/// JSON, everything else as TOML.
pub fn read_config_value(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        return Ok(serde_json::from_str(&contents)?);
    }

    toml::from_str(&contents).map_err(|source| PlanError::TomlDecode {
        path: path.to_path_buf(),
        source,
    })
}

/// Read, structurally validate, decode and semantically validate a configuration file.
pub fn load_config(path: &Path, registry: &ReferenceRegistry) -> Result<LoadedConfig> {
    let value = read_config_value(path)?;
    let schema = config_json_schema_value()?;
    let validated = validate_config(&value, &schema, registry).map_err(PlanError::Invalid)?;
    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config: validated.config,
        warnings: validated.warnings,
    })
}

/// [`find_config_file`] followed by [`load_config`].
pub fn load_config_dir(conf_dir: &Path, registry: &ReferenceRegistry) -> Result<LoadedConfig> {
    let path = find_config_file(conf_dir)?;
    load_config(&path, registry)
}
