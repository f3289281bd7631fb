use facture_core::{Group, Result};

/// Pretty JSON dump of the final data set. Keys come out sorted.
pub fn dump_json(groups: &[Group]) -> Result<String> {
    let value = serde_json::to_value(groups)?;
    Ok(serde_json::to_string_pretty(&value)?)
}
