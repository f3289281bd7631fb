use std::collections::BTreeMap;

use serde_json::Value;

/// Attribute values keyed by attribute name.
pub type Attrs = BTreeMap<String, Value>;

/// Text used when a value is spliced into a larger string.
///
/// Strings are inserted without quotes; everything else uses its JSON form.
pub fn display_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Render an attribute map as `{a: 1, b: 'x'}` for error messages.
pub fn describe_attrs(attrs: &Attrs) -> String {
    let entries: Vec<String> = attrs
        .iter()
        .map(|(key, value)| format!("'{key}': {value}"))
        .collect();
    format!("{{{}}}", entries.join(", "))
}
