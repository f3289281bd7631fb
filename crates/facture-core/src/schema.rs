use std::collections::BTreeMap;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Table schemas keyed by table name.
pub type Tables = BTreeMap<String, TableConfig>;

/// Per-table schema: optional injection target and ordered attribute rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TableConfig {
    /// Name of the target that rows of this table are injected into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Attribute rules in declaration order. Rendering follows this order.
    #[serde(default)]
    pub attrs: Vec<AttrSpec>,
}

impl TableConfig {
    /// Attributes generated from a sequence, in declaration order.
    pub fn seq_attrs(&self) -> impl Iterator<Item = (&str, &SeqRule)> {
        self.attrs
            .iter()
            .filter_map(|attr| attr.seq.as_ref().map(|seq| (attr.name.as_str(), seq)))
    }

    /// Attributes carrying a fixed default, in declaration order.
    pub fn default_attrs(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attrs
            .iter()
            .filter_map(|attr| attr.default.as_ref().map(|value| (attr.name.as_str(), value)))
    }

    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.iter().map(|attr| attr.name.as_str())
    }

    pub fn attr(&self, name: &str) -> Option<&AttrSpec> {
        self.attrs.iter().find(|attr| attr.name == name)
    }
}

/// A single attribute of a table and how its value is produced.
///
/// An attribute with neither `default` nor `seq` is a plain column: rows must
/// supply it through literal attributes or references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AttrSpec {
    pub name: String,
    /// Fixed value used when a row does not supply one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Sequence generation for this attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<SeqRule>,
}

impl AttrSpec {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            seq: None,
        }
    }

    pub fn with_default(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            default: Some(value.into()),
            seq: None,
        }
    }

    pub fn with_seq(name: impl Into<String>, start: i64) -> Self {
        Self {
            name: name.into(),
            default: None,
            seq: Some(SeqRule { start }),
        }
    }
}

/// Sequence rule: the first value handed out for a (table, attribute) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SeqRule {
    pub start: i64,
}

/// Output destination declared by the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TargetSpec {
    pub name: String,
    /// File holding the `facture_json` markers for this target.
    pub filename: PathBuf,
    /// Target kind; only `section_in_file` is produced by facture today.
    #[serde(rename = "type", default = "default_target_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
}

impl TargetSpec {
    pub fn section_in_file(name: impl Into<String>, filename: impl Into<PathBuf>) -> Self {
        let name = name.into();
        Self {
            section_name: Some(name.clone()),
            name,
            filename: filename.into(),
            kind: default_target_kind(),
        }
    }
}

fn default_target_kind() -> String {
    "section_in_file".to_string()
}
