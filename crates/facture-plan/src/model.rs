use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use facture_core::{
    Attrs, GroupInput, ReferenceRegistry, Result as CoreResult, RowInput, Tables, TargetSpec,
};

/// Contents of `facture.toml` / `facture.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FactureConfig {
    /// Table schemas keyed by table name.
    #[serde(default)]
    pub tables: Tables,
    /// Groups of rows to generate, in generation order.
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
    /// Files and marked sections rows are injected into.
    #[serde(default)]
    pub targets: Vec<TargetSpec>,
}

/// A named group of rows sharing one offset.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GroupConfig {
    pub group: String,
    /// Added to every sequence value generated for this group.
    pub offset: i64,
    #[serde(default)]
    pub data: Vec<RowEntry>,
}

/// One row: `"<table> <alias>"`, optionally followed by a body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RowEntry {
    /// `"products p"`
    Short(String),
    /// `["products p"]`
    Single((String,)),
    /// `["workflows w", { refs = { ... } }]`
    Full((String, RowBody)),
}

impl RowEntry {
    pub fn tablestr(&self) -> &str {
        match self {
            RowEntry::Short(tablestr)
            | RowEntry::Single((tablestr,))
            | RowEntry::Full((tablestr, _)) => tablestr,
        }
    }

    pub fn body(&self) -> Option<&RowBody> {
        match self {
            RowEntry::Full((_, body)) => Some(body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RowBody {
    /// Literal attribute values. These win over references and defaults.
    #[serde(default)]
    pub attrs: Attrs,
    /// `.alias.key` references into the same group. Other values pass through.
    #[serde(default)]
    pub refs: Attrs,
    /// Deferred reference objects keyed by the attribute they produce.
    #[serde(default)]
    pub ref_objs: BTreeMap<String, ReferenceSpec>,
}

/// A reference object declaration: its kind plus kind-specific parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceSpec {
    pub kind: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl FactureConfig {
    /// Build the engine input, constructing reference objects through `registry`.
    pub fn to_group_inputs(&self, registry: &ReferenceRegistry) -> CoreResult<Vec<GroupInput>> {
        self.groups
            .iter()
            .map(|group| {
                let mut input = GroupInput::new(group.group.clone(), group.offset);
                for entry in &group.data {
                    input = input.row(row_input(entry, registry)?);
                }
                Ok(input)
            })
            .collect()
    }
}

fn row_input(entry: &RowEntry, registry: &ReferenceRegistry) -> CoreResult<RowInput> {
    let mut row = RowInput::new(entry.tablestr());
    let Some(body) = entry.body() else {
        return Ok(row);
    };
    row.attrs = body.attrs.clone();
    row.refs = body.refs.clone();
    for (name, spec) in &body.ref_objs {
        row = row.ref_obj(name.clone(), registry.build(&spec.kind, &spec.params)?);
    }
    Ok(row)
}
