use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::reference::ReferenceObject;
use crate::schema::TargetSpec;
use crate::value::Attrs;

/// Reference objects keyed by the attribute they produce.
pub type RefObjs = BTreeMap<String, Box<dyn ReferenceObject>>;

/// A group as supplied by the configuration, before normalization.
#[derive(Debug)]
pub struct GroupInput {
    pub group: String,
    pub offset: i64,
    pub data: Vec<RowInput>,
}

impl GroupInput {
    pub fn new(group: impl Into<String>, offset: i64) -> Self {
        Self {
            group: group.into(),
            offset,
            data: Vec::new(),
        }
    }

    pub fn row(mut self, row: RowInput) -> Self {
        self.data.push(row);
        self
    }
}

/// A terse row entry: `"<table> <alias>"` plus optional attrs, refs and ref objects.
#[derive(Debug)]
pub struct RowInput {
    pub tablestr: String,
    pub attrs: Attrs,
    pub refs: Attrs,
    pub ref_objs: RefObjs,
}

impl RowInput {
    pub fn new(tablestr: impl Into<String>) -> Self {
        Self {
            tablestr: tablestr.into(),
            attrs: Attrs::new(),
            refs: Attrs::new(),
            ref_objs: RefObjs::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn reference(mut self, name: impl Into<String>, refstr: impl Into<Value>) -> Self {
        self.refs.insert(name.into(), refstr.into());
        self
    }

    pub fn ref_obj(mut self, name: impl Into<String>, object: Box<dyn ReferenceObject>) -> Self {
        self.ref_objs.insert(name.into(), object);
        self
    }
}

/// A group flowing through the pipeline.
#[derive(Debug, Serialize)]
pub struct Group {
    pub group: String,
    pub offset: i64,
    pub data: Vec<RowSpec>,
}

/// The row input exactly as given, kept for the structured dump.
#[derive(Debug, Serialize)]
pub struct RawRow {
    pub tablestr: String,
    pub attrs: Attrs,
    pub refs: Attrs,
    #[serde(serialize_with = "serialize_ref_objs")]
    pub ref_objs: RefObjs,
}

impl From<RowInput> for RawRow {
    fn from(input: RowInput) -> Self {
        Self {
            tablestr: input.tablestr,
            attrs: input.attrs,
            refs: input.refs,
            ref_objs: input.ref_objs,
        }
    }
}

/// One declared entity of a group. Each stage fills in its own fields.
#[derive(Debug, Serialize)]
pub struct RowSpec {
    pub raw: RawRow,
    pub table: String,
    pub alias: String,
    pub generated: Attrs,
    pub referenced: Attrs,
    pub defaults: Attrs,
    pub combined: Attrs,
    pub target: Option<TargetSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_sql: Option<String>,
}

impl RowSpec {
    pub fn new(raw: RawRow, table: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            raw,
            table: table.into(),
            alias: alias.into(),
            generated: Attrs::new(),
            referenced: Attrs::new(),
            defaults: Attrs::new(),
            combined: Attrs::new(),
            target: None,
            output_sql: None,
        }
    }
}

fn serialize_ref_objs<S>(ref_objs: &RefObjs, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut map = serializer.serialize_map(Some(ref_objs.len()))?;
    for (name, object) in ref_objs {
        let description = serde_json::json!({
            "kind": object.kind(),
            "anchors": object.anchors(),
        });
        map.serialize_entry(name, &description)?;
    }
    map.end()
}
