use serde_json::Value;
use tracing::debug;

use facture_core::{Attrs, FactureError, Group, Result, RowSpec};

/// Leading character that marks a reference string (`.alias.key`).
pub const REFERENCE_SIGIL: char = '.';

/// Resolve `refs` and `ref_objs` of every row into `referenced`.
///
/// References only see rows of their own group, and only the attributes the
/// sequence stage generated for them.
pub fn enhance_with_references(mut groups: Vec<Group>) -> Result<Vec<Group>> {
    for group in &mut groups {
        for index in 0..group.data.len() {
            let referenced = referenced_for_row(&group.group, &group.data, &group.data[index])?;
            let mut ref_objs = std::mem::take(&mut group.data[index].raw.ref_objs);
            let mut evaluated = Attrs::new();
            for (name, object) in ref_objs.iter_mut() {
                for anchor in object.anchors() {
                    let value = point_to_alias(&anchor, &group.group, &group.data)?;
                    object.bind(&anchor, value);
                }
                evaluated.insert(name.clone(), object.eval()?);
            }

            let row = &mut group.data[index];
            row.raw.ref_objs = ref_objs;
            row.referenced = referenced;
            row.referenced.extend(evaluated);
        }
        debug!(group = %group.group, "references resolved");
    }
    Ok(groups)
}

fn referenced_for_row(group_name: &str, rows: &[RowSpec], row: &RowSpec) -> Result<Attrs> {
    let mut referenced = Attrs::new();
    for (name, value) in &row.raw.refs {
        let resolved = match value.as_str() {
            Some(refstr) if refstr.starts_with(REFERENCE_SIGIL) => {
                point_to_alias(refstr, group_name, rows)?
            }
            _ => value.clone(),
        };
        referenced.insert(name.clone(), resolved);
    }
    Ok(referenced)
}

/// Look up `.alias.key` among the rows of one group, reading the `generated` attributes.
pub fn point_to_alias(refstr: &str, group_name: &str, rows: &[RowSpec]) -> Result<Value> {
    let segments: Vec<&str> = refstr.split(REFERENCE_SIGIL).collect();
    let (alias, key) = match segments.as_slice() {
        ["", alias, key] => (*alias, *key),
        _ => {
            return Err(FactureError::conf(format!(
                "refstr \"{refstr}\" incorrectly formatted in group \"{group_name}\""
            )));
        }
    };

    let record = rows.iter().find(|row| row.alias == alias).ok_or_else(|| {
        FactureError::conf(format!(
            "refstr: alias \"{alias}\" does not exist in group \"{group_name}\""
        ))
    })?;

    match record.generated.get(key) {
        Some(value) if !value.is_null() => Ok(value.clone()),
        _ => Err(FactureError::conf(format!(
            "key \"{key}\" missing for alias \"{alias}\" in group \"{group_name}\""
        ))),
    }
}
