use tracing::debug;

use facture_core::{Attrs, FactureError, Group, Result, Tables, describe_attrs};

/// Stage the table's schema defaults on every row.
///
/// Explicit `null` defaults are treated as absent.
pub fn add_table_defaults(mut groups: Vec<Group>, tables: &Tables) -> Result<Vec<Group>> {
    for group in &mut groups {
        for row in &mut group.data {
            let table_conf = tables.get(&row.table).ok_or_else(|| {
                FactureError::conf(format!("table \"{}\" has no default attrs conf", row.table))
            })?;
            row.defaults = table_conf
                .default_attrs()
                .filter(|(_, value)| !value.is_null())
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect();
        }
    }
    Ok(groups)
}

/// Union of two maps. A key present in both with different values is fatal.
pub fn careful_merge(mut base: Attrs, other: &Attrs) -> Result<Attrs> {
    let conflicting = other
        .iter()
        .any(|(key, value)| base.get(key).is_some_and(|existing| existing != value));
    if conflicting {
        return Err(FactureError::conf(format!(
            "There were overlapping keys in merging dictionaries: {}, {}",
            describe_attrs(&base),
            describe_attrs(other)
        )));
    }
    base.extend(other.iter().map(|(key, value)| (key.clone(), value.clone())));
    Ok(base)
}

/// Build `combined`: defaults, overlaid by references, overlaid by literal
/// attributes, then merged with the generated values.
pub fn combine_all_into_result(mut groups: Vec<Group>) -> Result<Vec<Group>> {
    for group in &mut groups {
        for row in &mut group.data {
            let mut layered = row.defaults.clone();
            layered.extend(row.referenced.clone());
            layered.extend(row.raw.attrs.clone());
            row.combined = careful_merge(layered, &row.generated)?;
        }
        debug!(group = %group.group, "rows combined");
    }
    Ok(groups)
}
