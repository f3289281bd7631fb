//! SQL-style record blocks.
//!
//! Each row becomes a parenthesised block with one value per line, aligned so
//! the trailing `-- <attr>` comments form a column:
//!
//! ```text
//! -- facture_group_demo
//! (
//!   1100,           -- id
//!   'default name'  -- name
//! )
//! ```

use serde_json::Value;
use tracing::warn;

use facture_core::{FactureError, Group, Result, RowSpec, TableConfig, Tables};

pub const DEFAULT_INDENT: usize = 2;

/// Render `output_sql` for every row from its `combined` map, in schema order.
pub fn add_sql_output(mut groups: Vec<Group>, tables: &Tables, indent: usize) -> Result<Vec<Group>> {
    for group in &mut groups {
        for row in &mut group.data {
            let table_conf = tables.get(&row.table).ok_or_else(|| {
                FactureError::conf(format!("table \"{}\" has no conf", row.table))
            })?;
            let ordered = ordered_values(&group.group, row, table_conf)?;
            row.output_sql = Some(sql_output_lines_for(&group.group, &ordered, indent)?);
        }
    }
    Ok(groups)
}

fn ordered_values<'a>(
    group: &str,
    row: &'a RowSpec,
    table_conf: &'a TableConfig,
) -> Result<Vec<(&'a str, &'a Value)>> {
    for extra in row.combined.keys().filter(|key| table_conf.attr(key).is_none()) {
        warn!(
            group = %group,
            alias = %row.alias,
            table = %row.table,
            attribute = %extra,
            "attribute is not part of the table schema; left out of the sql output"
        );
    }

    table_conf
        .attr_names()
        .map(|name| {
            row.combined.get(name).map(|value| (name, value)).ok_or_else(|| {
                FactureError::conf(format!(
                    "attribute \"{name}\" has no value for alias \"{}\" in group \"{group}\"",
                    row.alias
                ))
            })
        })
        .collect()
}

/// `-- <group>`, `(`, the aligned value lines, `)`, joined by newlines.
pub fn sql_output_lines_for(group: &str, attrs: &[(&str, &Value)], indent: usize) -> Result<String> {
    let mut lines = Vec::with_capacity(attrs.len() + 3);
    lines.push(format!("-- {group}"));
    lines.push("(".to_string());
    lines.extend(formatted_single_record_lines(attrs, indent)?);
    lines.push(")".to_string());
    Ok(lines.join("\n"))
}

/// One line per attribute: indent, value, `,` (space on the last line),
/// padding to the widest value, then ` -- <attr>`.
pub fn formatted_single_record_lines(
    attrs: &[(&str, &Value)],
    indent: usize,
) -> Result<Vec<String>> {
    let rendered = attrs
        .iter()
        .map(|(key, value)| Ok::<_, FactureError>((*key, render_value(value)?)))
        .collect::<Result<Vec<_>>>()?;

    let max_width = rendered
        .iter()
        .map(|(_, text)| text.chars().count())
        .max()
        .unwrap_or(0);
    let indent_str = " ".repeat(indent);
    let last = rendered.len().saturating_sub(1);

    Ok(rendered
        .iter()
        .enumerate()
        .map(|(index, (key, text))| {
            let comma_or_space = if index < last { ',' } else { ' ' };
            let padding = " ".repeat(max_width - text.chars().count());
            format!("{indent_str}{text}{comma_or_space}{padding} -- {key}")
        })
        .collect())
}

/// SQL literal for one value.
///
/// A map with a non-empty string `raw` field is emitted verbatim.
pub fn render_value(value: &Value) -> Result<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(format!("'{}'", text.replace('\'', "''"))),
        Value::Object(map) => match map.get("raw").and_then(Value::as_str) {
            Some(raw) if !raw.is_empty() => Ok(raw.to_string()),
            _ => Err(FactureError::conf(format!(
                "value is dict but no raw key {value}"
            ))),
        },
        Value::Array(_) => Err(FactureError::conf(format!(
            "value is a list and cannot be rendered as sql: {value}"
        ))),
    }
}
