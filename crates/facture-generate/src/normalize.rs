use facture_core::{FactureError, Group, GroupInput, RawRow, Result, RowSpec};

/// Turn terse group input into row records carrying `raw`, `table` and `alias`.
pub fn normalize_structure(inputs: Vec<GroupInput>) -> Result<Vec<Group>> {
    inputs
        .into_iter()
        .map(|input| -> Result<Group> {
            let data = input
                .data
                .into_iter()
                .map(|row| -> Result<RowSpec> {
                    let (table, alias) = split_tablestr(&row.tablestr)?;
                    Ok(RowSpec::new(RawRow::from(row), table, alias))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Group {
                group: input.group,
                offset: input.offset,
                data,
            })
        })
        .collect()
}

/// Split `"<table> <alias>"` on a single space. Exactly two tokens are required.
pub fn split_tablestr(tablestr: &str) -> Result<(String, String)> {
    let tokens: Vec<&str> = tablestr.split(' ').collect();
    match tokens.as_slice() {
        [table, alias] => Ok((table.to_string(), alias.to_string())),
        _ => Err(FactureError::conf(format!(
            "in \"data\", \"{tablestr}\" needs an alias"
        ))),
    }
}
