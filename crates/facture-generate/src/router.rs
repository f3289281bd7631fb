use facture_core::{FactureError, Group, Result, Tables, TargetSpec};

/// Attach the configured target of each row's table, when it has one.
pub fn add_target_info(
    mut groups: Vec<Group>,
    tables: &Tables,
    targets: &[TargetSpec],
) -> Result<Vec<Group>> {
    for group in &mut groups {
        for row in &mut group.data {
            let Some(target_name) = tables.get(&row.table).and_then(|conf| conf.target.as_deref())
            else {
                row.target = None;
                continue;
            };
            let target = targets
                .iter()
                .find(|target| target.name == target_name)
                .ok_or_else(|| {
                    FactureError::conf(format!(
                        "target '{target_name}' from table '{}' does not exist",
                        row.table
                    ))
                })?;
            row.target = Some(target.clone());
        }
    }
    Ok(groups)
}
