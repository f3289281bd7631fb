use std::collections::{BTreeSet, HashSet};

use facture_core::{FactureError, GROUP_PREFIX, Group, Result};

/// Validate global invariants before anything is generated. Fails on the first violation.
pub fn consistency_checks_or_immediately_die(
    groups: &[Group],
    flexible_group_names: bool,
) -> Result<()> {
    check_offsets(groups)?;
    check_no_same_aliases(groups)?;
    check_group_names(groups, flexible_group_names)?;
    check_no_same_groups(groups)?;
    Ok(())
}

/// Offsets keep generated sequences of different groups apart, so they must be distinct.
pub fn check_offsets(groups: &[Group]) -> Result<()> {
    let mut seen = HashSet::new();
    let duplicated: BTreeSet<i64> = groups
        .iter()
        .map(|group| group.offset)
        .filter(|offset| !seen.insert(*offset))
        .collect();

    if duplicated.is_empty() {
        return Ok(());
    }

    let listed: Vec<String> = duplicated.iter().map(i64::to_string).collect();
    Err(FactureError::conf(format!(
        "These offsets are duplicated: {{{}}}",
        listed.join(", ")
    )))
}

pub fn check_no_same_aliases(groups: &[Group]) -> Result<()> {
    for group in groups {
        let mut seen = HashSet::new();
        for row in &group.data {
            if !seen.insert(row.alias.as_str()) {
                return Err(FactureError::conf(format!(
                    "alias \"{}\" is declared more than once in group \"{}\"",
                    row.alias, group.group
                )));
            }
        }
    }
    Ok(())
}

pub fn check_group_names(groups: &[Group], flexible_group_names: bool) -> Result<()> {
    if flexible_group_names {
        return Ok(());
    }
    if groups.iter().any(|group| !group.group.starts_with(GROUP_PREFIX)) {
        return Err(FactureError::conf(format!(
            "Please name groups starting with \"{GROUP_PREFIX}\" or pass --flexible-group-names. \
             Having these longer group names allows for easy greping back to the config."
        )));
    }
    Ok(())
}

pub fn check_no_same_groups(groups: &[Group]) -> Result<()> {
    let mut seen = HashSet::new();
    for group in groups {
        if !seen.insert(group.group.as_str()) {
            return Err(FactureError::conf(format!(
                "group \"{}\" is declared more than once",
                group.group
            )));
        }
    }
    Ok(())
}
