use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use facture_core::{FactureError, Group, Result, SeqRule, Tables};

/// Sequence counters keyed by table, then attribute.
///
/// Each counter holds the next un-offset value. Counters are created lazily
/// on first use and only ever move forward during a run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SequenceState {
    counters: BTreeMap<String, BTreeMap<String, i64>>,
}

impl SequenceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `counter + offset` for (table, attribute) and advance the counter.
    pub fn next(
        &mut self,
        table: &str,
        attribute: &str,
        rule: &SeqRule,
        offset: i64,
    ) -> Result<i64> {
        let counter = self
            .counters
            .entry(table.to_string())
            .or_default()
            .entry(attribute.to_string())
            .or_insert(rule.start);
        let overflow = || {
            FactureError::conf(format!(
                "sequence for table \"{table}\" attribute \"{attribute}\" overflows at offset {offset}"
            ))
        };
        let value = counter.checked_add(offset).ok_or_else(overflow)?;
        *counter = counter.checked_add(1).ok_or_else(overflow)?;
        Ok(value)
    }

    /// Next un-offset value for (table, attribute), if the counter exists.
    pub fn peek(&self, table: &str, attribute: &str) -> Option<i64> {
        self.counters.get(table)?.get(attribute).copied()
    }
}

/// Fill `generated` for every row, in group order then row order.
pub fn enhance_with_generated_sequential_data(
    mut groups: Vec<Group>,
    state: &mut SequenceState,
    tables: &Tables,
) -> Result<Vec<Group>> {
    for group in &mut groups {
        let offset = group.offset;
        for row in &mut group.data {
            let table_conf = tables.get(&row.table).ok_or_else(|| {
                FactureError::conf(format!("table \"{}\" has no conf", row.table))
            })?;
            for (attribute, rule) in table_conf.seq_attrs() {
                let value = state.next(&row.table, attribute, rule, offset)?;
                row.generated
                    .insert(attribute.to_string(), Value::from(value));
            }
        }
        debug!(group = %group.group, offset, rows = group.data.len(), "sequences assigned");
    }
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facture_core::{AttrSpec, GroupInput, RowInput, TableConfig};
    use serde_json::json;

    use crate::normalize::normalize_structure;

    fn calls_tables(start: i64) -> Tables {
        let mut tables = Tables::new();
        tables.insert(
            "calls".to_string(),
            TableConfig {
                target: None,
                attrs: vec![AttrSpec::with_seq("id", start)],
            },
        );
        tables
    }

    #[test]
    fn first_value_is_start_plus_offset() {
        let mut state = SequenceState::new();
        let rule = SeqRule { start: 300 };
        assert_eq!(state.next("calls", "id", &rule, 3).expect("next"), 303);
    }

    #[test]
    fn counter_is_shared_across_offsets() {
        let mut state = SequenceState::new();
        let rule = SeqRule { start: 300 };
        assert_eq!(state.next("calls", "id", &rule, 200).expect("next"), 500);
        assert_eq!(state.next("calls", "id", &rule, 400).expect("next"), 701);
        assert_eq!(state.next("calls", "id", &rule, 400).expect("next"), 702);
        assert_eq!(state.peek("calls", "id"), Some(303));
    }

    #[test]
    fn zero_start_is_not_reset() {
        let mut state = SequenceState::new();
        let rule = SeqRule { start: 0 };
        assert_eq!(state.next("t", "id", &rule, 0).expect("next"), 0);
        assert_eq!(state.next("t", "id", &rule, 0).expect("next"), 1);
    }

    #[test]
    fn overflowing_sequence_is_an_error() {
        let groups = normalize_structure(vec![
            GroupInput::new("facture_group_a", 1).row(RowInput::new("calls c1")),
        ])
        .expect("normalize");
        let mut state = SequenceState::new();
        let err =
            enhance_with_generated_sequential_data(groups, &mut state, &calls_tables(i64::MAX))
                .expect_err("overflow");
        assert_eq!(
            err.to_string(),
            "sequence for table \"calls\" attribute \"id\" overflows at offset 1"
        );
    }

    #[test]
    fn generates_ids_for_rows_in_order() {
        let groups = normalize_structure(vec![
            GroupInput::new("facture_group_a", 3)
                .row(RowInput::new("calls c1"))
                .row(RowInput::new("calls c2")),
            GroupInput::new("facture_group_b", 1000).row(RowInput::new("calls c1")),
        ])
        .expect("normalize");
        let mut state = SequenceState::new();

        let groups = enhance_with_generated_sequential_data(groups, &mut state, &calls_tables(300))
            .expect("sequences");

        assert_eq!(groups[0].data[0].generated.get("id"), Some(&json!(303)));
        assert_eq!(groups[0].data[1].generated.get("id"), Some(&json!(304)));
        assert_eq!(groups[1].data[0].generated.get("id"), Some(&json!(1302)));
    }

    #[test]
    fn unknown_table_fails_at_its_row() {
        let groups = normalize_structure(vec![
            GroupInput::new("facture_group_a", 1).row(RowInput::new("whoops w")),
        ])
        .expect("normalize");
        let mut state = SequenceState::new();
        let err = enhance_with_generated_sequential_data(groups, &mut state, &calls_tables(1))
            .expect_err("unknown table");
        assert_eq!(err.to_string(), "table \"whoops\" has no conf");
    }
}
