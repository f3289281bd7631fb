use std::time::Instant;

use tracing::{debug, info};

use facture_core::{Group, GroupInput, Result, Tables, TargetSpec};

use crate::checks::consistency_checks_or_immediately_die;
use crate::inject::{InjectionReport, inject_targets};
use crate::merge::{add_table_defaults, combine_all_into_result};
use crate::model::{EngineOptions, GenerationReport};
use crate::normalize::normalize_structure;
use crate::output::add_sql_output;
use crate::resolve::enhance_with_references;
use crate::router::add_target_info;
use crate::sequence::{SequenceState, enhance_with_generated_sequential_data};

/// Result of a generation run.
#[derive(Debug)]
pub struct GenerationResult {
    pub groups: Vec<Group>,
    pub sequences: SequenceState,
    pub report: GenerationReport,
}

/// Runs the generation pipeline over configured groups.
#[derive(Debug, Clone, Default)]
pub struct FactureEngine {
    options: EngineOptions,
}

impl FactureEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Normalize, check, generate, resolve, merge, route and render.
    ///
    /// Nothing touches the filesystem here; see [`FactureEngine::inject`].
    pub fn run(
        &self,
        inputs: Vec<GroupInput>,
        tables: &Tables,
        targets: &[TargetSpec],
    ) -> Result<GenerationResult> {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        info!(
            run_id = %run_id,
            groups = inputs.len(),
            tables = tables.len(),
            targets = targets.len(),
            "generation started"
        );

        let groups = normalize_structure(inputs)?;
        consistency_checks_or_immediately_die(&groups, self.options.flexible_group_names)?;
        debug!(run_id = %run_id, "consistency checks passed");

        let mut sequences = SequenceState::new();
        let groups = enhance_with_generated_sequential_data(groups, &mut sequences, tables)?;
        let groups = enhance_with_references(groups)?;
        let groups = add_table_defaults(groups, tables)?;
        let groups = combine_all_into_result(groups)?;
        let groups = if self.options.render_sql {
            debug!(run_id = %run_id, indent = self.options.indent, "adding sql output");
            add_sql_output(groups, tables, self.options.indent)?
        } else {
            groups
        };
        let groups = add_target_info(groups, tables, targets)?;

        let mut report = GenerationReport::new(run_id.clone());
        report.groups = groups.len() as u64;
        for row in groups.iter().flat_map(|group| group.data.iter()) {
            report.rows += 1;
            let entry = report.tables.entry(row.table.clone()).or_default();
            entry.table.clone_from(&row.table);
            entry.rows += 1;
            if row.target.is_some() {
                entry.routed_rows += 1;
            }
        }
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            groups = report.groups,
            rows = report.rows,
            duration_ms = report.duration_ms,
            "generation finished"
        );

        Ok(GenerationResult {
            groups,
            sequences,
            report,
        })
    }

    /// Write routed rows of a finished run into their target files.
    pub fn inject(
        &self,
        result: &GenerationResult,
        targets: &[TargetSpec],
    ) -> Result<InjectionReport> {
        info!(
            run_id = %result.report.run_id,
            targets = targets.len(),
            "exporting to targets"
        );
        inject_targets(&result.groups, targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facture_core::{AttrSpec, RowInput, TableConfig};
    use serde_json::json;

    fn tables() -> Tables {
        let mut tables = Tables::new();
        tables.insert(
            "calls".to_string(),
            TableConfig {
                target: None,
                attrs: vec![AttrSpec::with_seq("id", 300), AttrSpec::with_default("kind", "inbound")],
            },
        );
        tables
    }

    #[test]
    fn runs_every_stage() {
        let inputs = vec![GroupInput::new("facture_group_a", 3).row(RowInput::new("calls c"))];
        let result = FactureEngine::default()
            .run(inputs, &tables(), &[])
            .expect("run");

        let row = &result.groups[0].data[0];
        assert_eq!(row.combined.get("id"), Some(&json!(303)));
        assert_eq!(row.combined.get("kind"), Some(&json!("inbound")));
        assert_eq!(
            row.output_sql.as_deref(),
            Some("-- facture_group_a\n(\n  303,       -- id\n  'inbound'  -- kind\n)")
        );
        assert_eq!(result.sequences.peek("calls", "id"), Some(301));
        assert_eq!(result.report.rows, 1);
        assert_eq!(result.report.tables["calls"].routed_rows, 0);
    }

    #[test]
    fn sql_rendering_can_be_disabled() {
        let engine = FactureEngine::new(EngineOptions {
            render_sql: false,
            ..EngineOptions::default()
        });
        let inputs = vec![GroupInput::new("facture_group_a", 3).row(RowInput::new("calls c"))];
        let result = engine.run(inputs, &tables(), &[]).expect("run");
        assert!(result.groups[0].data[0].output_sql.is_none());
    }

    #[test]
    fn checks_run_before_generation() {
        let inputs = vec![
            GroupInput::new("facture_group_a", 3).row(RowInput::new("calls c")),
            GroupInput::new("facture_group_b", 3).row(RowInput::new("calls c")),
        ];
        let err = FactureEngine::default()
            .run(inputs, &tables(), &[])
            .expect_err("duplicate offsets");
        assert_eq!(err.to_string(), "These offsets are duplicated: {3}");
    }
}
