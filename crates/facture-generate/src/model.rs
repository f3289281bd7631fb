use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::output::DEFAULT_INDENT;

/// Options for the facture engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Accept group names without the `facture_group_` prefix.
    pub flexible_group_names: bool,
    /// Render `output_sql` for every row.
    pub render_sql: bool,
    /// Spaces in front of each value line of a SQL block.
    pub indent: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            flexible_group_names: false,
            render_sql: true,
            indent: DEFAULT_INDENT,
        }
    }
}

/// Per-table row counts of a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub rows: u64,
    pub routed_rows: u64,
}

/// Summary of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub groups: u64,
    pub rows: u64,
    pub tables: BTreeMap<String, TableReport>,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String) -> Self {
        Self {
            run_id,
            groups: 0,
            rows: 0,
            tables: BTreeMap::new(),
            duration_ms: 0,
        }
    }
}
