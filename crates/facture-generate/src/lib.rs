//! Generation pipeline for facture.
//!
//! Turns terse group declarations into fully populated rows: sequence ids,
//! resolved references, schema defaults, SQL-style blocks, and finally
//! injection into marked regions of target files.

pub mod checks;
pub mod engine;
pub mod inject;
pub mod merge;
pub mod model;
pub mod normalize;
pub mod output;
pub mod resolve;
pub mod router;
pub mod sequence;

pub use engine::{FactureEngine, GenerationResult};
pub use inject::{InjectionReport, inject_targets};
pub use model::{EngineOptions, GenerationReport, TableReport};
pub use sequence::SequenceState;
