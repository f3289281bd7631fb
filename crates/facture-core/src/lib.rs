//! Core contracts for facture.
//!
//! Defines the table schema types, the row records that flow through the
//! generation pipeline, the reference object capability, and the shared
//! error type.

pub mod error;
pub mod reference;
pub mod row;
pub mod schema;
pub mod value;

pub use error::{FactureError, Result};
pub use reference::{ReferenceObject, ReferenceRegistry, TemplateReference};
pub use row::{Group, GroupInput, RawRow, RefObjs, RowInput, RowSpec};
pub use schema::{AttrSpec, SeqRule, TableConfig, Tables, TargetSpec};
pub use value::{Attrs, describe_attrs, display_text};

/// Prefix group names must carry unless flexible group names are requested.
pub const GROUP_PREFIX: &str = "facture_group_";
