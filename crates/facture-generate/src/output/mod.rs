//! Renderers for the final data set.

pub mod json;
pub mod sql;

pub use json::dump_json;
pub use sql::{
    DEFAULT_INDENT, add_sql_output, formatted_single_record_lines, render_value,
    sql_output_lines_for,
};
