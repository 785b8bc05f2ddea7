//! Read-only queries over a completed [`StructuralModel`](crate::model::StructuralModel).
//!
//! Nothing here mutates the model; every miss is an empty or absent result.

pub mod position;
pub mod references;
pub mod scope;

pub use position::{Position, variable_at_position, word_at, word_range_at};
pub use references::{TextReplacement, references_of, rename};
pub use scope::{function_at_line, visible_variable, visible_variables};
