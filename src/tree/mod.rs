//! Event-tree abstractions for the training pipeline.
//!
//! The detector data lives in tree files read by an external access layer; this
//! module only deals with what the trainer needs from them: the ordered list of
//! branch names and a column-store table of branch values per event.

mod schema;
mod table;

pub use schema::{TreeSchema, training_branch_names};
pub use table::{BranchTable, TableError};
