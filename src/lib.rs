//! Library exports for the HHESTIA training utilities.
/// Event-tree schema and column-store tables.
pub mod tree;
/// Pool shuffling and labeling for training sets.
pub mod dataset;
/// Classifier training, metrics, and model snapshots.
pub mod ml;
/// Plot rendering for training diagnostics.
pub mod plot;
/// Logging setup.
pub mod logging;
