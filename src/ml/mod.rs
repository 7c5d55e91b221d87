//! Classifier building blocks for the training workflow.
//!
//! Everything here is developer-facing: train a small network on flattened
//! event rows, score it, and snapshot it for reuse.

pub mod metrics;
pub mod mlp;
pub mod snapshot;
