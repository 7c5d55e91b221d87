//! Training-set assembly from per-class event pools.

mod shuffle;

pub use shuffle::{DrawStrategy, LabeledSet, randomize_and_label};
