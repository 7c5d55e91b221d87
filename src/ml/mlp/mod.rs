//! Lightweight MLP classifier for flattened event rows.

mod model;
mod train;

pub use model::MlpModel;
pub use train::{TrainOptions, TrainingHistory, train_mlp};
