//! In-memory dataset and test-time accessor.
//!
//! Dataset files are parsed elsewhere; these types own the tensors a run
//! actually trains and exports from.

mod dataset;
mod test_set;

pub use dataset::{DatasetDims, EpochBatches, PlanningDataset, TrainingBatch, TrainingExample};
pub use test_set::TestSet;
