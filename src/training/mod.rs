//! Training infrastructure.
//!
//! This module provides:
//! - `Trainer`: joint training loop over the three modules
//! - Per-module, per-epoch checkpointing
//! - The scalar metric sink the loop emits epoch losses into

mod checkpoint;
mod metrics;
mod trainer;

pub use checkpoint::{
    checkpoint_exists, load_checkpoint, save_checkpoint, saved_epochs, CONSTRAINT_ENCODER_ROLE,
    PREDICTOR_ROLE, SCENE_ENCODER_ROLE,
};
pub use metrics::{JsonlMetricWriter, MemoryMetricSink, MetricSink};
pub use trainer::Trainer;
