//! Configuration types for neural_plan.
//!
//! `RunConfig` captures every hyperparameter of one run; the network
//! configurations are derived from it and validated against it before any
//! batch is processed.

mod network;
mod run;

pub use network::{
    ConstraintEncoderConfig, PlannerModelConfig, PredictorConfig, SceneEncoderConfig,
};
pub use run::{
    Environment, RunConfig, ARM_CONFIG_SIZE, ARM_TSR_CONFIG_SIZE, NTP_CONSTRAINT_SIZE,
    TEXT_CONSTRAINT_SIZE,
};
