//! # neural_plan
//!
//! Joint training and embedding export for a constrained motion-planning
//! predictor, built on Burn.
//!
//! Three modules are trained together against one mean-squared-error loss:
//!
//! - **Scene encoder**: flattened voxel grid -> scene embedding
//! - **Constraint encoder**: constraint representation -> constraint embedding
//! - **Predictor**: `[scene emb, constraint emb, current, goal]` -> next
//!   configuration
//!
//! After training, the predictor is frozen into a standalone artifact and
//! both encoders are evaluated over a held-out test set to produce
//! hierarchical embedding archives keyed by scene and object name.
//!
//! ## Quick Start
//!
//! ```ignore
//! use neural_plan::{
//!     config::{Environment, RunConfig},
//!     export::export_all,
//!     output::OutputLayout,
//!     training::{JsonlMetricWriter, Trainer},
//! };
//! use burn::backend::{Autodiff, NdArray};
//!
//! type MyBackend = Autodiff<NdArray>;
//!
//! let config = RunConfig::new(Environment::Bartender).with_use_text(true);
//! let device = Default::default();
//!
//! let layout = OutputLayout::new("runs/bartender_text");
//! layout.prepare(false)?;
//!
//! let trainer = Trainer::<MyBackend>::new(config, &device)?;
//! let mut sink = JsonlMetricWriter::create(layout.metrics_path())?;
//! let model = trainer.fit(&mut dataset, &mut sink, &layout.weight_dir())?;
//!
//! export_all(
//!     &model.valid(),
//!     trainer.model_config(),
//!     &test_set,
//!     &Default::default(),
//!     &layout,
//! )?;
//! ```
//!
//! ## Feature Flags
//!
//! - `ndarray` (default): CPU backend
//! - `autodiff` (default): gradient tracking for training

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod nn;
pub mod output;
pub mod training;

// Re-export key types for convenience
pub use config::{Environment, PlannerModelConfig, RunConfig};
pub use error::{NeuralPlanError, Result};
pub use nn::PlannerModel;
pub use training::Trainer;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{
        ConstraintEncoderConfig, Environment, PlannerModelConfig, PredictorConfig, RunConfig,
        SceneEncoderConfig,
    };
    pub use crate::data::{DatasetDims, PlanningDataset, TestSet, TrainingExample};
    pub use crate::error::{NeuralPlanError, Result};
    pub use crate::export::{
        export_all, freeze_predictor, EmbeddingArchive, ExportOutput, FrozenPredictor,
    };
    pub use crate::nn::{ConstraintEncoder, PlannerModel, Predictor, SceneEncoder};
    pub use crate::output::{persist_run_config, OutputLayout};
    pub use crate::training::{
        checkpoint_exists, load_checkpoint, save_checkpoint, saved_epochs, JsonlMetricWriter,
        MemoryMetricSink, MetricSink, Trainer,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_public_api() {
        let config = RunConfig::new(Environment::Kitchen);
        assert!(config.validate().is_ok());

        let model_config = PlannerModelConfig::for_run(&config);
        assert!(model_config.validate(&config).is_ok());
    }

    #[test]
    fn test_model_creation() {
        let device = Default::default();
        let config = RunConfig::new(Environment::Kitchen)
            .with_voxel_side(2)
            .with_scene_embedding_size(8)
            .with_constraint_embedding_size(4);
        let model = PlannerModelConfig::for_run(&config).init::<TestBackend>(&device);

        assert_eq!(model.predictor.input_size(), config.predictor_input_size());
        assert_eq!(model.predictor.output_size(), 7);
    }
}
