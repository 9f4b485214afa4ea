//! Network module configurations.

use burn::config::Config;
use burn::prelude::*;

use crate::error::NeuralPlanError;
use crate::nn::PlannerModel;

use super::RunConfig;

/// Configuration for the scene (voxel) encoder.
#[derive(Config, Debug)]
pub struct SceneEncoderConfig {
    /// Flattened voxel input width (channels x side x side).
    pub input_size: usize,

    /// Output embedding dimension.
    pub embedding_size: usize,

    /// Hidden layer dimensions.
    #[config(default = "vec![512, 256]")]
    pub hidden_dims: Vec<usize>,

    /// Dropout probability (0.0 = no dropout).
    #[config(default = 0.0)]
    pub dropout: f64,
}

/// Configuration for the constraint encoder.
#[derive(Config, Debug)]
pub struct ConstraintEncoderConfig {
    /// Constraint representation width (text or near-terminal-point).
    pub input_size: usize,

    /// Output embedding dimension.
    pub embedding_size: usize,

    /// Hidden layer dimensions.
    #[config(default = "vec![512, 256]")]
    pub hidden_dims: Vec<usize>,

    /// Dropout probability.
    #[config(default = 0.0)]
    pub dropout: f64,
}

/// Configuration for the next-configuration predictor.
#[derive(Config, Debug)]
pub struct PredictorConfig {
    /// Input width: both embeddings plus current and goal configuration.
    pub input_size: usize,

    /// Output width: the predicted configuration.
    pub output_size: usize,

    /// Hidden layer dimensions.
    #[config(default = "vec![1024, 896, 768, 512, 384, 256, 128, 64]")]
    pub hidden_dims: Vec<usize>,

    /// Dropout probability applied after each hidden layer.
    #[config(default = 0.5)]
    pub dropout: f64,
}

/// Configuration of the composite planner model.
///
/// The three modules share nothing but the training loop; this struct exists
/// so the size contract between them can be validated in one place and so a
/// checkpoint-loaded model is constructed from the same sizes it was trained
/// with.
#[derive(Config, Debug)]
pub struct PlannerModelConfig {
    /// Scene encoder configuration.
    pub scene: SceneEncoderConfig,
    /// Constraint encoder configuration.
    pub constraint: ConstraintEncoderConfig,
    /// Predictor configuration.
    pub predictor: PredictorConfig,
}

impl PlannerModelConfig {
    /// Derive the three module configurations from a run configuration.
    pub fn for_run(run: &RunConfig) -> Self {
        Self::new(
            SceneEncoderConfig::new(run.scene_input_size(), run.scene_embedding_size),
            ConstraintEncoderConfig::new(run.constraint_size(), run.constraint_embedding_size),
            PredictorConfig::new(run.predictor_input_size(), run.config_size()),
        )
    }

    /// Check the declared sizes against the run configuration.
    ///
    /// The predictor input width must equal twice the configuration size plus
    /// both embedding sizes exactly; any mismatch is fatal before training.
    pub fn validate(&self, run: &RunConfig) -> crate::error::Result<()> {
        let derived =
            self.predictor.output_size * 2 + self.scene.embedding_size + self.constraint.embedding_size;
        if self.predictor.input_size != derived {
            return Err(NeuralPlanError::InvalidConfig {
                message: format!(
                    "predictor input size {} does not match 2 x {} + {} + {} = {}",
                    self.predictor.input_size,
                    self.predictor.output_size,
                    self.scene.embedding_size,
                    self.constraint.embedding_size,
                    derived
                ),
            });
        }

        if self.predictor.output_size != run.config_size() {
            return Err(NeuralPlanError::InvalidConfig {
                message: format!(
                    "predictor output size {} does not match the run's configuration size {}",
                    self.predictor.output_size,
                    run.config_size()
                ),
            });
        }

        if self.scene.input_size != run.scene_input_size()
            || self.scene.embedding_size != run.scene_embedding_size
        {
            return Err(NeuralPlanError::InvalidConfig {
                message: format!(
                    "scene encoder sizes ({}, {}) do not match the run's ({}, {})",
                    self.scene.input_size,
                    self.scene.embedding_size,
                    run.scene_input_size(),
                    run.scene_embedding_size
                ),
            });
        }

        if self.constraint.input_size != run.constraint_size()
            || self.constraint.embedding_size != run.constraint_embedding_size
        {
            return Err(NeuralPlanError::InvalidConfig {
                message: format!(
                    "constraint encoder sizes ({}, {}) do not match the run's ({}, {})",
                    self.constraint.input_size,
                    self.constraint.embedding_size,
                    run.constraint_size(),
                    run.constraint_embedding_size
                ),
            });
        }

        Ok(())
    }

    /// Initialize the composite model on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> PlannerModel<B> {
        PlannerModel::new(self, device)
    }
}
