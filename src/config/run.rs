//! Run configuration and derived tensor sizes.

use burn::config::Config;
use serde::{Deserialize, Serialize};

use crate::error::NeuralPlanError;

/// Length of the text-derived constraint representation.
pub const TEXT_CONSTRAINT_SIZE: usize = 4096;

/// Length of the structured near-terminal-point constraint representation.
pub const NTP_CONSTRAINT_SIZE: usize = 270;

/// Degrees of freedom of a manipulator configuration.
pub const ARM_CONFIG_SIZE: usize = 7;

/// Configuration length when a virtual task-space-region frame is predicted
/// jointly with the manipulator configuration.
pub const ARM_TSR_CONFIG_SIZE: usize = 13;

/// Environment variant the run is trained for.
///
/// The variant fixes the voxel channel count of every scene in the dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    /// Kitchen scenes (32 voxel channels).
    Kitchen,
    /// Bartender scenes (33 voxel channels).
    Bartender,
}

impl Environment {
    /// Number of channels in each voxel grid of this environment.
    pub fn voxel_channels(&self) -> usize {
        match self {
            Environment::Kitchen => 32,
            Environment::Bartender => 33,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Kitchen => write!(f, "kitchen"),
            Environment::Bartender => write!(f, "bartender"),
        }
    }
}

/// Immutable configuration of one training run.
///
/// Constructed once before training and passed explicitly to every component
/// that needs it. Derived tensor sizes are methods, never independent fields,
/// so the predictor input width cannot drift out of sync with the embedding
/// sizes.
#[derive(Config, Debug)]
pub struct RunConfig {
    /// Environment variant to train for.
    pub environment: Environment,

    /// Use the text-derived constraint representation instead of the
    /// structured near-terminal-point one.
    #[config(default = false)]
    pub use_text: bool,

    /// Include reach-path augmentation in the training dataset.
    #[config(default = false)]
    pub use_reach: bool,

    /// Predict a virtual task-space-region frame jointly with the
    /// manipulator configuration.
    #[config(default = false)]
    pub use_tsr: bool,

    /// Output dimension of the scene encoder.
    #[config(default = 256)]
    pub scene_embedding_size: usize,

    /// Output dimension of the constraint encoder.
    #[config(default = 128)]
    pub constraint_embedding_size: usize,

    /// Spatial side length of each voxel grid channel.
    #[config(default = 32)]
    pub voxel_side: usize,

    /// Number of training epochs.
    #[config(default = 400)]
    pub num_epochs: usize,

    /// Epoch interval between checkpoints (epoch 0 is always checkpointed).
    #[config(default = 10)]
    pub checkpoint_step: usize,

    /// Training batch size. The final partial batch of each epoch is dropped.
    #[config(default = 256)]
    pub batch_size: usize,

    /// Learning rate of the joint optimizer.
    #[config(default = 1e-4)]
    pub learning_rate: f64,

    /// Seed for the per-epoch dataset shuffle.
    #[config(default = 42)]
    pub seed: u64,
}

impl RunConfig {
    /// Voxel channel count derived from the environment variant.
    pub fn voxel_channels(&self) -> usize {
        self.environment.voxel_channels()
    }

    /// Width of the constraint representation emitted by the dataset.
    pub fn constraint_size(&self) -> usize {
        if self.use_text {
            TEXT_CONSTRAINT_SIZE
        } else {
            NTP_CONSTRAINT_SIZE
        }
    }

    /// Length of one configuration vector (and of the predictor output).
    pub fn config_size(&self) -> usize {
        if self.use_tsr {
            ARM_TSR_CONFIG_SIZE
        } else {
            ARM_CONFIG_SIZE
        }
    }

    /// Flattened input width of the scene encoder.
    pub fn scene_input_size(&self) -> usize {
        self.voxel_channels() * self.voxel_side * self.voxel_side
    }

    /// Input width of the predictor: current and goal configuration plus
    /// both embeddings.
    pub fn predictor_input_size(&self) -> usize {
        self.config_size() * 2 + self.scene_embedding_size + self.constraint_embedding_size
    }

    /// Validate the configuration. Fatal before training starts.
    pub fn validate(&self) -> crate::error::Result<()> {
        fn positive(value: usize, name: &str) -> crate::error::Result<()> {
            if value == 0 {
                return Err(NeuralPlanError::InvalidConfig {
                    message: format!("{name} must be positive"),
                });
            }
            Ok(())
        }

        positive(self.scene_embedding_size, "scene_embedding_size")?;
        positive(self.constraint_embedding_size, "constraint_embedding_size")?;
        positive(self.voxel_side, "voxel_side")?;
        positive(self.num_epochs, "num_epochs")?;
        positive(self.checkpoint_step, "checkpoint_step")?;
        positive(self.batch_size, "batch_size")?;

        if self.learning_rate <= 0.0 {
            return Err(NeuralPlanError::InvalidConfig {
                message: "learning_rate must be positive".to_string(),
            });
        }

        if self.use_reach && self.environment == Environment::Kitchen {
            return Err(NeuralPlanError::InvalidConfig {
                message: "reach-path augmentation is only available for the bartender environment"
                    .to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitchen_ntp_sizes() {
        let config = RunConfig::new(Environment::Kitchen);

        assert_eq!(config.voxel_channels(), 32);
        assert_eq!(config.constraint_size(), 270);
        assert_eq!(config.config_size(), 7);
        assert_eq!(config.predictor_input_size(), 7 * 2 + 256 + 128);
        assert_eq!(config.predictor_input_size(), 654);
    }

    #[test]
    fn test_bartender_text_tsr_sizes() {
        let config = RunConfig::new(Environment::Bartender)
            .with_use_text(true)
            .with_use_tsr(true);

        assert_eq!(config.voxel_channels(), 33);
        assert_eq!(config.constraint_size(), 4096);
        assert_eq!(config.config_size(), 13);
        assert_eq!(config.predictor_input_size(), 13 * 2 + 256 + 128);
        assert_eq!(config.predictor_input_size(), 410);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RunConfig::new(Environment::Bartender);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reach_rejected_for_kitchen() {
        let config = RunConfig::new(Environment::Kitchen).with_use_reach(true);
        assert!(config.validate().is_err());

        let config = RunConfig::new(Environment::Bartender).with_use_reach(true);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sizes_rejected() {
        let config = RunConfig::new(Environment::Kitchen).with_batch_size(0);
        assert!(config.validate().is_err());

        let config = RunConfig::new(Environment::Kitchen).with_checkpoint_step(0);
        assert!(config.validate().is_err());

        let config = RunConfig::new(Environment::Kitchen).with_learning_rate(0.0);
        assert!(config.validate().is_err());
    }
}
