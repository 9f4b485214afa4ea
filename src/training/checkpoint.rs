//! Per-module, per-epoch checkpointing.
//!
//! Each saved epoch consists of one parameter file per module, named by role
//! and epoch index. Snapshots coexist; an epoch only counts as saved when
//! all three files exist.

use std::fs;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::prelude::*;
use burn::record::{BinFileRecorder, FullPrecisionSettings};

use crate::config::PlannerModelConfig;
use crate::error::{NeuralPlanError, Result};
use crate::nn::PlannerModel;

/// Role tag of the scene encoder's checkpoint files.
pub const SCENE_ENCODER_ROLE: &str = "scene_encoder";
/// Role tag of the constraint encoder's checkpoint files.
pub const CONSTRAINT_ENCODER_ROLE: &str = "constraint_encoder";
/// Role tag of the predictor's checkpoint files.
pub const PREDICTOR_ROLE: &str = "predictor";

const ROLES: [&str; 3] = [SCENE_ENCODER_ROLE, CONSTRAINT_ENCODER_ROLE, PREDICTOR_ROLE];

fn stem(dir: &Path, role: &str, epoch: usize) -> PathBuf {
    dir.join(format!("{role}_{epoch}"))
}

fn role_file(dir: &Path, role: &str, epoch: usize) -> PathBuf {
    stem(dir, role, epoch).with_extension("bin")
}

/// Save all three modules' parameters for one epoch.
///
/// Either all three files are written or none survive: on failure the files
/// already written for this epoch are removed, so a partially checkpointed
/// epoch never exists on disk. Rewriting the same epoch overwrites it.
pub fn save_checkpoint<B: Backend>(
    dir: &Path,
    model: &PlannerModel<B>,
    epoch: usize,
) -> Result<()> {
    fs::create_dir_all(dir)?;
    let recorder = BinFileRecorder::<FullPrecisionSettings>::default();

    let save = |result: std::result::Result<(), burn::record::RecorderError>, role: &str| {
        result.map_err(|e| NeuralPlanError::Checkpoint {
            message: format!("failed to save {role} at epoch {epoch}: {e}"),
        })
    };

    let written = (|| -> Result<()> {
        save(
            model
                .scene_encoder
                .clone()
                .save_file(stem(dir, SCENE_ENCODER_ROLE, epoch), &recorder),
            SCENE_ENCODER_ROLE,
        )?;
        save(
            model
                .constraint_encoder
                .clone()
                .save_file(stem(dir, CONSTRAINT_ENCODER_ROLE, epoch), &recorder),
            CONSTRAINT_ENCODER_ROLE,
        )?;
        save(
            model
                .predictor
                .clone()
                .save_file(stem(dir, PREDICTOR_ROLE, epoch), &recorder),
            PREDICTOR_ROLE,
        )?;
        Ok(())
    })();

    if written.is_err() {
        for role in ROLES {
            let _ = fs::remove_file(role_file(dir, role, epoch));
        }
        return written;
    }

    log::info!("saved checkpoint for epoch {epoch} to {dir:?}");
    Ok(())
}

/// Load all three modules from a saved epoch.
///
/// The model is reconstructed from `config`, so the caller supplies the same
/// sizes the checkpoint was trained with. Loading is idempotent: repeated
/// loads of the same epoch yield bit-identical parameters.
pub fn load_checkpoint<B: Backend>(
    dir: &Path,
    config: &PlannerModelConfig,
    epoch: usize,
    device: &B::Device,
) -> Result<PlannerModel<B>> {
    if !checkpoint_exists(dir, epoch) {
        return Err(NeuralPlanError::Checkpoint {
            message: format!("no complete checkpoint for epoch {epoch} in {dir:?}"),
        });
    }

    let recorder = BinFileRecorder::<FullPrecisionSettings>::default();
    let model = config.init::<B>(device);

    let load_err = |role: &str, e: burn::record::RecorderError| NeuralPlanError::Checkpoint {
        message: format!("failed to load {role} at epoch {epoch}: {e}"),
    };

    let scene_encoder = model
        .scene_encoder
        .load_file(stem(dir, SCENE_ENCODER_ROLE, epoch), &recorder, device)
        .map_err(|e| load_err(SCENE_ENCODER_ROLE, e))?;
    let constraint_encoder = model
        .constraint_encoder
        .load_file(stem(dir, CONSTRAINT_ENCODER_ROLE, epoch), &recorder, device)
        .map_err(|e| load_err(CONSTRAINT_ENCODER_ROLE, e))?;
    let predictor = model
        .predictor
        .load_file(stem(dir, PREDICTOR_ROLE, epoch), &recorder, device)
        .map_err(|e| load_err(PREDICTOR_ROLE, e))?;

    log::info!("loaded checkpoint for epoch {epoch} from {dir:?}");

    Ok(PlannerModel {
        scene_encoder,
        constraint_encoder,
        predictor,
    })
}

/// Whether all three module files exist for the given epoch.
pub fn checkpoint_exists(dir: &Path, epoch: usize) -> bool {
    ROLES.iter().all(|role| role_file(dir, role, epoch).exists())
}

/// Epochs with a complete checkpoint in the directory, in ascending order.
pub fn saved_epochs(dir: &Path) -> Vec<usize> {
    let mut epochs = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_stem().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(epoch_str) = name.strip_prefix("predictor_") {
                if let Ok(epoch) = epoch_str.parse::<usize>() {
                    if checkpoint_exists(dir, epoch) {
                        epochs.push(epoch);
                    }
                }
            }
        }
    }

    epochs.sort_unstable();
    epochs.dedup();
    epochs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, RunConfig};
    use burn::backend::NdArray;
    use tempfile::TempDir;

    type TestBackend = NdArray;

    fn small_model_config() -> PlannerModelConfig {
        let run = RunConfig::new(Environment::Kitchen)
            .with_voxel_side(2)
            .with_scene_embedding_size(8)
            .with_constraint_embedding_size(4);
        PlannerModelConfig::for_run(&run)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let device = Default::default();
        let config = small_model_config();
        let model = config.init::<TestBackend>(&device);

        save_checkpoint(dir.path(), &model, 0).unwrap();
        assert!(checkpoint_exists(dir.path(), 0));
        assert!(!checkpoint_exists(dir.path(), 1));

        let loaded = load_checkpoint::<TestBackend>(dir.path(), &config, 0, &device).unwrap();

        let input = Tensor::ones([1, config.predictor.input_size], &device);
        let original: Vec<f32> = model.predictor.forward(input.clone()).into_data().to_vec().unwrap();
        let restored: Vec<f32> = loaded.predictor.forward(input).into_data().to_vec().unwrap();
        assert_eq!(original, restored);
    }

    #[test]
    fn test_loading_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let device = Default::default();
        let config = small_model_config();
        let model = config.init::<TestBackend>(&device);

        save_checkpoint(dir.path(), &model, 5).unwrap();

        let first = load_checkpoint::<TestBackend>(dir.path(), &config, 5, &device).unwrap();
        let second = load_checkpoint::<TestBackend>(dir.path(), &config, 5, &device).unwrap();

        let voxels = Tensor::ones([1, 32, 2, 2], &device);
        let a: Vec<f32> = first.scene_encoder.forward(voxels.clone()).into_data().to_vec().unwrap();
        let b: Vec<f32> = second.scene_encoder.forward(voxels).into_data().to_vec().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_epoch_is_an_error() {
        let dir = TempDir::new().unwrap();
        let device = Default::default();
        let config = small_model_config();

        assert!(load_checkpoint::<TestBackend>(dir.path(), &config, 3, &device).is_err());
    }

    #[test]
    fn test_incomplete_epoch_does_not_exist() {
        let dir = TempDir::new().unwrap();
        let device = Default::default();
        let config = small_model_config();
        let model = config.init::<TestBackend>(&device);

        save_checkpoint(dir.path(), &model, 0).unwrap();
        fs::remove_file(role_file(dir.path(), CONSTRAINT_ENCODER_ROLE, 0)).unwrap();

        assert!(!checkpoint_exists(dir.path(), 0));
        assert!(saved_epochs(dir.path()).is_empty());
    }

    #[test]
    fn test_saved_epochs_sorted() {
        let dir = TempDir::new().unwrap();
        let device = Default::default();
        let config = small_model_config();
        let model = config.init::<TestBackend>(&device);

        for epoch in [20, 0, 10] {
            save_checkpoint(dir.path(), &model, epoch).unwrap();
        }

        assert_eq!(saved_epochs(dir.path()), vec![0, 10, 20]);
    }
}
