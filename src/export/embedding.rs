//! Embedding precomputation over the held-out set.

use std::path::PathBuf;

use burn::prelude::*;

use crate::config::PlannerModelConfig;
use crate::data::TestSet;
use crate::error::{NeuralPlanError, Result};
use crate::nn::{ConstraintEncoder, PlannerModel, SceneEncoder};
use crate::output::OutputLayout;

use super::archive::EmbeddingArchive;
use super::freeze::freeze_predictor;

fn tensor_to_vec<B: Backend>(tensor: Tensor<B, 2>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .to_vec()
        .map_err(|e| NeuralPlanError::Export {
            message: format!("failed to read embedding back from the device: {e:?}"),
        })
}

/// Compute one scene embedding per voxel entry of the held-out set.
///
/// Entries are processed one at a time in key order, so the resulting archive
/// mirrors the accessor's scene/object structure exactly.
pub fn export_scene_embeddings<B: Backend>(
    encoder: &SceneEncoder<B>,
    test_set: &TestSet,
    device: &B::Device,
) -> Result<EmbeddingArchive> {
    let dims = test_set.dims();
    let mut archive = EmbeddingArchive::new();

    for (scene, objects) in test_set.voxel_groups() {
        for (object, data) in objects {
            let voxels = Tensor::<B, 4>::from_data(
                TensorData::new(
                    data.clone(),
                    [1, dims.voxel_channels, dims.voxel_side, dims.voxel_side],
                ),
                device,
            );
            let embedding = tensor_to_vec(encoder.forward(voxels))?;
            archive.insert(scene, object, embedding);
        }
    }

    Ok(archive)
}

/// Compute one constraint embedding per constraint entry of the held-out set.
pub fn export_constraint_embeddings<B: Backend>(
    encoder: &ConstraintEncoder<B>,
    test_set: &TestSet,
    device: &B::Device,
) -> Result<EmbeddingArchive> {
    let dims = test_set.dims();
    let mut archive = EmbeddingArchive::new();

    for (scene, entries) in test_set.constraint_groups() {
        for (name, data) in entries {
            let constraint = Tensor::<B, 2>::from_data(
                TensorData::new(data.clone(), [1, dims.constraint_size]),
                device,
            );
            let embedding = tensor_to_vec(encoder.forward(constraint))?;
            archive.insert(scene, name, embedding);
        }
    }

    Ok(archive)
}

/// Paths of the three artifacts a full export produces.
#[derive(Debug, Clone)]
pub struct ExportOutput {
    /// The frozen predictor file.
    pub predictor_path: PathBuf,
    /// The scene embedding archive.
    pub scene_archive_path: PathBuf,
    /// The constraint embedding archive.
    pub constraint_archive_path: PathBuf,
}

/// Run the full export pipeline against a trained model.
///
/// Freezes the predictor and writes both embedding archives into the run's
/// output layout. The test set must not be empty; exporting from a model
/// that saw no held-out data would silently produce empty archives.
pub fn export_all<B: Backend>(
    model: &PlannerModel<B>,
    model_config: &PlannerModelConfig,
    test_set: &TestSet,
    device: &B::Device,
    layout: &OutputLayout,
) -> Result<ExportOutput> {
    if test_set.is_empty() {
        return Err(NeuralPlanError::Export {
            message: "held-out set is empty, nothing to export".to_string(),
        });
    }

    let predictor_path = layout.frozen_predictor_path();
    freeze_predictor(&model.predictor, &model_config.predictor, &predictor_path)?;
    log::info!("froze predictor to {predictor_path:?}");

    let scene_archive = export_scene_embeddings(&model.scene_encoder, test_set, device)?;
    let scene_archive_path = layout.scene_embedding_path();
    scene_archive.write_to(&scene_archive_path)?;
    log::info!(
        "wrote {} scene embeddings to {scene_archive_path:?}",
        scene_archive.num_entries()
    );

    let constraint_archive = export_constraint_embeddings(&model.constraint_encoder, test_set, device)?;
    let constraint_archive_path = layout.constraint_embedding_path();
    constraint_archive.write_to(&constraint_archive_path)?;
    log::info!(
        "wrote {} constraint embeddings to {constraint_archive_path:?}",
        constraint_archive.num_entries()
    );

    Ok(ExportOutput {
        predictor_path,
        scene_archive_path,
        constraint_archive_path,
    })
}
