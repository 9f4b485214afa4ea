//! Composite planner model.

use burn::module::Module;
use burn::prelude::*;

use crate::config::PlannerModelConfig;

use super::{ConstraintEncoder, Predictor, SceneEncoder};

/// The three cooperating modules under one parameter root.
///
/// Wrapping them in a single `Module` gives the joint optimizer one parameter
/// union and checkpointing one record per sub-module; the modules themselves
/// only meet at the concatenation in [`PlannerModel::forward`].
#[derive(Module, Debug)]
pub struct PlannerModel<B: Backend> {
    /// Voxel scene encoder.
    pub scene_encoder: SceneEncoder<B>,
    /// Task/constraint encoder.
    pub constraint_encoder: ConstraintEncoder<B>,
    /// Next-configuration predictor.
    pub predictor: Predictor<B>,
}

impl<B: Backend> PlannerModel<B> {
    /// Construct all three modules on the given device.
    pub fn new(config: &PlannerModelConfig, device: &B::Device) -> Self {
        Self {
            scene_encoder: SceneEncoder::new(&config.scene, device),
            constraint_encoder: ConstraintEncoder::new(&config.constraint, device),
            predictor: Predictor::new(&config.predictor, device),
        }
    }

    /// Full forward pass for one batch.
    ///
    /// `configs` carries the current and goal configuration side by side
    /// (`[batch, 2 * config_size]`). The embeddings and configurations are
    /// concatenated in fixed order before prediction.
    pub fn forward(
        &self,
        voxels: Tensor<B, 4>,
        constraints: Tensor<B, 2>,
        configs: Tensor<B, 2>,
    ) -> Tensor<B, 2> {
        let scene_embedding = self.scene_encoder.forward(voxels);
        let constraint_embedding = self.constraint_encoder.forward(constraints);
        let joined = Tensor::cat(vec![scene_embedding, constraint_embedding, configs], 1);
        self.predictor.forward(joined)
    }
}
