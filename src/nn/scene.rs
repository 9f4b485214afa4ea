//! Scene (voxel) encoder.

use burn::module::Module;
use burn::prelude::*;

use crate::config::SceneEncoderConfig;

use super::mlp::{Mlp, MlpConfig};

/// Encoder mapping a voxelized scene to a fixed-size embedding.
///
/// Pure function of its parameters and input: no internal state beyond the
/// learned weights.
#[derive(Module, Debug)]
pub struct SceneEncoder<B: Backend> {
    mlp: Mlp<B>,
    /// Flattened input width the encoder was built for.
    #[module(skip)]
    input_size: usize,
    /// Output embedding dimension.
    #[module(skip)]
    embedding_size: usize,
}

impl<B: Backend> SceneEncoder<B> {
    /// Create a new scene encoder from configuration.
    pub fn new(config: &SceneEncoderConfig, device: &B::Device) -> Self {
        let mlp = MlpConfig::new(config.input_size, config.embedding_size)
            .with_hidden_dims(config.hidden_dims.clone())
            .with_dropout(config.dropout)
            .init(device);

        Self {
            mlp,
            input_size: config.input_size,
            embedding_size: config.embedding_size,
        }
    }

    /// Encode a batch of voxel grids.
    ///
    /// Input shape: `[batch, channels, side, side]`
    /// Output shape: `[batch, embedding_size]`
    pub fn forward(&self, voxels: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch, channels, height, width] = voxels.dims();
        let flat = voxels.reshape([batch, channels * height * width]);
        self.mlp.forward(flat)
    }

    /// Flattened input width.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Output embedding dimension.
    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }
}
