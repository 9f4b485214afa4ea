//! Task/constraint encoder.

use burn::module::Module;
use burn::prelude::*;

use crate::config::ConstraintEncoderConfig;

use super::mlp::{Mlp, MlpConfig};

/// Encoder mapping a task/constraint representation to a fixed-size embedding.
///
/// The input width branches on the text-vs-structured flag at construction
/// time and must match the dataset's emitted representation exactly; the
/// configuration layer validates this before training starts.
#[derive(Module, Debug)]
pub struct ConstraintEncoder<B: Backend> {
    mlp: Mlp<B>,
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    embedding_size: usize,
}

impl<B: Backend> ConstraintEncoder<B> {
    /// Create a new constraint encoder from configuration.
    pub fn new(config: &ConstraintEncoderConfig, device: &B::Device) -> Self {
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

    /// Encode a batch of constraint representations.
    ///
    /// Input shape: `[batch, input_size]`
    /// Output shape: `[batch, embedding_size]`
    pub fn forward(&self, reprs: Tensor<B, 2>) -> Tensor<B, 2> {
        self.mlp.forward(reprs)
    }

    /// Constraint representation width.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Output embedding dimension.
    pub fn embedding_size(&self) -> usize {
        self.embedding_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_constraint_encoder_forward() {
        let device = Default::default();
        let config = ConstraintEncoderConfig::new(270, 32).with_hidden_dims(vec![64]);
        let encoder = ConstraintEncoder::<TestBackend>::new(&config, &device);

        let reprs = Tensor::zeros([3, 270], &device);
        let embedding = encoder.forward(reprs);

        assert_eq!(embedding.dims(), [3, 32]);
    }
}
