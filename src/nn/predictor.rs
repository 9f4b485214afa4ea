//! Next-configuration predictor.

use burn::module::Module;
use burn::prelude::*;

use crate::config::PredictorConfig;

use super::mlp::{Mlp, MlpConfig};

/// Predictor mapping the concatenated embeddings and configuration pair to
/// the next configuration.
///
/// Input is the fixed-order concatenation `[scene embedding, constraint
/// embedding, current config, goal config]`; output width is 7, or 13 when a
/// virtual task-space-region frame is predicted jointly.
#[derive(Module, Debug)]
pub struct Predictor<B: Backend> {
    mlp: Mlp<B>,
    #[module(skip)]
    input_size: usize,
    #[module(skip)]
    output_size: usize,
}

impl<B: Backend> Predictor<B> {
    /// Create a new predictor from configuration.
    pub fn new(config: &PredictorConfig, device: &B::Device) -> Self {
        let mlp = MlpConfig::new(config.input_size, config.output_size)
            .with_hidden_dims(config.hidden_dims.clone())
            .with_dropout(config.dropout)
            .init(device);

        Self {
            mlp,
            input_size: config.input_size,
            output_size: config.output_size,
        }
    }

    /// Predict the next configuration for a batch of concatenated inputs.
    ///
    /// Input shape: `[batch, input_size]`
    /// Output shape: `[batch, output_size]`
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.mlp.forward(x)
    }

    /// Declared input width.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Declared output width.
    pub fn output_size(&self) -> usize {
        self.output_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_predictor_forward() {
        let device = Default::default();
        let config = PredictorConfig::new(38, 7).with_hidden_dims(vec![32, 16]);
        let predictor = Predictor::<TestBackend>::new(&config, &device);

        let input = Tensor::zeros([5, 38], &device);
        let output = predictor.forward(input);

        assert_eq!(output.dims(), [5, 7]);
        assert_eq!(predictor.input_size(), 38);
        assert_eq!(predictor.output_size(), 7);
    }

    #[test]
    fn test_predictor_tsr_width() {
        let device = Default::default();
        let config = PredictorConfig::new(410, 13).with_hidden_dims(vec![64]);
        let predictor = Predictor::<TestBackend>::new(&config, &device);

        let input = Tensor::zeros([2, 410], &device);
        let output = predictor.forward(input);

        assert_eq!(output.dims(), [2, 13]);
    }
}
