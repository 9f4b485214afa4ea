//! Shared MLP building block.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Dropout, DropoutConfig, Linear, LinearConfig, Relu};
use burn::prelude::*;

/// Configuration for a stack of fully-connected layers.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Input dimension.
    pub input_dim: usize,
    /// Output dimension.
    pub output_dim: usize,
    /// Hidden layer dimensions.
    #[config(default = "vec![]")]
    pub hidden_dims: Vec<usize>,
    /// Dropout probability applied after each hidden activation.
    #[config(default = 0.0)]
    pub dropout: f64,
}

impl MlpConfig {
    /// Initialize the MLP.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut hidden = Vec::new();
        let mut in_dim = self.input_dim;

        for &out_dim in &self.hidden_dims {
            hidden.push(LinearConfig::new(in_dim, out_dim).init(device));
            in_dim = out_dim;
        }

        let output = LinearConfig::new(in_dim, self.output_dim).init(device);

        let dropout = if self.dropout > 0.0 {
            Some(DropoutConfig::new(self.dropout).init())
        } else {
            None
        };

        Mlp {
            hidden,
            output,
            activation: Relu::new(),
            dropout,
        }
    }
}

/// Fully-connected network with ReLU activations and a linear output layer.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    /// Hidden layers.
    hidden: Vec<Linear<B>>,
    /// Linear output layer (no activation; these networks regress).
    output: Linear<B>,
    /// Activation function.
    activation: Relu,
    /// Optional dropout after each hidden activation.
    dropout: Option<Dropout>,
}

impl<B: Backend> Mlp<B> {
    /// Forward pass.
    ///
    /// Input shape: `[batch, input_dim]`
    /// Output shape: `[batch, output_dim]`
    pub fn forward(&self, mut x: Tensor<B, 2>) -> Tensor<B, 2> {
        for layer in &self.hidden {
            x = layer.forward(x);
            x = self.activation.forward(x);
            if let Some(ref dropout) = self.dropout {
                x = dropout.forward(x);
            }
        }

        self.output.forward(x)
    }
}
