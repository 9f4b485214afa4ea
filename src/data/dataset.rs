//! Training dataset and per-epoch batch iteration.

use burn::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::RunConfig;
use crate::error::{NeuralPlanError, Result};

/// Tensor widths every dataset entry must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DatasetDims {
    /// Length of one configuration vector.
    pub config_size: usize,
    /// Voxel channel count.
    pub voxel_channels: usize,
    /// Spatial side length of each voxel channel.
    pub voxel_side: usize,
    /// Constraint representation width.
    pub constraint_size: usize,
}

impl DatasetDims {
    /// Derive the expected widths from a run configuration.
    pub fn for_run(config: &RunConfig) -> Self {
        Self {
            config_size: config.config_size(),
            voxel_channels: config.voxel_channels(),
            voxel_side: config.voxel_side,
            constraint_size: config.constraint_size(),
        }
    }

    /// Flattened length of one voxel grid.
    pub fn voxel_len(&self) -> usize {
        self.voxel_channels * self.voxel_side * self.voxel_side
    }
}

/// One training tuple.
///
/// Voxel grids are pooled per scene/object and referenced by index, since
/// many examples share the same scene.
#[derive(Debug, Clone)]
pub struct TrainingExample {
    /// Index into the dataset's voxel pool.
    pub voxel_id: usize,
    /// Current and goal configuration side by side (`2 * config_size`).
    pub configs: Vec<f32>,
    /// Target next configuration (`config_size`).
    pub target: Vec<f32>,
    /// Constraint representation (`constraint_size`).
    pub constraint: Vec<f32>,
}

/// One device-resident training batch.
#[derive(Debug, Clone)]
pub struct TrainingBatch<B: Backend> {
    /// Current and goal configurations: `[batch, 2 * config_size]`.
    pub inputs: Tensor<B, 2>,
    /// Target configurations: `[batch, config_size]`.
    pub targets: Tensor<B, 2>,
    /// Voxel grids: `[batch, channels, side, side]`.
    pub voxels: Tensor<B, 4>,
    /// Constraint representations: `[batch, constraint_size]`.
    pub constraints: Tensor<B, 2>,
}

/// Shuffled, batched training data for one run.
///
/// Construction validates every entry against the run's derived sizes, so a
/// malformed example is rejected before the first batch rather than inside
/// the training loop.
#[derive(Debug)]
pub struct PlanningDataset {
    dims: DatasetDims,
    batch_size: usize,
    voxels: Vec<Vec<f32>>,
    examples: Vec<TrainingExample>,
    rng: StdRng,
}

impl PlanningDataset {
    /// Build a dataset from a voxel pool and training examples.
    pub fn new(
        config: &RunConfig,
        voxels: Vec<Vec<f32>>,
        examples: Vec<TrainingExample>,
    ) -> Result<Self> {
        config.validate()?;
        let dims = DatasetDims::for_run(config);

        for (id, voxel) in voxels.iter().enumerate() {
            if voxel.len() != dims.voxel_len() {
                return Err(NeuralPlanError::InvalidData(format!(
                    "voxel grid {} has {} values, expected {}",
                    id,
                    voxel.len(),
                    dims.voxel_len()
                )));
            }
        }

        for (id, example) in examples.iter().enumerate() {
            if example.voxel_id >= voxels.len() {
                return Err(NeuralPlanError::InvalidData(format!(
                    "example {} references voxel {} but the pool holds {}",
                    id,
                    example.voxel_id,
                    voxels.len()
                )));
            }
            if example.configs.len() != dims.config_size * 2 {
                return Err(NeuralPlanError::InvalidData(format!(
                    "example {} has a configuration pair of length {}, expected {}",
                    id,
                    example.configs.len(),
                    dims.config_size * 2
                )));
            }
            if example.target.len() != dims.config_size {
                return Err(NeuralPlanError::InvalidData(format!(
                    "example {} has a target of length {}, expected {}",
                    id,
                    example.target.len(),
                    dims.config_size
                )));
            }
            if example.constraint.len() != dims.constraint_size {
                return Err(NeuralPlanError::InvalidData(format!(
                    "example {} has a constraint of length {}, expected {}",
                    id,
                    example.constraint.len(),
                    dims.constraint_size
                )));
            }
        }

        Ok(Self {
            dims,
            batch_size: config.batch_size,
            voxels,
            examples,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Number of training examples.
    pub fn len(&self) -> usize {
        self.examples.len()
    }

    /// Whether the dataset holds no examples.
    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    /// Tensor widths of this dataset.
    pub fn dims(&self) -> DatasetDims {
        self.dims
    }

    /// Number of full batches one epoch yields.
    pub fn batches_per_epoch(&self) -> usize {
        self.examples.len() / self.batch_size
    }

    fn shuffled_order(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.examples.len()).collect();
        order.shuffle(&mut self.rng);
        order
    }

    /// Iterate one epoch of training batches on the given device.
    ///
    /// The order is reshuffled on every call; the final partial batch is
    /// dropped so tensor shapes stay uniform across the epoch.
    pub fn training_batches<B: Backend>(&mut self, device: &B::Device) -> EpochBatches<'_, B> {
        let order = self.shuffled_order();
        EpochBatches {
            order,
            cursor: 0,
            batch_size: self.batch_size,
            device: device.clone(),
            dataset: self,
        }
    }
}

/// Iterator over one epoch's batches.
pub struct EpochBatches<'a, B: Backend> {
    dataset: &'a PlanningDataset,
    order: Vec<usize>,
    cursor: usize,
    batch_size: usize,
    device: B::Device,
}

impl<B: Backend> Iterator for EpochBatches<'_, B> {
    type Item = TrainingBatch<B>;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.cursor + self.batch_size;
        if end > self.order.len() {
            return None;
        }
        let ids = &self.order[self.cursor..end];
        self.cursor = end;

        let dims = self.dataset.dims;
        let n = ids.len();

        let mut inputs = Vec::with_capacity(n * dims.config_size * 2);
        let mut targets = Vec::with_capacity(n * dims.config_size);
        let mut voxels = Vec::with_capacity(n * dims.voxel_len());
        let mut constraints = Vec::with_capacity(n * dims.constraint_size);

        for &id in ids {
            let example = &self.dataset.examples[id];
            inputs.extend_from_slice(&example.configs);
            targets.extend_from_slice(&example.target);
            voxels.extend_from_slice(&self.dataset.voxels[example.voxel_id]);
            constraints.extend_from_slice(&example.constraint);
        }

        Some(TrainingBatch {
            inputs: Tensor::from_data(
                TensorData::new(inputs, [n, dims.config_size * 2]),
                &self.device,
            ),
            targets: Tensor::from_data(
                TensorData::new(targets, [n, dims.config_size]),
                &self.device,
            ),
            voxels: Tensor::from_data(
                TensorData::new(voxels, [n, dims.voxel_channels, dims.voxel_side, dims.voxel_side]),
                &self.device,
            ),
            constraints: Tensor::from_data(
                TensorData::new(constraints, [n, dims.constraint_size]),
                &self.device,
            ),
        })
    }
}
