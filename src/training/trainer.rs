//! Joint training loop.

use std::path::Path;

use burn::nn::loss::{MseLoss, Reduction};
use burn::optim::{AdaGradConfig, GradientsParams, Optimizer};
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::ElementConversion;

use crate::config::{PlannerModelConfig, RunConfig};
use crate::data::{DatasetDims, PlanningDataset};
use crate::error::{NeuralPlanError, Result};
use crate::nn::PlannerModel;

use super::checkpoint::save_checkpoint;
use super::metrics::MetricSink;

/// Orchestrator of the joint training run.
///
/// All three modules live on one device and are updated by a single Adagrad
/// optimizer over the union of their parameters; the shared loss is the mean
/// squared error between the predicted and the target configuration.
#[derive(Debug)]
pub struct Trainer<B: AutodiffBackend> {
    config: RunConfig,
    model_config: PlannerModelConfig,
    device: B::Device,
}

impl<B: AutodiffBackend> Trainer<B> {
    /// Validate the configuration and prepare a trainer on the given device.
    ///
    /// Every configuration error, including a violated predictor-input-size
    /// invariant, is caught here, before any batch is processed.
    pub fn new(config: RunConfig, device: &B::Device) -> Result<Self> {
        config.validate()?;
        let model_config = PlannerModelConfig::for_run(&config);
        model_config.validate(&config)?;

        Ok(Self {
            config,
            model_config,
            device: device.clone(),
        })
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The derived network configuration.
    pub fn model_config(&self) -> &PlannerModelConfig {
        &self.model_config
    }

    /// Train the three modules jointly.
    ///
    /// Per epoch: every batch is moved to the device, passed through both
    /// encoders, concatenated, predicted and regressed against the target;
    /// one optimizer step per batch. The epoch's scalar metric is the last
    /// batch's loss. Checkpoints are written every `checkpoint_step` epochs,
    /// starting with epoch 0, before the next epoch begins.
    pub fn fit(
        &self,
        dataset: &mut PlanningDataset,
        sink: &mut dyn MetricSink,
        checkpoint_dir: &Path,
    ) -> Result<PlannerModel<B>> {
        if dataset.dims() != DatasetDims::for_run(&self.config) {
            return Err(NeuralPlanError::InvalidConfig {
                message: "dataset tensor widths do not match the run configuration".to_string(),
            });
        }
        if dataset.len() < self.config.batch_size {
            return Err(NeuralPlanError::InvalidConfig {
                message: format!(
                    "dataset holds {} examples, fewer than one batch of {}",
                    dataset.len(),
                    self.config.batch_size
                ),
            });
        }

        let mut model = self.model_config.init::<B>(&self.device);
        let mut optimizer = AdaGradConfig::new().init();
        let loss_fn = MseLoss::new();

        log::info!(
            "training {} epochs of {} batches on {} examples",
            self.config.num_epochs,
            dataset.batches_per_epoch(),
            dataset.len()
        );

        for epoch in 0..self.config.num_epochs {
            let mut epoch_loss = 0.0f32;

            for batch in dataset.training_batches::<B>(&self.device) {
                let predictions = model.forward(batch.voxels, batch.constraints, batch.inputs);
                let loss = loss_fn.forward(predictions, batch.targets, Reduction::Mean);
                epoch_loss = loss.clone().into_scalar().elem();

                let grads = GradientsParams::from_grads(loss.backward(), &model);
                model = optimizer.step(self.config.learning_rate, model, grads);
            }

            // Last batch's loss, not an epoch average.
            sink.record(epoch, epoch_loss)?;
            log::info!(
                "epoch {}/{}: loss = {:.6}",
                epoch + 1,
                self.config.num_epochs,
                epoch_loss
            );

            if epoch % self.config.checkpoint_step == 0 {
                save_checkpoint(checkpoint_dir, &model, epoch)?;
            }
        }

        sink.close()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use crate::data::TrainingExample;
    use crate::training::MemoryMetricSink;
    use burn::backend::{Autodiff, NdArray};
    use tempfile::TempDir;

    type TestBackend = Autodiff<NdArray>;

    fn small_config() -> RunConfig {
        RunConfig::new(Environment::Kitchen)
            .with_voxel_side(2)
            .with_batch_size(4)
            .with_num_epochs(3)
            .with_checkpoint_step(2)
            .with_scene_embedding_size(8)
            .with_constraint_embedding_size(4)
    }

    fn small_dataset(config: &RunConfig, num_examples: usize) -> PlanningDataset {
        let dims = DatasetDims::for_run(config);
        let voxels = vec![vec![0.25; dims.voxel_len()]];
        let examples = (0..num_examples)
            .map(|i| TrainingExample {
                voxel_id: 0,
                configs: vec![0.1 * i as f32; dims.config_size * 2],
                target: vec![0.05 * i as f32; dims.config_size],
                constraint: vec![0.0; dims.constraint_size],
            })
            .collect();
        PlanningDataset::new(config, voxels, examples).unwrap()
    }

    #[test]
    fn test_fit_emits_one_scalar_per_epoch() {
        let dir = TempDir::new().unwrap();
        let device = Default::default();
        let config = small_config();
        let mut dataset = small_dataset(&config, 9);
        let mut sink = MemoryMetricSink::new();

        let trainer = Trainer::<TestBackend>::new(config, &device).unwrap();
        let model = trainer.fit(&mut dataset, &mut sink, dir.path()).unwrap();

        assert_eq!(sink.scalars.len(), 3);
        assert!(sink.closed);
        for (i, (epoch, loss)) in sink.scalars.iter().enumerate() {
            assert_eq!(*epoch, i);
            assert!(loss.is_finite());
        }
        assert_eq!(model.predictor.output_size(), 7);
    }

    #[test]
    fn test_fit_rejects_undersized_dataset() {
        let dir = TempDir::new().unwrap();
        let device = Default::default();
        let config = small_config();
        let mut dataset = small_dataset(&config, 3);
        let mut sink = MemoryMetricSink::new();

        let trainer = Trainer::<TestBackend>::new(config, &device).unwrap();
        assert!(trainer.fit(&mut dataset, &mut sink, dir.path()).is_err());
    }

    #[test]
    fn test_trainer_rejects_invalid_config() {
        let device = Default::default();
        let config = small_config().with_use_reach(true); // kitchen has no reach paths
        assert!(Trainer::<TestBackend>::new(config, &device).is_err());
    }
}
