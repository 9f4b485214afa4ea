//! End-to-end training tests.

use burn::backend::{Autodiff, NdArray};
use burn::module::AutodiffModule;
use burn::prelude::*;
use tempfile::TempDir;

use neural_plan::{
    config::{Environment, RunConfig},
    data::{DatasetDims, PlanningDataset, TrainingExample},
    training::{load_checkpoint, saved_epochs, MemoryMetricSink, Trainer},
};

type TestBackend = Autodiff<NdArray>;

fn small_config() -> RunConfig {
    RunConfig::new(Environment::Kitchen)
        .with_voxel_side(2)
        .with_batch_size(4)
        .with_num_epochs(5)
        .with_checkpoint_step(2)
        .with_scene_embedding_size(8)
        .with_constraint_embedding_size(4)
}

fn small_dataset(config: &RunConfig, num_examples: usize) -> PlanningDataset {
    let dims = DatasetDims::for_run(config);
    let voxels = vec![vec![0.25; dims.voxel_len()], vec![0.75; dims.voxel_len()]];
    let examples = (0..num_examples)
        .map(|i| TrainingExample {
            voxel_id: i % 2,
            configs: vec![0.1 * i as f32; dims.config_size * 2],
            target: vec![0.05 * i as f32; dims.config_size],
            constraint: vec![0.01 * i as f32; dims.constraint_size],
        })
        .collect();
    PlanningDataset::new(config, voxels, examples).unwrap()
}

#[test]
fn test_train_writes_periodic_checkpoints() {
    let dir = TempDir::new().unwrap();
    let device = Default::default();
    let config = small_config();
    let mut dataset = small_dataset(&config, 10);
    let mut sink = MemoryMetricSink::new();

    let trainer = Trainer::<TestBackend>::new(config, &device).unwrap();
    trainer.fit(&mut dataset, &mut sink, dir.path()).unwrap();

    // 5 epochs at step 2 checkpoint epochs 0, 2 and 4.
    assert_eq!(saved_epochs(dir.path()), vec![0, 2, 4]);
}

#[test]
fn test_metric_series_is_complete_and_ordered() {
    let dir = TempDir::new().unwrap();
    let device = Default::default();
    let config = small_config();
    let mut dataset = small_dataset(&config, 10);
    let mut sink = MemoryMetricSink::new();

    let trainer = Trainer::<TestBackend>::new(config, &device).unwrap();
    trainer.fit(&mut dataset, &mut sink, dir.path()).unwrap();

    assert_eq!(sink.scalars.len(), 5);
    assert!(sink.closed);
    for (i, (epoch, loss)) in sink.scalars.iter().enumerate() {
        assert_eq!(*epoch, i);
        assert!(loss.is_finite());
    }
}

#[test]
fn test_checkpoint_restores_trained_parameters() {
    let dir = TempDir::new().unwrap();
    let device = Default::default();
    let config = small_config().with_num_epochs(3).with_checkpoint_step(1);
    let mut dataset = small_dataset(&config, 10);
    let mut sink = MemoryMetricSink::new();

    let trainer = Trainer::<TestBackend>::new(config, &device).unwrap();
    let trained = trainer
        .fit(&mut dataset, &mut sink, dir.path())
        .unwrap()
        .valid();

    // Epoch 2 is the last epoch, so its checkpoint holds the final parameters.
    let loaded =
        load_checkpoint::<NdArray>(dir.path(), trainer.model_config(), 2, &Default::default())
            .unwrap();

    let input = Tensor::ones([1, trainer.config().predictor_input_size()], &device);
    let expected: Vec<f32> = trained
        .predictor
        .forward(input.clone())
        .into_data()
        .to_vec()
        .unwrap();
    let restored: Vec<f32> = loaded.predictor.forward(input).into_data().to_vec().unwrap();
    assert_eq!(expected, restored);
}

#[test]
fn test_shuffle_covers_every_example_each_epoch() {
    let config = small_config().with_batch_size(2);
    let mut dataset = small_dataset(&config, 8);
    let device = Default::default();

    let mut seen: Vec<f32> = dataset
        .training_batches::<TestBackend>(&device)
        .flat_map(|batch| batch.targets.into_data().to_vec::<f32>().unwrap())
        .step_by(7) // first component of each 7-wide target
        .collect();
    seen.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let expected: Vec<f32> = (0..8).map(|i| 0.05 * i as f32).collect();
    assert_eq!(seen, expected);
}
