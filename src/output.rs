//! On-disk layout of a training run's outputs.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::config::RunConfig;
use crate::error::{NeuralPlanError, Result};

/// Directory layout of one run: weights, metrics and exported artifacts all
/// live under a single root, so a run can be archived or deleted as a unit.
///
/// `prepare` refuses to touch a root that already holds files unless the
/// caller explicitly allows overwriting; a run never clobbers an earlier one
/// by accident.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Describe a layout rooted at the given directory.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The run's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding per-epoch checkpoint files.
    pub fn weight_dir(&self) -> PathBuf {
        self.root.join("weights")
    }

    /// Directory holding exported artifacts.
    pub fn artifact_dir(&self) -> PathBuf {
        self.root.join("artifacts")
    }

    /// The frozen predictor file.
    pub fn frozen_predictor_path(&self) -> PathBuf {
        self.artifact_dir().join("predictor.npfz")
    }

    /// The scene embedding archive.
    pub fn scene_embedding_path(&self) -> PathBuf {
        self.artifact_dir().join("voxel.npem")
    }

    /// The constraint embedding archive.
    pub fn constraint_embedding_path(&self) -> PathBuf {
        self.artifact_dir().join("task_embedding.npem")
    }

    /// The per-epoch loss series.
    pub fn metrics_path(&self) -> PathBuf {
        self.root.join("scalars.jsonl")
    }

    /// The persisted run configuration.
    pub fn run_config_path(&self) -> PathBuf {
        self.root.join("run_config.json")
    }

    /// Create the directory tree.
    ///
    /// Fails with [`NeuralPlanError::OutputExists`] when the root already
    /// holds files and `allow_overwrite` is false.
    pub fn prepare(&self, allow_overwrite: bool) -> Result<()> {
        if !allow_overwrite && self.is_populated()? {
            return Err(NeuralPlanError::OutputExists {
                path: self.root.clone(),
            });
        }

        fs::create_dir_all(self.weight_dir())?;
        fs::create_dir_all(self.artifact_dir())?;
        Ok(())
    }

    fn is_populated(&self) -> Result<bool> {
        if !self.root.exists() {
            return Ok(false);
        }
        Ok(fs::read_dir(&self.root)?.next().is_some())
    }
}

/// Persist the effective run configuration next to the outputs it produced.
///
/// The file records the given fields, the derived sizes and a timestamp, so
/// a run's artifacts stay interpretable without the code that produced them.
pub fn persist_run_config(config: &RunConfig, device_label: &str, path: &Path) -> Result<()> {
    let record = serde_json::json!({
        "recorded_at": Utc::now().to_rfc3339(),
        "device": device_label,
        "environment": config.environment.to_string(),
        "use_text": config.use_text,
        "use_reach": config.use_reach,
        "use_tsr": config.use_tsr,
        "voxel_side": config.voxel_side,
        "scene_embedding_size": config.scene_embedding_size,
        "constraint_embedding_size": config.constraint_embedding_size,
        "num_epochs": config.num_epochs,
        "checkpoint_step": config.checkpoint_step,
        "batch_size": config.batch_size,
        "learning_rate": config.learning_rate,
        "seed": config.seed,
        "derived": {
            "voxel_channels": config.voxel_channels(),
            "constraint_size": config.constraint_size(),
            "config_size": config.config_size(),
            "scene_input_size": config.scene_input_size(),
            "predictor_input_size": config.predictor_input_size(),
        },
    });

    fs::write(path, serde_json::to_string_pretty(&record)? + "\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_creates_tree() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("run"));

        layout.prepare(false).unwrap();

        assert!(layout.weight_dir().is_dir());
        assert!(layout.artifact_dir().is_dir());
    }

    #[test]
    fn test_prepare_refuses_populated_root() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path());
        std::fs::write(dir.path().join("leftover.txt"), "x").unwrap();

        assert!(matches!(
            layout.prepare(false),
            Err(NeuralPlanError::OutputExists { .. })
        ));
        assert!(layout.prepare(true).is_ok());
    }

    #[test]
    fn test_persisted_config_records_derived_sizes() {
        let dir = TempDir::new().unwrap();
        let layout = OutputLayout::new(dir.path().join("run"));
        layout.prepare(false).unwrap();

        let config = RunConfig::new(Environment::Bartender).with_use_text(true);
        persist_run_config(&config, "cpu", &layout.run_config_path()).unwrap();

        let contents = std::fs::read_to_string(layout.run_config_path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&contents).unwrap();

        assert_eq!(value["environment"], "bartender");
        assert_eq!(value["derived"]["constraint_size"], 4096);
        assert_eq!(value["derived"]["predictor_input_size"], 410);
    }
}
