//! Held-out test accessor for embedding export.

use std::collections::BTreeMap;

use crate::config::RunConfig;
use crate::error::{NeuralPlanError, Result};

use super::DatasetDims;

/// Nested scene -> object mapping.
type Groups = BTreeMap<String, BTreeMap<String, Vec<f32>>>;

/// Unshuffled test-time accessor keyed by scene and object name.
///
/// Holds one voxel grid per scene/object and one constraint representation
/// per scene/constraint entry. Every key present in the held-out set is
/// preserved verbatim; export re-keys its archives from these names.
#[derive(Debug, Clone)]
pub struct TestSet {
    dims: DatasetDims,
    voxels: Groups,
    constraints: Groups,
}

impl TestSet {
    /// Create an empty test set for the given run.
    pub fn new(config: &RunConfig) -> Self {
        Self {
            dims: DatasetDims::for_run(config),
            voxels: BTreeMap::new(),
            constraints: BTreeMap::new(),
        }
    }

    /// Tensor widths entries must satisfy.
    pub fn dims(&self) -> DatasetDims {
        self.dims
    }

    /// Insert a voxel grid for (scene, object). Rejects wrong lengths.
    pub fn insert_voxel(&mut self, scene: &str, object: &str, data: Vec<f32>) -> Result<()> {
        if data.len() != self.dims.voxel_len() {
            return Err(NeuralPlanError::InvalidData(format!(
                "voxel grid for {scene}/{object} has {} values, expected {}",
                data.len(),
                self.dims.voxel_len()
            )));
        }
        self.voxels
            .entry(scene.to_string())
            .or_default()
            .insert(object.to_string(), data);
        Ok(())
    }

    /// Insert a constraint representation for (scene, name). Rejects wrong lengths.
    pub fn insert_constraint(&mut self, scene: &str, name: &str, data: Vec<f32>) -> Result<()> {
        if data.len() != self.dims.constraint_size {
            return Err(NeuralPlanError::InvalidData(format!(
                "constraint for {scene}/{name} has {} values, expected {}",
                data.len(),
                self.dims.constraint_size
            )));
        }
        self.constraints
            .entry(scene.to_string())
            .or_default()
            .insert(name.to_string(), data);
        Ok(())
    }

    /// All voxel entries, grouped by scene.
    pub fn voxel_groups(&self) -> &Groups {
        &self.voxels
    }

    /// All constraint entries, grouped by scene.
    pub fn constraint_groups(&self) -> &Groups {
        &self.constraints
    }

    /// Look up one voxel grid.
    pub fn voxel(&self, scene: &str, object: &str) -> Result<&[f32]> {
        self.voxels
            .get(scene)
            .and_then(|objects| objects.get(object))
            .map(Vec::as_slice)
            .ok_or_else(|| NeuralPlanError::MissingEntry {
                scene: scene.to_string(),
                name: object.to_string(),
            })
    }

    /// Look up one constraint representation.
    pub fn constraint(&self, scene: &str, name: &str) -> Result<&[f32]> {
        self.constraints
            .get(scene)
            .and_then(|entries| entries.get(name))
            .map(Vec::as_slice)
            .ok_or_else(|| NeuralPlanError::MissingEntry {
                scene: scene.to_string(),
                name: name.to_string(),
            })
    }

    /// Whether the accessor holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty() && self.constraints.is_empty()
    }
}
