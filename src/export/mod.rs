//! Export of trained modules.
//!
//! Two independent operations: freezing the predictor into a standalone
//! artifact, and precomputing embedding archives over the held-out test set.
//! Both run on trained (or checkpoint-loaded) modules on a non-autodiff
//! backend, so no gradients are tracked and no training-mode layers fire.

mod archive;
mod embedding;
mod freeze;

pub use archive::EmbeddingArchive;
pub use embedding::{
    export_all, export_constraint_embeddings, export_scene_embeddings, ExportOutput,
};
pub use freeze::{freeze_predictor, FrozenPredictor};
