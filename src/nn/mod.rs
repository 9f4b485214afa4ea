//! Network modules.
//!
//! The three function approximators are composed through tensor
//! concatenation, not inheritance: `PlannerModel` wires them together for
//! the joint optimizer, but they share no behavior.

mod constraint;
mod mlp;
mod model;
mod predictor;
mod scene;

pub use constraint::ConstraintEncoder;
pub use mlp::{Mlp, MlpConfig};
pub use model::PlannerModel;
pub use predictor::{Predictor, PredictorRecord};
pub use scene::SceneEncoder;
