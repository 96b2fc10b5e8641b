//! Sequence models that turn a scaled window into one scaled prediction.

pub mod heuristic;
pub mod onnx;

pub use heuristic::PersistenceModel;
pub use onnx::OnnxModel;

use crate::config::{ModelKind, PipelineConfig};
use crate::error::Result;
use crate::window::ScaledWindow;

/// A loaded, read-only model.
///
/// Implementations must not mutate state across calls; the same instance is
/// shared by every request.
pub trait SequenceModel: Send + Sync {
    /// Runs one forward pass over a `(1, window_size, 1)` window.
    fn predict(&self, window: &ScaledWindow) -> Result<f64>;

    /// Number of time steps the model expects.
    fn window_size(&self) -> usize;

    fn kind(&self) -> ModelKind;
}

/// Loads the model selected by the configuration.
pub fn load_model(config: &PipelineConfig) -> Result<Box<dyn SequenceModel>> {
    match config.model {
        ModelKind::Onnx => Ok(Box::new(OnnxModel::load(
            &config.model_path,
            config.window_size,
        )?)),
        ModelKind::Persistence => {
            log::warn!("using persistence model; no artifact is loaded");
            Ok(Box::new(PersistenceModel::new(config.window_size)))
        }
    }
}
