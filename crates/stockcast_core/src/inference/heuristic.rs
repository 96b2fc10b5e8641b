use super::SequenceModel;
use crate::config::ModelKind;
use crate::error::{ForecastError, Result};
use crate::window::ScaledWindow;

/// Persistence forecast: the next scaled value equals the last scaled step.
///
/// Needs no artifact, so it serves as a reference model for smoke runs and for
/// checking the scale/inverse-scale round trip end to end.
#[derive(Debug, Clone, Copy)]
pub struct PersistenceModel {
    window_size: usize,
}

impl PersistenceModel {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }
}

impl SequenceModel for PersistenceModel {
    fn predict(&self, window: &ScaledWindow) -> Result<f64> {
        if window.len() != self.window_size {
            return Err(ForecastError::Inference(format!(
                "expected input shape (1, {}, 1), got {:?}",
                self.window_size,
                window.shape()
            )));
        }
        window
            .last_step()
            .ok_or_else(|| ForecastError::Inference("empty window".to_string()))
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Persistence
    }
}
