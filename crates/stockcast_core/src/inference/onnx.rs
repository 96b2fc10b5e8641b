use super::SequenceModel;
use crate::config::ModelKind;
use crate::error::{ForecastError, Result};
use crate::window::ScaledWindow;
use std::path::Path;

/// Sequence model executed through the tract ONNX runtime.
///
/// The exported network takes one sample of `window_size` steps with a single
/// feature, shape `(1, window_size, 1)`, and emits one scaled value.
pub struct OnnxModel {
    #[allow(clippy::type_complexity)]
    plan: tract_onnx::prelude::SimplePlan<
        tract_onnx::prelude::TypedFact,
        Box<dyn tract_onnx::prelude::TypedOp>,
        tract_onnx::prelude::Graph<
            tract_onnx::prelude::TypedFact,
            Box<dyn tract_onnx::prelude::TypedOp>,
        >,
    >,
    window_size: usize,
}

impl OnnxModel {
    /// Loads and optimizes an ONNX model for a fixed window size.
    pub fn load<P: AsRef<Path>>(path: P, window_size: usize) -> Result<Self> {
        use tract_onnx::prelude::*;

        let path = path.as_ref();
        if !path.is_file() {
            return Err(ForecastError::ModelLoad(format!(
                "model artifact not found at {}",
                path.display()
            )));
        }

        let load_err = |stage: &str, e: TractError| {
            ForecastError::ModelLoad(format!("{} ({}): {:#}", stage, path.display(), e))
        };

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| load_err("failed to parse model", e))?
            .with_input_fact(0, f32::fact([1, window_size, 1]).into())
            .map_err(|e| load_err("failed to set input fact", e))?
            .into_optimized()
            .map_err(|e| load_err("failed to optimize model", e))?
            .into_runnable()
            .map_err(|e| load_err("failed to create runnable model", e))?;

        log::info!(
            "loaded ONNX model from {} with input shape (1, {}, 1)",
            path.display(),
            window_size
        );
        Ok(Self { plan, window_size })
    }
}

impl SequenceModel for OnnxModel {
    fn predict(&self, window: &ScaledWindow) -> Result<f64> {
        use tract_onnx::prelude::*;

        if window.len() != self.window_size {
            return Err(ForecastError::Inference(format!(
                "expected input shape (1, {}, 1), got {:?}",
                self.window_size,
                window.shape()
            )));
        }

        let steps: Vec<f32> = window.steps().iter().map(|&v| v as f32).collect();
        let input = tract_ndarray::Array3::from_shape_vec((1, self.window_size, 1), steps)
            .map_err(|e| ForecastError::Inference(format!("failed to create input array: {}", e)))?;
        let input_tensor: Tensor = input.into();

        let result = self
            .plan
            .run(tvec![input_tensor.into()])
            .map_err(|e| ForecastError::Inference(format!("failed to run model: {:#}", e)))?;

        let output = result
            .first()
            .ok_or_else(|| ForecastError::Inference("model produced no outputs".to_string()))?
            .to_array_view::<f32>()
            .map_err(|e| ForecastError::Inference(format!("failed to read output: {:#}", e)))?;

        // Single prediction head: the first element is the forecast.
        output
            .iter()
            .next()
            .map(|&v| v as f64)
            .ok_or_else(|| ForecastError::Inference("model output is empty".to_string()))
    }

    fn window_size(&self) -> usize {
        self.window_size
    }

    fn kind(&self) -> ModelKind {
        ModelKind::Onnx
    }
}
