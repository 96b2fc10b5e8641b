//! End-to-end forecast: window, predict, inverse-scale.

use crate::config::{ModelKind, PipelineConfig};
use crate::error::{ForecastError, Result};
use crate::history::HistoryBuffer;
use crate::inference::{load_model, SequenceModel};
use crate::rescaler::InverseRescaler;
use crate::scaler::MinMaxScaler;
use crate::window::WindowBuilder;
use serde::Serialize;

/// Everything a forecast needs, loaded once at startup and never mutated.
pub struct ForecastContext {
    scaler: MinMaxScaler,
    history: HistoryBuffer,
    model: Box<dyn SequenceModel>,
}

/// A successful forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Forecast {
    /// Consumption value submitted with the request
    pub input: f64,
    /// Raw model output in scaled units
    pub scaled: f64,
    /// Inverse-scaled prediction before rounding
    pub raw: f64,
    /// Prediction rounded to two decimals for presentation
    pub prediction: f64,
}

/// Client-facing classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    Inference,
    Internal,
}

impl ErrorKind {
    pub fn of(err: &ForecastError) -> Self {
        match err {
            ForecastError::InvalidInput(_) => ErrorKind::InvalidInput,
            ForecastError::Inference(_) => ErrorKind::Inference,
            _ => ErrorKind::Internal,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Invalid input: Please enter a numeric consumption value.",
            ErrorKind::Inference => "Prediction failed: the model rejected the prepared input.",
            ErrorKind::Internal => "Prediction failed due to an internal error.",
        }
    }
}

/// JSON body returned to the web layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ForecastResponse {
    Prediction { prediction: f64 },
    Error { error: String },
}

impl From<std::result::Result<Forecast, ErrorKind>> for ForecastResponse {
    fn from(outcome: std::result::Result<Forecast, ErrorKind>) -> Self {
        match outcome {
            Ok(forecast) => ForecastResponse::Prediction {
                prediction: forecast.prediction,
            },
            Err(kind) => ForecastResponse::Error {
                error: kind.message().to_string(),
            },
        }
    }
}

impl ForecastContext {
    /// Assembles a context, checking that history and model agree on the window size.
    pub fn new(
        scaler: MinMaxScaler,
        history: HistoryBuffer,
        model: Box<dyn SequenceModel>,
    ) -> Result<Self> {
        if history.window_size() != model.window_size() {
            return Err(ForecastError::Config(format!(
                "history is prepared for window {} but model expects {}",
                history.window_size(),
                model.window_size()
            )));
        }
        Ok(Self {
            scaler,
            history,
            model,
        })
    }

    /// Loads history, scaler and model from the configured artifacts.
    pub fn load(config: &PipelineConfig) -> Result<Self> {
        let history = HistoryBuffer::load(
            &config.history_path,
            &config.history_column,
            config.window_size,
        )?;
        let scaler = MinMaxScaler::load(&config.scaler_path)?;
        let model = load_model(config)?;
        Self::new(scaler, history, model)
    }

    /// Parses a raw form value and forecasts from it.
    pub fn forecast(&self, raw: &str) -> Result<Forecast> {
        let value = parse_consumption(raw)?;
        let (scaled, rescaled) = self.run(value)?;

        Ok(Forecast {
            input: value,
            scaled,
            raw: rescaled,
            prediction: round2(rescaled),
        })
    }

    /// Forecasts from a numeric value, returning the unrounded prediction.
    pub fn forecast_value(&self, value: f64) -> Result<f64> {
        if !value.is_finite() {
            return Err(ForecastError::InvalidInput(format!(
                "consumption must be finite, got {}",
                value
            )));
        }
        self.run(value).map(|(_, rescaled)| rescaled)
    }

    /// Request boundary: forecasts and classifies any failure.
    ///
    /// The internal error text is logged here and replaced by a fixed message.
    pub fn respond(&self, raw: &str) -> std::result::Result<Forecast, ErrorKind> {
        self.forecast(raw).map_err(|e| {
            let kind = ErrorKind::of(&e);
            log::warn!("forecast for input {:?} failed ({:?}): {}", raw, kind, e);
            kind
        })
    }

    pub fn scaler(&self) -> &MinMaxScaler {
        &self.scaler
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn model_kind(&self) -> ModelKind {
        self.model.kind()
    }

    pub fn window_size(&self) -> usize {
        self.history.window_size()
    }

    fn run(&self, value: f64) -> Result<(f64, f64)> {
        let window = WindowBuilder::new(&self.scaler, self.window_size())
            .build(self.history.prefix(), value)?;
        let scaled = self.model.predict(&window)?;
        let rescaled = InverseRescaler::new(&self.scaler).rescale(scaled);
        if !scaled.is_finite() || !rescaled.is_finite() {
            return Err(ForecastError::Inference(format!(
                "model output {} rescales to non-finite value {}",
                scaled, rescaled
            )));
        }

        log::debug!(
            "forecast: input={} scaled_output={} prediction={}",
            value,
            scaled,
            rescaled
        );
        Ok((scaled, rescaled))
    }
}

fn parse_consumption(raw: &str) -> Result<f64> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ForecastError::InvalidInput(format!(
            "{:?} is not a finite number",
            raw
        ))),
    }
}

/// Rounds half away from zero to two decimal places.
///
/// Magnitudes too large to carry a fractional hundredth are returned as is.
pub fn round2(value: f64) -> f64 {
    let hundredths = value * 100.0;
    if !hundredths.is_finite() || hundredths.abs() >= 2f64.powi(52) {
        return value;
    }
    hundredths.round() / 100.0
}
