use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::{Args, ValueEnum};

use crate::window::WINDOW_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// Pre-trained network exported to ONNX
    Onnx,
    /// Repeats the last scaled step; no artifact required
    Persistence,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::Onnx => "onnx",
            ModelKind::Persistence => "persistence",
        }
    }
}

/// Startup artifacts and window geometry for the forecasting pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Args))]
pub struct PipelineConfig {
    /// Model backend (Onnx, Persistence)
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = ModelKind::Onnx))]
    pub model: ModelKind,

    /// Path to the ONNX model artifact
    #[cfg_attr(feature = "cli", arg(long, default_value = "inventory_model.onnx"))]
    pub model_path: String,

    /// Path to the fitted scaler parameters (JSON)
    #[cfg_attr(feature = "cli", arg(long, default_value = "scaler.json"))]
    pub scaler_path: String,

    /// Path to the historical data (CSV with a header row)
    #[cfg_attr(feature = "cli", arg(long, default_value = "inventory_data_large.csv"))]
    pub history_path: String,

    /// Name of the consumption column in the history CSV
    #[cfg_attr(feature = "cli", arg(long, default_value = "Consumption"))]
    pub history_column: String,

    /// Time steps per model input
    #[cfg_attr(feature = "cli", arg(long, default_value_t = WINDOW_SIZE))]
    pub window_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: ModelKind::Onnx,
            model_path: "inventory_model.onnx".to_string(),
            scaler_path: "scaler.json".to_string(),
            history_path: "inventory_data_large.csv".to_string(),
            history_column: "Consumption".to_string(),
            window_size: WINDOW_SIZE,
        }
    }
}
