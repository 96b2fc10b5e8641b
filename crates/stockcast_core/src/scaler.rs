//! Two-column min-max scaling fitted at training time.
//!
//! The model was trained on rows of `(consumption, ending_quantity)`, each
//! column scaled with its own parameters. Column order matters: the forward
//! pass reads column 0, the inverse pass writes the prediction into column 1.
//! Mixing them up produces wrong forecasts without any error.

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Number of columns the scaler was fitted on.
pub const N_COLUMNS: usize = 2;

/// One scaler row, indexed by [`Column`].
pub type Row = [f64; N_COLUMNS];

/// Column positions in a scaler row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// Observed consumption. The only column fed to the model.
    Consumption = 0,
    /// Ending quantity. Zero-filled on the way in, holds the prediction on the way out.
    EndingQuantity = 1,
}

impl Column {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Serialized form of a fitted min-max scaler.
///
/// `scale` and `min` are optional: when absent they are derived from the data
/// bounds and `feature_range`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerParams {
    #[serde(default = "default_feature_range")]
    pub feature_range: (f64, f64),
    pub data_min: Vec<f64>,
    pub data_max: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Vec<f64>>,
}

fn default_feature_range() -> (f64, f64) {
    (0.0, 1.0)
}

/// Per-column affine transform `x * scale + min` and its inverse.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    feature_range: (f64, f64),
    data_min: Row,
    data_max: Row,
    scale: Row,
    min: Row,
}

impl MinMaxScaler {
    /// Loads a fitted scaler from a JSON artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ForecastError::Config(format!("cannot read scaler {}: {}", path.display(), e))
        })?;
        let params: ScalerParams = serde_json::from_str(&content)?;
        let scaler = Self::from_params(params)?;

        log::info!(
            "loaded scaler from {} (data_min={:?}, data_max={:?})",
            path.display(),
            scaler.data_min,
            scaler.data_max
        );
        Ok(scaler)
    }

    /// Builds a scaler from deserialized parameters, checking the 2-column shape.
    pub fn from_params(params: ScalerParams) -> Result<Self> {
        let data_min = to_row("data_min", &params.data_min)?;
        let data_max = to_row("data_max", &params.data_max)?;
        let mut scaler = Self::from_bounds(data_min, data_max, params.feature_range)?;

        if let Some(scale) = &params.scale {
            scaler.scale = to_row("scale", scale)?;
        }
        if let Some(min) = &params.min {
            scaler.min = to_row("min", min)?;
        }
        scaler.validate()?;
        Ok(scaler)
    }

    /// Derives the transform from per-column data bounds.
    pub fn from_bounds(data_min: Row, data_max: Row, feature_range: (f64, f64)) -> Result<Self> {
        let (lo, hi) = feature_range;
        if lo.is_nan() || hi.is_nan() || lo >= hi {
            return Err(ForecastError::Config(format!(
                "feature_range must be increasing, got ({}, {})",
                lo, hi
            )));
        }

        let mut scale = [0.0; N_COLUMNS];
        let mut min = [0.0; N_COLUMNS];
        for col in 0..N_COLUMNS {
            let mut range = data_max[col] - data_min[col];
            // Constant column: keep values at the lower bound instead of dividing by zero.
            if range == 0.0 {
                range = 1.0;
            }
            scale[col] = (hi - lo) / range;
            min[col] = lo - data_min[col] * scale[col];
        }

        let scaler = Self {
            feature_range,
            data_min,
            data_max,
            scale,
            min,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Fits the scaler on in-memory rows.
    pub fn fit(rows: &[Row], feature_range: (f64, f64)) -> Result<Self> {
        if rows.is_empty() {
            return Err(ForecastError::Config(
                "cannot fit scaler on empty data".to_string(),
            ));
        }

        let mut data_min = [f64::INFINITY; N_COLUMNS];
        let mut data_max = [f64::NEG_INFINITY; N_COLUMNS];
        for row in rows {
            for col in 0..N_COLUMNS {
                data_min[col] = data_min[col].min(row[col]);
                data_max[col] = data_max[col].max(row[col]);
            }
        }
        Self::from_bounds(data_min, data_max, feature_range)
    }

    pub fn transform(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter()
            .map(|row| {
                let mut out = [0.0; N_COLUMNS];
                for col in 0..N_COLUMNS {
                    out[col] = row[col] * self.scale[col] + self.min[col];
                }
                out
            })
            .collect()
    }

    pub fn inverse_transform(&self, rows: &[Row]) -> Vec<Row> {
        rows.iter()
            .map(|row| {
                let mut out = [0.0; N_COLUMNS];
                for col in 0..N_COLUMNS {
                    out[col] = (row[col] - self.min[col]) / self.scale[col];
                }
                out
            })
            .collect()
    }

    /// Serializable parameters, including the derived `scale` and `min`.
    pub fn params(&self) -> ScalerParams {
        ScalerParams {
            feature_range: self.feature_range,
            data_min: self.data_min.to_vec(),
            data_max: self.data_max.to_vec(),
            scale: Some(self.scale.to_vec()),
            min: Some(self.min.to_vec()),
        }
    }

    pub fn data_min(&self) -> Row {
        self.data_min
    }

    pub fn data_max(&self) -> Row {
        self.data_max
    }

    fn validate(&self) -> Result<()> {
        let mut all = self
            .scale
            .iter()
            .chain(&self.min)
            .chain(&self.data_min)
            .chain(&self.data_max);
        if all.any(|v| !v.is_finite()) {
            return Err(ForecastError::Config(
                "scaler parameters must be finite".to_string(),
            ));
        }
        if self.scale.iter().any(|&s| s == 0.0) {
            return Err(ForecastError::Config(
                "scaler scale must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn to_row(name: &str, values: &[f64]) -> Result<Row> {
    <Row>::try_from(values).map_err(|_| {
        ForecastError::Config(format!(
            "scaler field `{}` must have {} columns, got {}",
            name,
            N_COLUMNS,
            values.len()
        ))
    })
}
