//! Builds the model input from the history prefix and one new observation.

use crate::error::{ForecastError, Result};
use crate::scaler::{Column, MinMaxScaler, Row, N_COLUMNS};

/// Number of time steps the model consumes per prediction.
pub const WINDOW_SIZE: usize = 30;

/// Scaled consumption column laid out as one sample, `len()` steps, one feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledWindow {
    steps: Vec<f64>,
}

impl ScaledWindow {
    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Tensor shape `(batch, time steps, features)`.
    pub fn shape(&self) -> [usize; 3] {
        [1, self.steps.len(), 1]
    }

    pub fn last_step(&self) -> Option<f64> {
        self.steps.last().copied()
    }
}

/// Assembles and scales fixed-size windows.
#[derive(Debug, Clone, Copy)]
pub struct WindowBuilder<'a> {
    scaler: &'a MinMaxScaler,
    window_size: usize,
}

impl<'a> WindowBuilder<'a> {
    pub fn new(scaler: &'a MinMaxScaler, window_size: usize) -> Self {
        Self {
            scaler,
            window_size,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Appends `new_value` to `prefix` and pairs every step with a zero
    /// ending-quantity placeholder.
    pub fn assemble(&self, prefix: &[f64], new_value: f64) -> Result<Vec<Row>> {
        if prefix.len() + 1 != self.window_size {
            return Err(ForecastError::Inference(format!(
                "history prefix has {} steps, window needs {}",
                prefix.len(),
                self.window_size.saturating_sub(1)
            )));
        }

        let rows = prefix
            .iter()
            .copied()
            .chain(std::iter::once(new_value))
            .map(|consumption| {
                let mut row = [0.0; N_COLUMNS];
                row[Column::Consumption.index()] = consumption;
                row
            })
            .collect();
        Ok(rows)
    }

    /// Assembles the window, scales both columns, and keeps the consumption column.
    pub fn build(&self, prefix: &[f64], new_value: f64) -> Result<ScaledWindow> {
        let rows = self.assemble(prefix, new_value)?;
        let scaled = self.scaler.transform(&rows);

        let steps: Vec<f64> = scaled
            .iter()
            .map(|row| row[Column::Consumption.index()])
            .collect();
        debug_assert_eq!(steps.len(), self.window_size);

        Ok(ScaledWindow { steps })
    }
}
