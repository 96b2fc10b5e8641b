//! Maps a scaled model output back to consumption units.

use crate::scaler::{Column, MinMaxScaler, N_COLUMNS};

/// Inverse-scales a prediction through the ending-quantity column.
///
/// The model was trained to predict the second scaler column, so the scaled
/// value goes into column 1 with a zero placeholder in column 0, and column 1
/// is read back after the inverse transform.
#[derive(Debug, Clone, Copy)]
pub struct InverseRescaler<'a> {
    scaler: &'a MinMaxScaler,
}

impl<'a> InverseRescaler<'a> {
    pub fn new(scaler: &'a MinMaxScaler) -> Self {
        Self { scaler }
    }

    pub fn rescale(&self, scaled_value: f64) -> f64 {
        let mut row = [0.0; N_COLUMNS];
        row[Column::EndingQuantity.index()] = scaled_value;

        let restored = self.scaler.inverse_transform(&[row]);
        restored[0][Column::EndingQuantity.index()]
    }
}
