//! Consumption forecasting from a pre-trained sequence model.
//!
//! A request carries one new consumption observation. It is appended to a
//! fixed history prefix, min-max scaled, fed to the model as a
//! `(1, window_size, 1)` window, and the scaled output is mapped back to
//! consumption units through the scaler's second column.
//!
//! ```no_run
//! use stockcast_core::{ForecastContext, PipelineConfig};
//!
//! let ctx = ForecastContext::load(&PipelineConfig::default())?;
//! let forecast = ctx.forecast("42.5")?;
//! println!("next: {}", forecast.prediction);
//! # Ok::<(), stockcast_core::ForecastError>(())
//! ```

pub mod config;
pub mod error;
pub mod history;
pub mod inference;
pub mod pipeline;
pub mod rescaler;
pub mod scaler;
pub mod window;

pub use config::{ModelKind, PipelineConfig};
pub use error::{ForecastError, Result};
pub use history::HistoryBuffer;
pub use inference::{load_model, OnnxModel, PersistenceModel, SequenceModel};
pub use pipeline::{round2, ErrorKind, Forecast, ForecastContext, ForecastResponse};
pub use rescaler::InverseRescaler;
pub use scaler::{Column, MinMaxScaler, Row, ScalerParams, N_COLUMNS};
pub use window::{ScaledWindow, WindowBuilder, WINDOW_SIZE};
