//! Fixed history prefix shared by every request.

use crate::error::{ForecastError, Result};
use std::collections::VecDeque;
use std::io;
use std::path::Path;

/// The most recent `window_size - 1` consumption values, oldest first.
///
/// Loaded once at startup and never updated: every request appends its own
/// observation to this same prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    prefix: Vec<f64>,
    window_size: usize,
    source_rows: usize,
}

impl HistoryBuffer {
    /// Loads the trailing prefix from a CSV file with a header row.
    pub fn load<P: AsRef<Path>>(path: P, column: &str, window_size: usize) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            ForecastError::Config(format!("cannot open history {}: {}", path.display(), e))
        })?;
        let buffer = Self::from_reader(file, column, window_size)?;

        log::info!(
            "loaded history from {}: kept last {} of {} rows",
            path.display(),
            buffer.prefix.len(),
            buffer.source_rows
        );
        Ok(buffer)
    }

    /// Reads CSV data, keeping only the cells of `column` that end up in the prefix.
    pub fn from_reader<R: io::Read>(reader: R, column: &str, window_size: usize) -> Result<Self> {
        let needed = prefix_len(window_size)?;

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let col_idx = rdr
            .headers()?
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| {
                ForecastError::Config(format!("history source has no `{}` column", column))
            })?;

        // (data row number, raw cell) for the trailing rows only
        let mut tail: VecDeque<(usize, String)> = VecDeque::with_capacity(needed + 1);
        let mut source_rows = 0;
        for record in rdr.records() {
            let record = record?;
            source_rows += 1;
            let cell = record.get(col_idx).unwrap_or_default().to_string();
            tail.push_back((source_rows, cell));
            if tail.len() > needed {
                tail.pop_front();
            }
        }

        if source_rows < needed {
            return Err(ForecastError::InsufficientHistory {
                needed,
                got: source_rows,
            });
        }

        let prefix = tail
            .into_iter()
            .map(|(row, cell)| parse_cell(row, column, &cell))
            .collect::<Result<Vec<f64>>>()?;

        Ok(Self {
            prefix,
            window_size,
            source_rows,
        })
    }

    /// Keeps the trailing prefix of an in-memory series.
    pub fn from_series(series: &[f64], window_size: usize) -> Result<Self> {
        let needed = prefix_len(window_size)?;
        if series.len() < needed {
            return Err(ForecastError::InsufficientHistory {
                needed,
                got: series.len(),
            });
        }
        if let Some(bad) = series[series.len() - needed..].iter().find(|v| !v.is_finite()) {
            return Err(ForecastError::Config(format!(
                "history contains non-finite value {}",
                bad
            )));
        }

        Ok(Self {
            prefix: series[series.len() - needed..].to_vec(),
            window_size,
            source_rows: series.len(),
        })
    }

    pub fn prefix(&self) -> &[f64] {
        &self.prefix
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of rows in the source before trimming.
    pub fn source_rows(&self) -> usize {
        self.source_rows
    }
}

fn prefix_len(window_size: usize) -> Result<usize> {
    if window_size == 0 {
        return Err(ForecastError::Config(
            "window_size must be at least 1".to_string(),
        ));
    }
    Ok(window_size - 1)
}

fn parse_cell(row: usize, column: &str, cell: &str) -> Result<f64> {
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ForecastError::Config(format!(
            "history row {}: `{}` value {:?} is not a finite number",
            row, column, cell
        ))),
    }
}
