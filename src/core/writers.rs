//! Data writers for CSV output files.
//!
//! This module provides writers for:
//! - Temperature sample logs (`timestamp,temperature`)
//! - Curve-fit reports (`x,y,fitted,residual`)

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use thiserror::Error;

/// Errors that can occur during write operations.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create parent directories.
    #[error("failed to create parent directories for '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to create or open file for writing.
    #[error("failed to create file '{path}': {source}")]
    CreateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// CSV writing error.
    #[error("CSV write error for '{path}': {source}")]
    CsvError {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Mismatched array lengths.
    #[error("array length mismatch: expected {expected} rows, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Creates parent directories for a file path if they don't exist.
fn ensure_parent_dirs(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WriteError::CreateDirectory {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Incremental CSV writer for temperature samples.
///
/// Writes a `timestamp,temperature` header on creation and one row per
/// appended sample. Rows are flushed as they are written so the log survives
/// an interrupted monitoring session.
pub struct SampleWriter {
    writer: csv::Writer<BufWriter<File>>,
    path: String,
}

impl SampleWriter {
    /// Create the log file (parent directories included) and write the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        ensure_parent_dirs(path)?;

        let file = File::create(path).map_err(|e| WriteError::CreateFile {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut writer = csv::Writer::from_writer(BufWriter::new(file));
        let path_str = path.display().to_string();

        writer
            .write_record(["timestamp", "temperature"])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;

        Ok(Self {
            writer,
            path: path_str,
        })
    }

    /// Append one sample row and flush.
    pub fn append(&mut self, timestamp: &str, temperature: f64) -> Result<()> {
        self.writer
            .write_record(&[timestamp.to_string(), format!("{:.3}", temperature)])
            .map_err(|e| WriteError::CsvError {
                path: self.path.clone(),
                source: e,
            })?;

        self.writer.flush().map_err(|e| WriteError::CsvError {
            path: self.path.clone(),
            source: csv::Error::from(e),
        })?;

        Ok(())
    }
}

/// Write a curve-fit report to CSV with `x,y,fitted,residual` columns.
///
/// # Arguments
///
/// * `path` - Output file path (parent directories will be created if needed)
/// * `x` - x-ordinate of each data point
/// * `y` - observed values
/// * `fitted` - fitted values (same length as `y`)
/// * `residuals` - residuals (same length as `y`)
///
/// # Errors
///
/// Returns an error if the slices disagree in length or the file cannot be
/// created or written to.
pub fn write_fit_report(
    path: &Path,
    x: &[f64],
    y: &[f64],
    fitted: &[f64],
    residuals: &[f64],
) -> Result<()> {
    let n = x.len();
    for actual in [y.len(), fitted.len(), residuals.len()] {
        if actual != n {
            return Err(WriteError::LengthMismatch {
                expected: n,
                actual,
            });
        }
    }

    ensure_parent_dirs(path)?;

    let file = File::create(path).map_err(|e| WriteError::CreateFile {
        path: path.display().to_string(),
        source: e,
    })?;
    let mut csv_writer = csv::Writer::from_writer(BufWriter::new(file));

    let path_str = path.display().to_string();

    csv_writer
        .write_record(["x", "y", "fitted", "residual"])
        .map_err(|e| WriteError::CsvError {
            path: path_str.clone(),
            source: e,
        })?;

    for i in 0..n {
        csv_writer
            .write_record(&[
                format!("{:.6}", x[i]),
                format!("{:.6}", y[i]),
                format!("{:.6}", fitted[i]),
                format!("{:.6}", residuals[i]),
            ])
            .map_err(|e| WriteError::CsvError {
                path: path_str.clone(),
                source: e,
            })?;
    }

    csv_writer.flush().map_err(|e| WriteError::CsvError {
        path: path_str,
        source: csv::Error::from(e),
    })?;

    Ok(())
}
