//! Data loaders for two-column CSV series and RNA sequence files.
//!
//! This module provides parsers for:
//! - Time/value CSV files (e.g. acceleration or velocity logs)
//! - Plain-text RNA sequence files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use log::debug;
use thiserror::Error;

/// Errors that can occur during file loading.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Empty file: {0}")]
    EmptyFile(PathBuf),

    #[error("No parseable rows in {0}")]
    NoData(PathBuf),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// A two-column numeric series loaded from a CSV file.
#[derive(Debug, Clone)]
pub struct Series {
    /// First-column values (usually time).
    pub x: Vec<f64>,
    /// Second-column values.
    pub y: Vec<f64>,
    /// Name of the series, derived from the file stem when loaded from disk.
    pub name: String,
}

impl Series {
    /// Creates a new empty series.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            name: name.into(),
        }
    }

    /// Creates a series from parallel coordinate vectors.
    pub fn from_xy(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        Self {
            x,
            y,
            name: name.into(),
        }
    }

    /// Returns the number of points in the series.
    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Returns true if the series holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Adds a point to the series.
    #[inline]
    pub fn push(&mut self, x: f64, y: f64) {
        self.x.push(x);
        self.y.push(y);
    }
}

/// Load a two-column numeric series from a CSV file.
///
/// Rows whose first two fields do not both parse as floats are skipped,
/// so files with header rows or stray text load cleanly.
///
/// # Arguments
///
/// * `path` - Path to the CSV file
///
/// # Returns
///
/// A `Series` named after the file stem.
///
/// # Errors
///
/// Returns an error if the file cannot be read or contains no parseable rows.
pub fn load_series_csv<P: AsRef<Path>>(path: P) -> Result<Series> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "series".to_string());

    let mut series = Series::new(name);
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = result?;

        let x = record.get(0).and_then(|s| s.trim().parse::<f64>().ok());
        let y = record.get(1).and_then(|s| s.trim().parse::<f64>().ok());

        match (x, y) {
            (Some(x), Some(y)) => series.push(x, y),
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!(
            "{}: skipped {} unparseable row(s)",
            path.display(),
            skipped
        );
    }

    if series.is_empty() {
        return Err(LoaderError::NoData(path.to_path_buf()));
    }

    Ok(series)
}

/// Load an RNA sequence from a plain-text file.
///
/// All whitespace (including line breaks) is stripped and the sequence is
/// upper-cased; validation of the bases themselves happens at translation
/// time, where the position of a bad codon can be reported.
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no sequence data.
pub fn load_rna<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path)?;
    let mut raw = String::new();
    file.read_to_string(&mut raw)?;

    let sequence: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if sequence.is_empty() {
        return Err(LoaderError::EmptyFile(path.to_path_buf()));
    }

    Ok(sequence)
}

/// List the CSV files directly inside a directory, sorted by name.
///
/// Used by the batch plotting command to discover inputs.
pub fn list_csv_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("csv"))
                    .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_series_operations() {
        let mut series = Series::new("test");
        assert!(series.is_empty());

        series.push(0.0, 1.0);
        series.push(0.5, 2.0);

        assert_eq!(series.len(), 2);
        assert_eq!(series.x, vec![0.0, 0.5]);
        assert_eq!(series.y, vec![1.0, 2.0]);
    }

    #[test]
    fn test_load_series_csv() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0.0,12.5").unwrap();
        writeln!(file, "0.1,13.0").unwrap();
        writeln!(file, "0.2,13.4").unwrap();
        file.flush().unwrap();

        let series = load_series_csv(file.path())?;
        assert_eq!(series.len(), 3);
        assert_eq!(series.x[1], 0.1);
        assert_eq!(series.y[2], 13.4);

        Ok(())
    }

    #[test]
    fn test_load_series_csv_skips_bad_rows() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "time,velocity").unwrap();
        writeln!(file, "0.0,4.2").unwrap();
        writeln!(file, "not,a number").unwrap();
        writeln!(file, "1.0,4.8").unwrap();
        file.flush().unwrap();

        let series = load_series_csv(file.path())?;
        assert_eq!(series.len(), 2);
        assert_eq!(series.y, vec![4.2, 4.8]);

        Ok(())
    }

    #[test]
    fn test_load_series_csv_no_data() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "time,velocity").unwrap();
        file.flush().unwrap();

        let result = load_series_csv(file.path());
        assert!(matches!(result, Err(LoaderError::NoData(_))));
    }

    #[test]
    fn test_load_rna_strips_whitespace() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "aug gua").unwrap();
        writeln!(file, "AAC").unwrap();
        file.flush().unwrap();

        let rna = load_rna(file.path())?;
        assert_eq!(rna, "AUGGUAAAC");

        Ok(())
    }

    #[test]
    fn test_list_csv_files() -> Result<()> {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("b.csv"), "1,2\n").unwrap();
        std::fs::write(dir.path().join("a.csv"), "1,2\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let files = list_csv_files(dir.path())?;
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.csv"));

        Ok(())
    }
}
