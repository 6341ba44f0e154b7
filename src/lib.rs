//! Lab bench toolkit.
//!
//! This crate collects the data-handling tools used around a home lab bench:
//! - Translating RNA sequences into amino acid chains
//! - General least-squares curve fitting with mixed basis functions
//! - Logging and charting a serial-attached temperature sensor
//! - Plotting two-column CSV time series to PNG
//! - Annotating raster images with stylized (dotted/dashed/corner) boxes
//!
//! # Example
//!
//! ```no_run
//! use labbench::{core::loaders::load_series_csv, processors::fitting::{fit, poly_basis}};
//!
//! let series = load_series_csv("velocity.csv").unwrap();
//! let result = fit(Some(&series.x), &series.y, &poly_basis(2)).unwrap();
//! println!("R^2 = {:.4}", result.r_squared);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod drawing;
pub mod processors;
pub mod visualization;

pub use config::{DrawingConfig, FittingConfig, LabConfig, MonitorConfig, PlotConfig};
pub use crate::core::loaders::Series;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
