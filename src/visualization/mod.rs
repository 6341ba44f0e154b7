//! Chart rendering for series data and fit diagnostics.
//!
//! This module renders PNG charts with the plotters library:
//! - Line charts of one or more (time, value) series with optional fixed
//!   y-limits and dashed threshold lines
//! - Fit diagnostics: data scatter with the fitted curve, and a histogram of
//!   standardized residuals beneath

use std::path::Path;

use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::PlotConfig;
use crate::core::loaders::Series;
use crate::processors::fitting::{standardized_residuals, FitResult};

/// Errors that can occur during chart rendering.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot")]
    EmptyData,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

/// Series color palette.
const SERIES_COLORS: &[(u8, u8, u8)] = &[
    (55, 126, 184),  // Blue
    (228, 26, 28),   // Red
    (77, 175, 74),   // Green
    (152, 78, 163),  // Purple
    (255, 127, 0),   // Orange
    (166, 86, 40),   // Brown
    (247, 129, 191), // Pink
    (153, 153, 153), // Gray
];

/// Color for threshold lines.
const THRESHOLD_COLOR: RGBColor = RGBColor(228, 26, 28);

/// Color for the fitted curve.
const FIT_COLOR: RGBColor = RGBColor(228, 26, 28);

/// Color for residual histogram bars.
const HISTOGRAM_COLOR: RGBColor = RGBColor(247, 129, 191);

/// Rendering options for series charts.
#[derive(Debug, Clone)]
pub struct ChartOptions {
    /// Title (unused - charts are rendered without text, no fonts on WSL).
    pub title: Option<String>,
    /// X-axis label (unused, see `title`).
    pub x_label: Option<String>,
    /// Y-axis label (unused, see `title`).
    pub y_label: Option<String>,
    /// Fixed y-axis limits; computed from the data when absent.
    pub y_range: Option<(f64, f64)>,
    /// Horizontal dashed threshold lines, as (label, value) pairs.
    pub thresholds: Vec<(String, f64)>,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
    /// Maximum points per series before subsampling.
    pub max_points: usize,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self::from_plot_config(&PlotConfig::default())
    }
}

impl ChartOptions {
    /// Build options from the configured chart dimensions.
    pub fn from_plot_config(config: &PlotConfig) -> Self {
        Self {
            title: None,
            x_label: None,
            y_label: None,
            y_range: None,
            thresholds: Vec::new(),
            width: config.width,
            height: config.height,
            max_points: config.max_points,
        }
    }
}

/// Plot one or more series as a line chart and save as PNG.
///
/// Each series is drawn in the next palette color. Thresholds from the
/// options are drawn as dashed horizontal lines across the full x-range.
///
/// # Errors
///
/// Returns an error if every series is empty or the chart cannot be
/// rendered or written.
pub fn plot_series(output_path: &Path, series: &[Series], options: &ChartOptions) -> Result<()> {
    if series.iter().all(|s| s.is_empty()) {
        return Err(VisualizationError::EmptyData);
    }

    let (x_min, x_max) = padded_range(series.iter().flat_map(|s| s.x.iter().copied()));
    let (y_min, y_max) = match options.y_range {
        Some((lo, hi)) => (lo, hi),
        None => {
            let threshold_values = options.thresholds.iter().map(|(_, v)| *v);
            padded_range(
                series
                    .iter()
                    .flat_map(|s| s.y.iter().copied())
                    .chain(threshold_values),
            )
        }
    };

    let root =
        BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    for (idx, s) in series.iter().enumerate() {
        let step = subsample_step(s.len(), options.max_points);
        let (r, g, b) = SERIES_COLORS[idx % SERIES_COLORS.len()];
        let color = RGBColor(r, g, b);

        chart
            .draw_series(LineSeries::new(
                (0..s.len())
                    .step_by(step)
                    .map(|i| (s.x[i], s.y[i])),
                color.stroke_width(2),
            ))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    for (_, value) in &options.thresholds {
        chart
            .draw_series(DashedLineSeries::new(
                [(x_min, *value), (x_max, *value)],
                8,
                6,
                THRESHOLD_COLOR.stroke_width(1),
            ))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Plot fit diagnostics: scatter + fitted curve, residual histogram below.
///
/// The upper two thirds show the dataset as points with the fitted model
/// drawn through a dense x-grid; the lower third shows the distribution of
/// standardized residuals.
pub fn plot_fit(
    output_path: &Path,
    series: &Series,
    fit: &FitResult,
    residual_bins: usize,
    options: &ChartOptions,
) -> Result<()> {
    if series.is_empty() {
        return Err(VisualizationError::EmptyData);
    }

    let root =
        BitMapBackend::new(output_path, (options.width, options.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let (upper, lower) = root.split_vertically((options.height * 2) / 3);

    // Upper: dataset scatter plus fitted curve
    let (x_min, x_max) = padded_range(series.x.iter().copied());
    let (y_min, y_max) = padded_range(
        series
            .y
            .iter()
            .copied()
            .chain(fit.fitted.iter().copied()),
    );

    let mut data_chart = ChartBuilder::on(&upper)
        .margin(10)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    data_chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let step = subsample_step(series.len(), options.max_points);
    data_chart
        .draw_series(
            (0..series.len())
                .step_by(step)
                .map(|i| Circle::new((series.x[i], series.y[i]), 3, BLUE.filled())),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    // Fitted curve over a dense grid so sinusoidal terms stay smooth
    let curve_points = 512;
    let dx = (x_max - x_min) / (curve_points - 1) as f64;
    data_chart
        .draw_series(LineSeries::new(
            (0..curve_points).map(|i| {
                let x = x_min + dx * i as f64;
                (x, fit.predict(x))
            }),
            FIT_COLOR.stroke_width(2),
        ))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    // Lower: standardized residual histogram
    if let Some(standardized) = standardized_residuals(&fit.residuals) {
        draw_histogram(&lower, &standardized, residual_bins.max(1))?;
    }

    root.present()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Draw a histogram of values into a drawing area.
fn draw_histogram(
    area: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    values: &[f64],
    bins: usize,
) -> Result<()> {
    let (lo, hi) = padded_range(values.iter().copied());
    let bin_width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values {
        let idx = (((v - lo) / bin_width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    let max_count = counts.iter().copied().max().unwrap_or(1).max(1);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .build_cartesian_2d(lo..hi, 0f64..(max_count as f64 * 1.1))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .draw()
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, &count)| {
            let x0 = lo + bin_width * i as f64;
            let x1 = x0 + bin_width;
            Rectangle::new([(x0, 0.0), (x1, count as f64)], HISTOGRAM_COLOR.filled())
        }))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Subsampling step that keeps a series under the point cap.
fn subsample_step(len: usize, max_points: usize) -> usize {
    if len > max_points && max_points > 0 {
        len.div_ceil(max_points)
    } else {
        1
    }
}

/// Min/max of an iterator with 5% padding, widened when degenerate.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut lo = f64::MAX;
    let mut hi = f64::MIN;

    for v in values {
        if v < lo {
            lo = v;
        }
        if v > hi {
            hi = v;
        }
    }

    if lo > hi {
        return (0.0, 1.0);
    }

    if (hi - lo).abs() < f64::EPSILON {
        lo -= 1.0;
        hi += 1.0;
    }

    let padding = (hi - lo) * 0.05;
    (lo - padding, hi + padding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::fitting::{fit, poly_basis};
    use tempfile::tempdir;

    fn small_options() -> ChartOptions {
        ChartOptions {
            width: 320,
            height: 240,
            ..ChartOptions::default()
        }
    }

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range([0.0, 10.0].into_iter());
        assert_eq!(lo, -0.5);
        assert_eq!(hi, 10.5);

        // Degenerate span widens around the value
        let (lo, hi) = padded_range([5.0, 5.0].into_iter());
        assert!(lo < 5.0 && hi > 5.0);

        // Empty input gets a unit range
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
    }

    #[test]
    fn test_subsample_step() {
        assert_eq!(subsample_step(100, 1000), 1);
        assert_eq!(subsample_step(1000, 100), 10);
        assert_eq!(subsample_step(1001, 100), 11);
    }

    #[test]
    fn test_plot_series_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("series.png");

        let series = Series::from_xy(
            "temps",
            vec![0.0, 1.0, 2.0, 3.0],
            vec![24.0, 25.0, 26.5, 26.0],
        );
        let options = ChartOptions {
            thresholds: vec![("T_os".to_string(), 28.0)],
            ..small_options()
        };

        plot_series(&path, &[series], &options).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_series_fixed_y_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("limits.png");

        let series = Series::from_xy("data", vec![0.0, 1.0], vec![5.0, 15.0]);
        let options = ChartOptions {
            y_range: Some((0.0, 30.0)),
            ..small_options()
        };

        plot_series(&path, &[series], &options).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_plot_series_empty_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.png");

        let result = plot_series(&path, &[Series::new("empty")], &ChartOptions::default());
        assert!(matches!(result, Err(VisualizationError::EmptyData)));
    }

    #[test]
    fn test_plot_fit_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fit.png");

        let x: Vec<f64> = (0..30).map(|i| i as f64 * 0.2).collect();
        let y: Vec<f64> = x
            .iter()
            .enumerate()
            .map(|(i, v)| 1.0 + 0.5 * v + if i % 2 == 0 { 0.05 } else { -0.05 })
            .collect();
        let result = fit(Some(&x), &y, &poly_basis(1)).unwrap();
        let series = Series::from_xy("data", x, y);

        plot_fit(&path, &series, &result, 10, &small_options()).unwrap();
        assert!(path.exists());
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
