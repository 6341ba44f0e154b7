//! Configuration types for the lab bench toolkit.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the serial temperature monitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Serial port name (e.g. "COM9" or "/dev/ttyACM0")
    #[serde(default = "default_port")]
    pub port: String,

    /// Baud rate
    #[serde(default = "default_baud")]
    pub baud: u32,

    /// Read timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Overtemperature threshold in degrees Celsius
    #[serde(default = "default_t_os")]
    pub t_os: f64,

    /// Hysteresis threshold in degrees Celsius
    #[serde(default = "default_t_hist")]
    pub t_hist: f64,

    /// Number of samples kept in the rolling chart window
    #[serde(default = "default_window")]
    pub window: usize,

    /// Re-render the chart every N samples
    #[serde(default = "default_chart_every")]
    pub chart_every: usize,
}

fn default_port() -> String {
    "/dev/ttyACM0".to_string()
}

fn default_baud() -> u32 {
    9600
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_t_os() -> f64 {
    28.0
}

fn default_t_hist() -> f64 {
    26.0
}

fn default_window() -> usize {
    60
}

fn default_chart_every() -> usize {
    5
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud: default_baud(),
            timeout_ms: default_timeout_ms(),
            t_os: default_t_os(),
            t_hist: default_t_hist(),
            window: default_window(),
            chart_every: default_chart_every(),
        }
    }
}

/// Configuration for curve fitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittingConfig {
    /// Polynomial degree fitted by default
    #[serde(default = "default_degree")]
    pub degree: usize,

    /// Number of bins in the residual histogram
    #[serde(default = "default_residual_bins")]
    pub residual_bins: usize,
}

fn default_degree() -> usize {
    2
}

fn default_residual_bins() -> usize {
    20
}

impl Default for FittingConfig {
    fn default() -> Self {
        Self {
            degree: default_degree(),
            residual_bins: default_residual_bins(),
        }
    }
}

/// Configuration for chart rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    /// Chart width in pixels
    #[serde(default = "default_width")]
    pub width: u32,

    /// Chart height in pixels
    #[serde(default = "default_height")]
    pub height: u32,

    /// Maximum number of points plotted before subsampling kicks in
    #[serde(default = "default_max_points")]
    pub max_points: usize,
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_max_points() -> usize {
    100_000
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            max_points: default_max_points(),
        }
    }
}

/// Configuration for raster annotation drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawingConfig {
    /// Canvas width when no input image is given
    #[serde(default = "default_canvas")]
    pub canvas_width: u32,

    /// Canvas height when no input image is given
    #[serde(default = "default_canvas")]
    pub canvas_height: u32,

    /// Default line thickness in pixels
    #[serde(default = "default_thickness")]
    pub thickness: u32,

    /// Default spacing between dots/dashes in pixels
    #[serde(default = "default_spacing")]
    pub spacing: u32,
}

fn default_canvas() -> u32 {
    800
}

fn default_thickness() -> u32 {
    2
}

fn default_spacing() -> u32 {
    20
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            canvas_width: default_canvas(),
            canvas_height: default_canvas(),
            thickness: default_thickness(),
            spacing: default_spacing(),
        }
    }
}

/// Main toolkit configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub fitting: FittingConfig,

    #[serde(default)]
    pub plot: PlotConfig,

    #[serde(default)]
    pub drawing: DrawingConfig,
}

impl LabConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: LabConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
