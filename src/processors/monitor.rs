//! Serial temperature sensor logging.
//!
//! The sensor firmware prints one line per reading in the form
//! `Measurement N: Temperature = 25.13`. This module reads those lines from
//! a serial port, keeps a rolling window of recent samples, appends every
//! sample to a CSV log and periodically re-renders a PNG chart with the
//! overtemperature and hysteresis thresholds drawn as dashed lines.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use regex::Regex;
use thiserror::Error;

use crate::config::{MonitorConfig, PlotConfig};
use crate::core::loaders::Series;
use crate::core::writers::{SampleWriter, WriteError};
use crate::visualization::{self, ChartOptions, VisualizationError};

/// Errors that can occur during monitoring.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Chart(#[from] VisualizationError),
}

/// Result type for monitoring operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// One temperature reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Seconds since the monitoring session started.
    pub elapsed_s: f64,
    /// Wall-clock time of day (UTC, HH:MM:SS) for the log file.
    pub clock: String,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
}

/// Parse a temperature value out of a sensor line.
///
/// Only lines containing `Measurement` carry a reading; everything else
/// (boot banners, blank lines, partial reads) returns `None`. The value
/// itself follows `Temperature =` and may be wrapped in stray CR noise.
pub fn parse_temperature(line: &str) -> Option<f64> {
    if !line.contains("Measurement") {
        return None;
    }

    static TEMP_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"Temperature\s*=\s*(-?\d+(?:\.\d+)?)").unwrap());

    TEMP_RE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Rolling window of the most recent samples.
#[derive(Debug)]
pub struct SampleWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SampleWindow {
    /// Creates a window holding at most `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Push a sample, dropping the oldest when the window is full.
    pub fn push(&mut self, sample: Sample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true when no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The window as a plottable (elapsed, temperature) series.
    pub fn to_series(&self) -> Series {
        let mut series = Series::new("temperature");
        for sample in &self.samples {
            series.push(sample.elapsed_s, sample.temperature);
        }
        series
    }
}

/// Summary of a completed monitoring session.
#[derive(Debug, Clone)]
pub struct MonitorSummary {
    /// Total samples logged.
    pub samples: usize,
    /// Lowest temperature seen.
    pub min: f64,
    /// Highest temperature seen.
    pub max: f64,
    /// Last temperature seen.
    pub last: f64,
    /// Chart path, when charting was enabled.
    pub chart: Option<PathBuf>,
}

/// Format seconds-since-midnight as HH:MM:SS.
fn format_clock(unix_secs: u64) -> String {
    let day_secs = unix_secs % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        day_secs / 3600,
        (day_secs % 3600) / 60,
        day_secs % 60
    )
}

fn now_clock() -> String {
    let unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs();
    format_clock(unix)
}

/// Open the configured serial port.
pub fn open_port(config: &MonitorConfig) -> Result<Box<dyn serialport::SerialPort>> {
    let port = serialport::new(&config.port, config.baud)
        .timeout(Duration::from_millis(config.timeout_ms))
        .open()?;
    info!("opened {} at {} baud", config.port, config.baud);
    Ok(port)
}

/// Run the monitoring loop against an already-open line source.
///
/// Reads lines until `max_samples` temperature readings have been logged or
/// the source ends. Read timeouts are retried; they just mean the sensor has
/// not printed yet. Every sample is appended to `log`, and when `chart_path`
/// is set the rolling window is re-rendered every
/// [`MonitorConfig::chart_every`] samples and once more at the end.
pub fn run_loop<R: BufRead>(
    mut reader: R,
    config: &MonitorConfig,
    plot_config: &PlotConfig,
    log: &mut SampleWriter,
    chart_path: Option<&Path>,
    max_samples: usize,
) -> Result<MonitorSummary> {
    let started = Instant::now();
    let mut window = SampleWindow::new(config.window);
    // A zero interval from a hand-edited config means "every sample"
    let chart_every = config.chart_every.max(1);

    let mut count = 0usize;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    let mut last = f64::NAN;

    let mut buf = Vec::with_capacity(128);

    while count < max_samples {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => {
                debug!("line source ended after {} samples", count);
                break;
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }

        let line = String::from_utf8_lossy(&buf);
        let Some(temperature) = parse_temperature(&line) else {
            continue;
        };

        let sample = Sample {
            elapsed_s: started.elapsed().as_secs_f64(),
            clock: now_clock(),
            temperature,
        };

        log.append(&sample.clock, sample.temperature)?;
        info!("T = {:.3} at {}", sample.temperature, sample.clock);

        min = min.min(temperature);
        max = max.max(temperature);
        last = temperature;
        window.push(sample);
        count += 1;

        if let Some(path) = chart_path {
            if count % chart_every == 0 {
                render_chart(path, &window, config, plot_config)?;
            }
        }
    }

    if let Some(path) = chart_path {
        if !window.is_empty() {
            render_chart(path, &window, config, plot_config)?;
        }
    }

    if count == 0 {
        warn!("no temperature readings received");
        min = f64::NAN;
        max = f64::NAN;
    }

    Ok(MonitorSummary {
        samples: count,
        min,
        max,
        last,
        chart: chart_path.map(Path::to_path_buf),
    })
}

/// Render the rolling window to a PNG with threshold lines.
fn render_chart(
    path: &Path,
    window: &SampleWindow,
    config: &MonitorConfig,
    plot_config: &PlotConfig,
) -> Result<()> {
    let series = window.to_series();
    let options = ChartOptions {
        title: Some("Temperature Sensor".to_string()),
        x_label: Some("Time / s".to_string()),
        y_label: Some("Temperature / \u{b0}C".to_string()),
        thresholds: vec![
            (format!("T_os = {}", config.t_os), config.t_os),
            (format!("T_hist = {}", config.t_hist), config.t_hist),
        ],
        ..ChartOptions::from_plot_config(plot_config)
    };

    visualization::plot_series(path, std::slice::from_ref(&series), &options)?;
    Ok(())
}

/// Echo raw serial lines to stdout, reproducing the bare port test loop.
///
/// Reads until `max_lines` non-empty lines have been printed (or forever
/// when `max_lines` is `None`).
pub fn echo_lines<R: BufRead>(mut reader: R, max_lines: Option<usize>) -> Result<usize> {
    let mut printed = 0usize;
    let mut buf = Vec::with_capacity(128);

    loop {
        if let Some(limit) = max_lines {
            if printed >= limit {
                break;
            }
        }

        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
            Err(e) => return Err(e.into()),
        }

        let line = String::from_utf8_lossy(&buf);
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if !trimmed.is_empty() {
            println!("{}", trimmed);
            printed += 1;
        }
    }

    Ok(printed)
}

/// Convenience wrapper: open the configured port and run the loop on it.
pub fn monitor_port(
    config: &MonitorConfig,
    plot_config: &PlotConfig,
    log_path: &Path,
    chart_path: Option<&Path>,
    max_samples: usize,
) -> Result<MonitorSummary> {
    let port = open_port(config)?;
    let reader = BufReader::new(port);
    let mut log = SampleWriter::create(log_path)?;
    run_loop(reader, config, plot_config, &mut log, chart_path, max_samples)
}
