//! Command-line interface for the lab bench toolkit.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use image::RgbImage;

use crate::config::LabConfig;
use crate::core::loaders;
use crate::core::writers;
use crate::drawing::{self, BoxSpec};
use crate::processors::fitting::{self, Basis};
use crate::processors::monitor;
use crate::processors::translation::{self, CodonRole};
use crate::visualization::{self, ChartOptions};

#[derive(Parser)]
#[command(name = "labbench")]
#[command(about = "Lab bench toolkit: translate, fit, plot, monitor, annotate", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate an RNA sequence into amino acids
    Translate {
        /// RNA sequence (reads from --file when omitted)
        sequence: Option<String>,
        /// Read the sequence from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Print only the single-letter chain
        #[arg(long)]
        codes: bool,
    },

    /// Least-squares fit of a two-column CSV
    Fit {
        /// Input CSV file (x in the first column, y in the second)
        input: PathBuf,
        /// Polynomial degree
        #[arg(short, long)]
        degree: Option<u32>,
        /// Add sin and cos basis terms at this frequency
        #[arg(long)]
        frequency: Option<f64>,
        /// Add a sqrt(x) basis term
        #[arg(long)]
        sqrt: bool,
        /// Add an x*ln(x) basis term
        #[arg(long)]
        xlogx: bool,
        /// Ignore the x column and fit against sample indices
        #[arg(long)]
        index_x: bool,
        /// Write a fit report CSV (x, y, fitted, residual)
        #[arg(short, long)]
        report: Option<PathBuf>,
        /// Write a diagnostic plot PNG (scatter + curve, residual histogram)
        #[arg(short, long)]
        plot: Option<PathBuf>,
    },

    /// Plot two-column CSV files as PNG line charts
    Plot {
        /// CSV files, or a single directory to plot in batch
        inputs: Vec<PathBuf>,
        /// Output directory (defaults next to each input)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Fixed lower y-limit
        #[arg(long)]
        y_min: Option<f64>,
        /// Fixed upper y-limit
        #[arg(long)]
        y_max: Option<f64>,
        /// Draw all inputs into one combined chart at this path
        #[arg(long)]
        combined: Option<PathBuf>,
    },

    /// Log a serial temperature sensor to CSV with a live PNG chart
    Monitor {
        /// Serial port (overrides config)
        #[arg(short, long)]
        port: Option<String>,
        /// Baud rate (overrides config)
        #[arg(short, long)]
        baud: Option<u32>,
        /// Stop after this many samples
        #[arg(short, long, default_value_t = 60)]
        samples: usize,
        /// CSV log path
        #[arg(short, long, default_value = "temperature_log.csv")]
        log: PathBuf,
        /// Rolling chart PNG path
        #[arg(long)]
        chart: Option<PathBuf>,
        /// Just echo raw serial lines to stdout
        #[arg(long)]
        echo: bool,
    },

    /// Draw stylized annotation boxes onto a raster image
    Annotate {
        /// Output PNG path
        #[arg(short, long, default_value = "annotated.png")]
        output: PathBuf,
        /// Input image (a blank canvas is created when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// YAML file listing annotation boxes (built-in demo layout when omitted)
        #[arg(long)]
        boxes: Option<PathBuf>,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Truncate a value to fit the summary box, counting characters so
/// non-ASCII paths and sequences do not split mid-character.
fn fit_summary_value(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let head: String = value.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", head)
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<62} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        println!("║ {:<20}: {:<39} ║", key, fit_summary_value(value, 39));
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match LabConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                LabConfig::default()
            }
        },
        None => LabConfig::default(),
    };

    let result = match cli.command {
        Commands::Translate {
            sequence,
            file,
            codes,
        } => cmd_translate(sequence, file, codes),
        Commands::Fit {
            input,
            degree,
            frequency,
            sqrt,
            xlogx,
            index_x,
            report,
            plot,
        } => cmd_fit(
            &input, degree, frequency, sqrt, xlogx, index_x, report, plot, &config,
        ),
        Commands::Plot {
            inputs,
            output_dir,
            y_min,
            y_max,
            combined,
        } => cmd_plot(&inputs, output_dir, y_min, y_max, combined, &config),
        Commands::Monitor {
            port,
            baud,
            samples,
            log,
            chart,
            echo,
        } => cmd_monitor(port, baud, samples, &log, chart, echo, &config),
        Commands::Annotate {
            output,
            input,
            boxes,
        } => cmd_annotate(&output, input, boxes, &config),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn cmd_translate(sequence: Option<String>, file: Option<PathBuf>, codes: bool) -> Result<()> {
    let start = Instant::now();

    let rna = match (sequence, file) {
        (Some(seq), _) => seq.trim().to_ascii_uppercase(),
        (None, Some(path)) => loaders::load_rna(&path)
            .with_context(|| format!("Failed to read sequence from {}", path.display()))?,
        (None, None) => bail!("provide an RNA sequence or --file"),
    };

    let chain = translation::translate(&rna)?;

    if codes {
        println!("{}", translation::chain_codes(&chain));
    } else {
        for acid in &chain {
            let marker = match acid.role {
                CodonRole::Start => " [start]",
                CodonRole::Stop => " [stop]",
                CodonRole::Internal => "",
            };
            println!("{}{}", acid, marker);
        }
    }

    let stops = chain.iter().filter(|a| a.role == CodonRole::Stop).count();

    print_summary(
        "Translation Complete",
        &[
            ("Sequence length", rna.len().to_string()),
            ("Amino acids", chain.len().to_string()),
            ("Stop codons", stops.to_string()),
            ("Chain", translation::chain_codes(&chain)),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_fit(
    input: &Path,
    degree: Option<u32>,
    frequency: Option<f64>,
    sqrt: bool,
    xlogx: bool,
    index_x: bool,
    report: Option<PathBuf>,
    plot: Option<PathBuf>,
    config: &LabConfig,
) -> Result<()> {
    let start = Instant::now();

    let series = loaders::load_series_csv(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;

    let mut bases = Vec::new();
    if let Some(freq) = frequency {
        bases.push(Basis::Sin(freq));
        bases.push(Basis::Cos(freq));
    }
    if sqrt {
        bases.push(Basis::Sqrt);
    }
    if xlogx {
        bases.push(Basis::XLogX);
    }
    let degree = degree.unwrap_or(config.fitting.degree as u32);
    bases.extend(fitting::poly_basis(degree));

    let spinner = create_spinner("Fitting...");

    let x = if index_x { None } else { Some(series.x.as_slice()) };
    let result = fitting::fit(x, &series.y, &bases);

    spinner.finish_and_clear();

    let result = result.with_context(|| format!("Fit failed for {}", input.display()))?;

    println!("Coefficients:");
    for (basis, coeff) in result.bases().iter().zip(&result.coefficients) {
        println!("  {:>14}  {:+.6e}", basis.to_string(), coeff);
    }

    if let Some(path) = &report {
        writers::write_fit_report(path, &series.x, &series.y, &result.fitted, &result.residuals)?;
        info!("wrote fit report to {}", path.display());
    }

    if let Some(path) = &plot {
        let options = ChartOptions::from_plot_config(&config.plot);
        visualization::plot_fit(path, &series, &result, config.fitting.residual_bins, &options)?;
        info!("wrote diagnostic plot to {}", path.display());
    }

    print_summary(
        "Fit Complete",
        &[
            ("Input file", input.display().to_string()),
            ("Points", series.len().to_string()),
            ("Basis functions", bases.len().to_string()),
            ("R^2", format!("{:.6}", result.r_squared)),
            ("MSE", format!("{:.6}", result.mse)),
            (
                "Report",
                report.map_or("-".to_string(), |p| p.display().to_string()),
            ),
            (
                "Plot",
                plot.map_or("-".to_string(), |p| p.display().to_string()),
            ),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_plot(
    inputs: &[PathBuf],
    output_dir: Option<PathBuf>,
    y_min: Option<f64>,
    y_max: Option<f64>,
    combined: Option<PathBuf>,
    config: &LabConfig,
) -> Result<()> {
    let start = Instant::now();

    if inputs.is_empty() {
        bail!("no input files given");
    }

    // A single directory argument expands to every CSV inside it
    let files: Vec<PathBuf> = if inputs.len() == 1 && inputs[0].is_dir() {
        loaders::list_csv_files(&inputs[0])?
    } else {
        inputs.to_vec()
    };

    if files.is_empty() {
        bail!("no CSV files found in {}", inputs[0].display());
    }

    let mut options = ChartOptions::from_plot_config(&config.plot);
    if let (Some(lo), Some(hi)) = (y_min, y_max) {
        options.y_range = Some((lo, hi));
    }

    let spinner = create_spinner("Rendering charts...");

    let charts = if let Some(combined_path) = &combined {
        let mut all = Vec::with_capacity(files.len());
        for path in &files {
            let series = loaders::load_series_csv(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            all.push(series);
        }
        visualization::plot_series(combined_path, &all, &options)?;
        vec![combined_path.clone()]
    } else {
        let results: Vec<Result<PathBuf>> = files
            .par_iter()
            .map(|path| {
                let series = loaders::load_series_csv(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?;
                let out = chart_path_for(path, output_dir.as_deref());
                visualization::plot_series(&out, std::slice::from_ref(&series), &options)?;
                Ok(out)
            })
            .collect();

        let mut charts = Vec::with_capacity(results.len());
        for result in results {
            charts.push(result?);
        }
        charts
    };

    spinner.finish_and_clear();

    print_summary(
        "Plot Complete",
        &[
            ("Input files", files.len().to_string()),
            ("Charts written", charts.len().to_string()),
            (
                "Y limits",
                options
                    .y_range
                    .map_or("auto".to_string(), |(lo, hi)| format!("{} .. {}", lo, hi)),
            ),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

/// Output PNG path for an input CSV: same stem, .png extension, optionally
/// relocated into an output directory.
fn chart_path_for(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let mut out = match output_dir {
        Some(dir) => dir.join(input.file_name().unwrap_or_default()),
        None => input.to_path_buf(),
    };
    out.set_extension("png");
    out
}

fn cmd_monitor(
    port: Option<String>,
    baud: Option<u32>,
    samples: usize,
    log: &Path,
    chart: Option<PathBuf>,
    echo: bool,
    config: &LabConfig,
) -> Result<()> {
    let start = Instant::now();

    let mut monitor_config = config.monitor.clone();
    if let Some(port) = port {
        monitor_config.port = port;
    }
    if let Some(baud) = baud {
        monitor_config.baud = baud;
    }

    if echo {
        let port = monitor::open_port(&monitor_config)?;
        let printed = monitor::echo_lines(std::io::BufReader::new(port), Some(samples))?;
        println!("{} line(s) echoed", printed);
        return Ok(());
    }

    println!("Monitoring {} at {} baud", monitor_config.port, monitor_config.baud);
    println!("Logging to {}", log.display());
    if let Some(path) = &chart {
        println!("Chart: {}", path.display());
    }

    let summary = monitor::monitor_port(
        &monitor_config,
        &config.plot,
        log,
        chart.as_deref(),
        samples,
    )?;

    print_summary(
        "Monitoring Complete",
        &[
            ("Port", monitor_config.port.clone()),
            ("Samples", summary.samples.to_string()),
            ("Min temp", format!("{:.3}", summary.min)),
            ("Max temp", format!("{:.3}", summary.max)),
            ("Last temp", format!("{:.3}", summary.last)),
            ("Log", log.display().to_string()),
            (
                "Chart",
                summary
                    .chart
                    .map_or("-".to_string(), |p| p.display().to_string()),
            ),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}

fn cmd_annotate(
    output: &Path,
    input: Option<PathBuf>,
    boxes: Option<PathBuf>,
    config: &LabConfig,
) -> Result<()> {
    let start = Instant::now();

    let mut img: RgbImage = match &input {
        Some(path) => image::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .to_rgb8(),
        None => RgbImage::new(config.drawing.canvas_width, config.drawing.canvas_height),
    };

    let specs: Vec<BoxSpec> = match &boxes {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Invalid annotation file {}", path.display()))?
        }
        None => drawing::demo_boxes(),
    };

    let spinner = create_spinner("Drawing annotations...");

    for spec in &specs {
        drawing::draw_box(&mut img, spec);
    }

    img.save(output)
        .with_context(|| format!("Failed to save {}", output.display()))?;

    spinner.finish_and_clear();

    print_summary(
        "Annotation Complete",
        &[
            (
                "Input",
                input.map_or("blank canvas".to_string(), |p| p.display().to_string()),
            ),
            ("Boxes drawn", specs.len().to_string()),
            ("Output", output.display().to_string()),
            (
                "Canvas",
                format!("{}x{}", img.width(), img.height()),
            ),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );

    Ok(())
}
