//! `weldscan`: decode a weld image, detect defects and write a JSON report.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::{ArgAction, Parser};
use log::info;
use weldscan::detect::{detect_file, ImageDetectError};
use weldscan::pipeline::{extract_features, DetectIoError};
use weldscan::{summarize, DetectConfig, DetectReport, DetectorStrategy, EnhancementMode};

#[cfg(feature = "tracing")]
use tracing_log::LogTracer;

#[derive(Parser, Debug)]
#[command(name = "weldscan", version, about = "Detect weld defects in an image")]
struct Cli {
    /// Input image; overrides `image_path` from `--config`.
    image: Option<PathBuf>,

    /// JSON run configuration (mode, threshold, strategy, parameter overrides).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enhancement profile: standard, advanced (default) or high_sensitivity.
    #[arg(short, long)]
    mode: Option<EnhancementMode>,

    /// Minimum confidence in [0, 1].
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Detector generation: enhanced or simple.
    #[arg(long)]
    strategy: Option<DetectorStrategy>,

    /// Report path (default: `weldscan_report.json`).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the report to stdout instead of writing it.
    #[arg(long)]
    stdout: bool,

    /// Leave the intensity histogram and statistics out of the report.
    #[arg(long)]
    no_features: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("no input image (pass a path or set `image_path` in the config)")]
    MissingImage,

    #[error("{path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: DetectIoError,
    },

    #[error("{path}: {source}")]
    Detect {
        path: String,
        #[source]
        source: ImageDetectError,
    },

    #[error(transparent)]
    Report(#[from] DetectIoError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn init_logging(verbosity: u8) {
    #[cfg(feature = "tracing")]
    {
        let _ = verbosity;
        let _ = LogTracer::init();
        weldscan::core::init_tracing(false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let level = weldscan::core::level_from_verbosity(verbosity);
        let _ = weldscan::core::init_with_level(level);
    }
}

fn resolve_config(cli: &Cli) -> Result<DetectConfig, CliError> {
    let mut cfg = match &cli.config {
        Some(path) => DetectConfig::load_json(path).map_err(|source| CliError::Config {
            path: path.clone(),
            source,
        })?,
        None => DetectConfig::new(String::new()),
    };
    if let Some(image) = &cli.image {
        cfg.image_path = image.display().to_string();
    }
    if cfg.image_path.is_empty() {
        return Err(CliError::MissingImage);
    }
    if let Some(mode) = cli.mode {
        cfg.mode = mode;
    }
    if let Some(threshold) = cli.threshold {
        cfg.confidence_threshold = threshold;
    }
    if cli.strategy.is_some() {
        cfg.strategy = cli.strategy;
    }
    if let Some(output) = &cli.output {
        cfg.output_path = Some(output.display().to_string());
    }
    Ok(cfg)
}

fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = resolve_config(&cli)?;
    let detector = cfg.build_detector();

    let started = Instant::now();
    let (field, detections) = detect_file(
        &cfg.image_path,
        &detector,
        cfg.mode,
        cfg.confidence_threshold,
    )
    .map_err(|source| CliError::Detect {
        path: cfg.image_path.clone(),
        source,
    })?;
    let elapsed_ms = started.elapsed().as_secs_f64() * 1e3;
    info!(
        "{}: {} detections in {elapsed_ms:.1} ms",
        cfg.image_path,
        detections.len()
    );

    let summary = summarize(&detections);
    let report = DetectReport {
        image_path: cfg.image_path.clone(),
        width: field.width(),
        height: field.height(),
        mode: cfg.mode,
        strategy: detector.params().strategy,
        confidence_threshold: cfg.confidence_threshold,
        detections,
        summary,
        features: (!cli.no_features).then(|| extract_features(&field)),
        elapsed_ms,
    };

    if cli.stdout {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let path = cfg.output_path();
        report.write_json(&path)?;
        println!(
            "{} defects (severity: {:?}) -> {}",
            report.summary.total,
            report.summary.severity,
            path.display()
        );
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
