//! Binary entrypoint for the feedback loop.
//!
//! Delegates all logic to the library crate; no local modules here.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use feedback_loop::config::Configuration;
use feedback_loop::pipeline::FeedbackPipeline;
use feedback_loop::render::viewer::{ViewerOptions, run_viewer};
use feedback_loop::seed::{random_seed, seed_rng};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

/// Simple CLI
#[derive(Debug, Parser)]
#[command(
    name = "feedback-loop",
    version,
    about = "Endless blur/sharpen feedback pattern"
)]
struct Cli {
    /// Path to YAML config file (built-in defaults when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override buffer width (px)
    #[arg(long, value_name = "PIXELS")]
    width: Option<u32>,

    /// Override buffer height (px)
    #[arg(long, value_name = "PIXELS")]
    height: Option<u32>,

    /// Deterministic seed for the initial noise
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Step this many frames without opening a window, then exit
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u64>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("feedback_loop={level}").parse()?)
        .add_directive("wgpu=warn".parse()?)
        .add_directive("winit=warn".parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Configuration> {
    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(width) = cli.width {
        cfg.width = width;
    }
    if let Some(height) = cli.height {
        cfg.height = height;
    }
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    cfg.validated().context("validating configuration")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let cfg = load_config(&cli)?;
    let settings = cfg.pipeline_settings()?;
    info!(
        width = cfg.width,
        height = cfg.height,
        zoom = cfg.zoom,
        order = ?cfg.stage_order,
        sharpen = ?cfg.sharpen,
        sampling = ?cfg.sampling,
        "configuration loaded"
    );

    let noise = random_seed(cfg.width, cfg.height, &mut seed_rng(cfg.seed));
    let mut pipeline = FeedbackPipeline::from_rgba8(cfg.width, cfg.height, &noise, settings)
        .context("building feedback pipeline")?;

    if let Some(frames) = cli.headless {
        let started = Instant::now();
        for _ in 0..frames {
            pipeline.step();
        }
        let view = pipeline.current();
        let n = view.pixels().len() as f64;
        let mean = view
            .pixels()
            .iter()
            .map(|p| f64::from(p[0] + p[1] + p[2]) / 3.0)
            .sum::<f64>()
            / n;
        info!(
            frames = pipeline.frame_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            mean_intensity = mean,
            "headless run finished"
        );
        return Ok(());
    }

    run_viewer(
        pipeline,
        ViewerOptions {
            fullscreen: cfg.fullscreen,
            frame_interval: cfg.frame_interval,
        },
    )
}
