//! Reservation pipeline CLI
//!
//! Runs the whole pipeline or a single stage against one configuration file.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{PipelineConfig, DEFAULT_CONFIG_PATH};
use crate::pipeline::TrainingPipeline;
use crate::training::ModelMetrics;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<16} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "reservation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hotel reservation cancellation training pipeline")]
#[command(long_about = None)]
pub struct Cli {
    /// Pipeline configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest, process and train (default)
    Run,
    /// Download the raw object and split it into train and test files
    Ingest,
    /// Preprocess, balance and select features on the raw splits
    Process,
    /// Train and evaluate a model on the processed splits
    Train,
}

fn load_pipeline(config_path: &Path) -> anyhow::Result<TrainingPipeline> {
    step_run(&format!("Loading config {}", config_path.display()));
    let config = PipelineConfig::from_file(config_path)?;
    step_done("");
    Ok(TrainingPipeline::new(config))
}

fn print_metrics(metrics: &ModelMetrics) {
    println!();
    kv("Accuracy", &format!("{:.4}", metrics.accuracy));
    kv("Precision", &format!("{:.4}", metrics.precision));
    kv("Recall", &format!("{:.4}", metrics.recall));
    kv("F1", &format!("{:.4}", metrics.f1_score));
    kv("Time", &format!("{:.3}s", metrics.training_time_secs));
    println!();
}

pub fn cmd_ingest(config_path: &Path) -> anyhow::Result<()> {
    section("Ingest");
    let pipeline = load_pipeline(config_path)?;

    step_run("Downloading and splitting");
    let start = Instant::now();
    pipeline.ingest()?;
    step_done(&format!("{:?}", start.elapsed()));

    let paths = &pipeline.config().paths;
    step_ok(&format!("{}", paths.train_file().display()));
    step_ok(&format!("{}", paths.test_file().display()));
    Ok(())
}

pub fn cmd_process(config_path: &Path) -> anyhow::Result<()> {
    section("Process");
    let pipeline = load_pipeline(config_path)?;

    step_run("Preprocessing, balancing, selecting features");
    let start = Instant::now();
    let splits = pipeline.process()?;
    step_done(&format!(
        "{} train rows, {} test rows in {:?}",
        splits.train.height(),
        splits.test.height(),
        start.elapsed()
    ));

    kv("Columns", &splits.columns.join(", "));
    Ok(())
}

pub fn cmd_train(config_path: &Path) -> anyhow::Result<()> {
    section("Train");
    let pipeline = load_pipeline(config_path)?;

    step_run(&format!("Training {}", "random_forest".cyan()));
    let (_, metrics) = pipeline.train()?;
    step_done("");

    print_metrics(&metrics);
    step_ok(&format!("{}", pipeline.config().paths.model_file().display()));
    Ok(())
}

pub fn cmd_run(config_path: &Path) -> anyhow::Result<()> {
    section("Pipeline");
    let pipeline = load_pipeline(config_path)?;
    let start = Instant::now();

    step_run("Ingesting");
    pipeline.ingest()?;
    step_done("");

    step_run("Processing");
    let splits = pipeline.process()?;
    step_done(&format!("{} features", splits.columns.len().saturating_sub(1)));

    step_run("Training");
    let (_, metrics) = pipeline.train()?;
    step_done(&format!("{:?} total", start.elapsed()));

    print_metrics(&metrics);
    Ok(())
}
