//! envguard - Envelope-Based Vibration Anomaly Detection
//!
//! Trains a healthy-machine reference envelope from a training corpus and
//! flags test signals whose mean preprocessed amplitude exceeds the derived
//! statistical threshold.
//!
//! # Usage
//!
//! ```bash
//! # Detect against synthetic commissioning data
//! envguard-simulate --seed 7
//! envguard --train-dir data/train --test-dir data/test
//!
//! # Tighter operating point, persisted reference
//! envguard --train-dir data/train --test-dir data/test \
//!     --confidence 0.99 --save-reference data/reference.json
//! ```
//!
//! # Environment Variables
//!
//! - `ENVGUARD_CONFIG`: Path to a `monitor_config.toml`
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use envguard::baseline::{classify_corpus, train_reference_envelope};
use envguard::config::MonitorConfig;
use envguard::ingest;
use envguard::processing::preprocess;
use envguard::types::ChannelSelector;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "envguard")]
#[command(about = "Envelope-based vibration anomaly detection")]
#[command(version)]
struct CliArgs {
    /// Directory of training (assumed-healthy) vibration records
    #[arg(long, value_name = "DIR")]
    train_dir: PathBuf,

    /// Directory of test vibration records to classify
    #[arg(long, value_name = "DIR")]
    test_dir: PathBuf,

    /// Path to a monitor_config.toml (overrides the ENVGUARD_CONFIG search)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the configured confidence level, in (0, 1)
    #[arg(long)]
    confidence: Option<f64>,

    /// Override the configured number of training signals to average
    #[arg(long)]
    train_count: Option<usize>,

    /// Override the configured sensor channel
    #[arg(long, value_enum)]
    channel: Option<ChannelSelector>,

    /// Persist the trained reference envelope as JSON
    #[arg(long, value_name = "FILE")]
    save_reference: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => MonitorConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => MonitorConfig::load().context("Failed to load config")?,
    };
    if let Some(confidence) = args.confidence {
        config.confidence = confidence;
    }
    if let Some(train_count) = args.train_count {
        config.train_count = train_count;
    }
    if let Some(channel) = args.channel {
        config.channel = channel;
    }
    config.validate().context("Invalid configuration")?;

    info!(
        sample_rate_hz = config.sample_rate_hz,
        band_low_hz = config.band_low_hz,
        band_high_hz = config.band_high_hz,
        channel = %config.channel,
        confidence = config.confidence,
        "Starting envelope detection"
    );

    // Train the reference envelope from the healthy corpus
    let training = ingest::load_corpus(&args.train_dir, config.channel)
        .with_context(|| format!("Failed to load training corpus from {}", args.train_dir.display()))?;
    let reference = train_reference_envelope(&training, config.train_count, &config)
        .context("Failed to train reference envelope")?;

    if let Some(path) = &args.save_reference {
        reference
            .save_to_file(path)
            .with_context(|| format!("Failed to save reference envelope to {}", path.display()))?;
    }

    // Preprocess and classify the test corpus
    let test_raw = ingest::load_corpus(&args.test_dir, config.channel)
        .with_context(|| format!("Failed to load test corpus from {}", args.test_dir.display()))?;
    let preprocessed: Vec<Vec<f64>> = test_raw
        .par_iter()
        .map(|signal| preprocess(signal, &config))
        .collect::<Result<_, _>>()
        .context("Failed to preprocess test corpus")?;

    let result = classify_corpus(&reference, &preprocessed, config.confidence)
        .context("Classification failed")?;

    // Report
    println!("Envelope Anomaly Detection Report");
    println!("=================================");
    println!("Training signals averaged: {}", reference.signals_used);
    println!(
        "Reference envelope: mean {:.6}, std {:.6}",
        reference.mean()?,
        reference.std()?
    );
    println!(
        "Threshold: {:.6} (confidence {:.3}, z {:.4})",
        result.threshold, result.confidence, result.z_score
    );
    println!(
        "Flagged {} of {} test signals",
        result.flagged_count(),
        result.signals_tested
    );
    for flagged in &result.flagged {
        println!(
            "  [{}] mean amplitude {:.6} (threshold {:.6})",
            flagged.index, flagged.mean_amplitude, result.threshold
        );
    }

    Ok(())
}
