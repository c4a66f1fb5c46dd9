//! Synthetic vibration data generator for commissioning dry-runs
//!
//! Writes a training directory of healthy records (unit-amplitude tone plus
//! sensor noise) and a test directory that appends a configurable number of
//! amplified records simulating bearing degradation. Output is the CSV record
//! format the `envguard` binary ingests.
//!
//! # Usage
//!
//! ```bash
//! envguard-simulate --seed 7
//! envguard-simulate --train-records 400 --test-normal 10 --test-degraded 2
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use envguard::ingest;
use envguard::types::VibrationRecord;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "envguard-simulate")]
#[command(about = "Synthetic vibration corpus generator")]
#[command(version)]
struct CliArgs {
    /// Output directory for training (healthy) records
    #[arg(long, default_value = "data/train")]
    train_dir: PathBuf,

    /// Output directory for test records
    #[arg(long, default_value = "data/test")]
    test_dir: PathBuf,

    /// Number of healthy training records
    #[arg(long, default_value_t = 400)]
    train_records: usize,

    /// Number of healthy test records
    #[arg(long, default_value_t = 10)]
    test_normal: usize,

    /// Number of degraded (amplified) test records appended after the healthy ones
    #[arg(long, default_value_t = 2)]
    test_degraded: usize,

    /// Samples per record
    #[arg(long, default_value_t = 2048)]
    samples: usize,

    /// Sampling rate (Hz)
    #[arg(long, default_value_t = 25_600.0)]
    sample_rate_hz: f64,

    /// Tone frequency of the simulated machine signature (Hz)
    #[arg(long, default_value_t = 5_000.0)]
    tone_hz: f64,

    /// Amplitude multiplier applied to degraded records
    #[arg(long, default_value_t = 5.0)]
    degraded_gain: f64,

    /// Noise standard deviation
    #[arg(long, default_value_t = 0.02)]
    noise_std: f64,

    /// RNG seed for reproducible corpora
    #[arg(long)]
    seed: Option<u64>,
}

// ============================================================================
// Signal Synthesis
// ============================================================================

/// Generate one two-channel record: a tone at the machine signature frequency
/// with random phase, plus independent Gaussian sensor noise per channel.
fn synth_record(
    rng: &mut StdRng,
    noise: &Normal<f64>,
    samples: usize,
    sample_rate_hz: f64,
    tone_hz: f64,
    amplitude: f64,
) -> VibrationRecord {
    let phase: f64 = rng.gen_range(0.0..2.0 * PI);
    let omega = 2.0 * PI * tone_hz / sample_rate_hz;

    let mut horizontal = Vec::with_capacity(samples);
    let mut vertical = Vec::with_capacity(samples);
    for i in 0..samples {
        let arg = omega * i as f64 + phase;
        horizontal.push(amplitude * arg.sin() + noise.sample(rng));
        // Orthogonal mount sees the same tone a quarter cycle later
        vertical.push(amplitude * arg.cos() + noise.sample(rng));
    }

    VibrationRecord {
        horizontal,
        vertical,
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = CliArgs::parse();

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let noise = Normal::new(0.0, args.noise_std).context("Invalid noise std")?;

    // Training corpus: healthy records only
    for i in 0..args.train_records {
        let record = synth_record(
            &mut rng,
            &noise,
            args.samples,
            args.sample_rate_hz,
            args.tone_hz,
            1.0,
        );
        let path = args.train_dir.join(format!("rec_{i:04}.csv"));
        ingest::write_record(&path, &record)?;
    }
    info!(
        count = args.train_records,
        dir = %args.train_dir.display(),
        "Training corpus written"
    );

    // Test corpus: healthy records, then degraded records
    for i in 0..args.test_normal + args.test_degraded {
        let amplitude = if i < args.test_normal {
            1.0
        } else {
            args.degraded_gain
        };
        let record = synth_record(
            &mut rng,
            &noise,
            args.samples,
            args.sample_rate_hz,
            args.tone_hz,
            amplitude,
        );
        let path = args.test_dir.join(format!("rec_{i:04}.csv"));
        ingest::write_record(&path, &record)?;
    }
    info!(
        normal = args.test_normal,
        degraded = args.test_degraded,
        dir = %args.test_dir.display(),
        "Test corpus written"
    );

    println!(
        "Wrote {} training and {} test records ({} degraded at {}x amplitude)",
        args.train_records,
        args.test_normal + args.test_degraded,
        args.test_degraded,
        args.degraded_gain
    );

    Ok(())
}
