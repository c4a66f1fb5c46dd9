//! Reference Envelope Training & Threshold Classification
//!
//! Learns a healthy-machine reference envelope from a training corpus and
//! classifies test signals against a one-sided statistical threshold derived
//! from it.
//!
//! ## Architecture
//!
//! - [`train_reference_envelope`]: preprocess + envelope each training signal,
//!   average elementwise into a [`ReferenceEnvelope`]
//! - [`classify_corpus`]: score each preprocessed test signal by its mean
//!   amplitude and flag scores strictly above `mean + z·std`
//!
//! ## Usage
//!
//! ```ignore
//! let config = MonitorConfig::load()?;
//! let reference = train_reference_envelope(&training_corpus, config.train_count, &config)?;
//!
//! let preprocessed: Vec<Vec<f64>> = test_corpus
//!     .iter()
//!     .map(|s| preprocess(s, &config))
//!     .collect::<Result<_, _>>()?;
//! let result = classify_corpus(&reference, &preprocessed, config.confidence)?;
//! println!("{} anomalous signals", result.flagged_count());
//! ```

use chrono::Utc;
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::processing::{amplitude_envelope, preprocess, PipelineError};
use crate::types::{two_sided_z, ClassificationResult, FlaggedSignal, ReferenceEnvelope};

/// Default confidence level for the anomaly threshold
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

// ============================================================================
// Envelope Trainer
// ============================================================================

/// Train a reference envelope from the first `requested` training signals.
///
/// Each contributing signal is bandpass filtered, rectified, and envelope
/// extracted; the per-signal envelopes are averaged elementwise. Signals are
/// taken in stored corpus order, and the per-signal work runs as a parallel
/// map reassembled in that order. Deterministic for a given corpus and count;
/// never inspects test data.
///
/// Requesting more signals than the corpus holds clamps to the corpus size
/// with a logged notice (non-fatal).
///
/// # Errors
/// [`PipelineError::EmptyCorpus`] for an empty corpus (or `requested == 0`);
/// [`PipelineError::LengthMismatch`] when contributing envelopes differ in
/// length; filter errors propagate per signal.
pub fn train_reference_envelope(
    corpus: &[Vec<f64>],
    requested: usize,
    config: &MonitorConfig,
) -> Result<ReferenceEnvelope, PipelineError> {
    if corpus.is_empty() || requested == 0 {
        return Err(PipelineError::EmptyCorpus);
    }

    let count = if requested > corpus.len() {
        warn!(
            requested,
            available = corpus.len(),
            "Training corpus smaller than requested; clamping"
        );
        corpus.len()
    } else {
        requested
    };

    let envelopes: Vec<Vec<f64>> = corpus[..count]
        .par_iter()
        .map(|signal| {
            let rectified = preprocess(signal, config)?;
            amplitude_envelope(&rectified)
        })
        .collect::<Result<_, _>>()?;

    // All contributors must align for an elementwise mean; fail fast otherwise
    let expected = envelopes[0].len();
    for (index, envelope) in envelopes.iter().enumerate() {
        if envelope.len() != expected {
            return Err(PipelineError::LengthMismatch {
                expected,
                actual: envelope.len(),
                index,
            });
        }
    }

    let mut accumulator = Array1::<f64>::zeros(expected);
    for envelope in &envelopes {
        accumulator += &ArrayView1::from(envelope.as_slice());
    }
    accumulator /= count as f64;

    info!(
        signals = count,
        samples = expected,
        "Reference envelope trained"
    );

    Ok(ReferenceEnvelope {
        values: accumulator.to_vec(),
        signals_used: count,
        sample_rate_hz: config.sample_rate_hz,
        trained_at: Utc::now(),
    })
}

// ============================================================================
// Threshold Classifier
// ============================================================================

/// Summary statistic for one preprocessed test signal: its mean value.
///
/// Degraded bearings raise broadband vibration energy, which raises the mean
/// of the rectified signal. Empty signals score 0.0.
pub fn score_signal(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().sum::<f64>() / signal.len() as f64
}

/// Classify a test corpus of preprocessed signals against the reference.
///
/// Each entry's score is compared against `mean + z·std` of the reference
/// envelope; strictly greater scores are flagged. Scoring runs as a parallel
/// map reassembled in corpus order, so flagged indices are strictly
/// increasing and each signal is scored independently of the others. The
/// reference envelope is only read.
///
/// # Errors
/// [`PipelineError::EmptyReference`] for an empty reference envelope;
/// [`PipelineError::InvalidConfidence`] unless `0 < confidence < 1`.
pub fn classify_corpus(
    reference: &ReferenceEnvelope,
    test_corpus: &[Vec<f64>],
    confidence: f64,
) -> Result<ClassificationResult, PipelineError> {
    let z = two_sided_z(confidence)?;
    let threshold = reference.threshold(confidence)?;

    debug!(
        threshold,
        z,
        confidence,
        reference_mean = reference.mean()?,
        reference_std = reference.std()?,
        "Classifying test corpus"
    );

    let scores: Vec<f64> = test_corpus.par_iter().map(|s| score_signal(s)).collect();

    let flagged: Vec<FlaggedSignal> = scores
        .iter()
        .enumerate()
        .filter(|(_, &score)| score > threshold)
        .map(|(index, &score)| FlaggedSignal {
            index,
            mean_amplitude: score,
            signal: test_corpus[index].clone(),
        })
        .collect();

    info!(
        tested = test_corpus.len(),
        flagged = flagged.len(),
        threshold,
        "Classification complete"
    );

    Ok(ClassificationResult {
        flagged,
        threshold,
        z_score: z,
        confidence,
        signals_tested: test_corpus.len(),
    })
}

// ============================================================================
// Tests
// ============================================================================
