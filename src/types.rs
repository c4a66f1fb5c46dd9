//! Core domain types for envelope-based anomaly detection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::path::Path;
use tracing::{info, warn};

use crate::processing::PipelineError;

/// Schema version for reference-envelope persistence compatibility
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Channel Selection
// ============================================================================

/// Accelerometer channel consumed by the pipeline.
///
/// Each vibration record carries two orthogonal sensor channels; the core
/// operates on exactly one of them per run.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSelector {
    /// Radial / horizontal accelerometer channel
    #[default]
    Horizontal,
    /// Axial / vertical accelerometer channel
    Vertical,
}

impl std::fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelSelector::Horizontal => write!(f, "horizontal"),
            ChannelSelector::Vertical => write!(f, "vertical"),
        }
    }
}

/// One multi-channel vibration capture (a single machine run or window).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VibrationRecord {
    /// Horizontal channel samples
    pub horizontal: Vec<f64>,
    /// Vertical channel samples
    pub vertical: Vec<f64>,
}

impl VibrationRecord {
    /// Borrow the selected channel as a flat sample sequence.
    pub fn channel(&self, selector: ChannelSelector) -> &[f64] {
        match selector {
            ChannelSelector::Horizontal => &self.horizontal,
            ChannelSelector::Vertical => &self.vertical,
        }
    }
}

// ============================================================================
// Reference Envelope
// ============================================================================

/// Healthy-machine reference envelope.
///
/// Elementwise mean of per-signal amplitude envelopes computed from an
/// assumed-healthy training corpus. Built once per run; classification only
/// ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceEnvelope {
    /// Envelope values (non-negative, one per sample)
    pub values: Vec<f64>,

    /// Number of training signals averaged into this envelope
    pub signals_used: usize,

    /// Sampling rate of the contributing signals (Hz)
    pub sample_rate_hz: f64,

    /// When the envelope was trained
    pub trained_at: DateTime<Utc>,
}

impl ReferenceEnvelope {
    /// Number of samples in the envelope.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the envelope holds no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mean of the envelope values.
    ///
    /// # Errors
    /// [`PipelineError::EmptyReference`] when the envelope has no samples.
    pub fn mean(&self) -> Result<f64, PipelineError> {
        if self.values.is_empty() {
            return Err(PipelineError::EmptyReference);
        }
        Ok(self.values.iter().sum::<f64>() / self.values.len() as f64)
    }

    /// Population standard deviation (divide by N) of the envelope values.
    ///
    /// The envelope is the entire reference curve rather than a sample drawn
    /// from a larger population, so N is the divisor.
    ///
    /// # Errors
    /// [`PipelineError::EmptyReference`] when the envelope has no samples.
    pub fn std(&self) -> Result<f64, PipelineError> {
        let mean = self.mean()?;
        let variance = self
            .values
            .iter()
            .map(|&v| (v - mean) * (v - mean))
            .sum::<f64>()
            / self.values.len() as f64;
        Ok(variance.sqrt())
    }

    /// One-sided anomaly threshold: `mean + z·std` where
    /// `z = Φ⁻¹((1 + confidence) / 2)`.
    ///
    /// # Errors
    /// [`PipelineError::InvalidConfidence`] unless `0 < confidence < 1`;
    /// [`PipelineError::EmptyReference`] when the envelope has no samples.
    pub fn threshold(&self, confidence: f64) -> Result<f64, PipelineError> {
        let z = two_sided_z(confidence)?;
        Ok(self.mean()? + z * self.std()?)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Save the envelope as JSON. Parent directories are created if missing.
    pub fn save_to_file(&self, path: &Path) -> Result<(), PipelineError> {
        let state = ReferenceState {
            schema_version: SCHEMA_VERSION,
            envelope: self.clone(),
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&state)?;
        std::fs::write(path, json)?;
        info!(
            path = %path.display(),
            samples = self.values.len(),
            signals = self.signals_used,
            "Reference envelope saved"
        );
        Ok(())
    }

    /// Load a previously saved envelope.
    ///
    /// # Errors
    /// IO/parse failures, and [`PipelineError::SchemaMismatch`] when the file
    /// was written by an incompatible version.
    pub fn load_from_file(path: &Path) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path)?;
        let state: ReferenceState = serde_json::from_str(&json)?;
        if state.schema_version != SCHEMA_VERSION {
            warn!(
                file_version = state.schema_version,
                expected = SCHEMA_VERSION,
                "Rejecting reference envelope with mismatched schema"
            );
            return Err(PipelineError::SchemaMismatch {
                found: state.schema_version,
                expected: SCHEMA_VERSION,
            });
        }
        info!(path = %path.display(), samples = state.envelope.len(), "Reference envelope loaded");
        Ok(state.envelope)
    }
}

/// Serializable wrapper carrying the persistence schema version.
#[derive(Serialize, Deserialize)]
struct ReferenceState {
    schema_version: u32,
    envelope: ReferenceEnvelope,
}

/// Two-sided z-score for a confidence level: `Φ⁻¹((1 + confidence) / 2)`.
///
/// Monotonically increasing in `confidence` over (0, 1).
pub(crate) fn two_sided_z(confidence: f64) -> Result<f64, PipelineError> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(PipelineError::InvalidConfidence(confidence));
    }
    let normal =
        Normal::new(0.0, 1.0).map_err(|e| PipelineError::Statistics(e.to_string()))?;
    Ok(normal.inverse_cdf((1.0 + confidence) / 2.0))
}

// ============================================================================
// Classification Result
// ============================================================================

/// A test signal whose mean preprocessed amplitude exceeded the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedSignal {
    /// Position of the signal in the original test corpus
    pub index: usize,
    /// Mean preprocessed amplitude that triggered the flag
    pub mean_amplitude: f64,
    /// The preprocessed signal itself (for downstream reporting)
    pub signal: Vec<f64>,
}

/// Outcome of classifying a test corpus against a reference envelope.
///
/// Flagged entries preserve test-corpus order, so their indices are strictly
/// increasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Signals classified as anomalous, in original corpus order
    pub flagged: Vec<FlaggedSignal>,
    /// Threshold the scores were compared against
    pub threshold: f64,
    /// z multiplier derived from the confidence level
    pub z_score: f64,
    /// Confidence level used
    pub confidence: f64,
    /// Total number of test signals scored
    pub signals_tested: usize,
}

impl ClassificationResult {
    /// Indices of flagged signals in original corpus order.
    pub fn flagged_indices(&self) -> Vec<usize> {
        self.flagged.iter().map(|f| f.index).collect()
    }

    /// Number of flagged signals.
    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
