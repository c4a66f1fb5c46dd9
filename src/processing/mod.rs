//! Signal processing module - bandpass conditioning and envelope extraction

mod bandpass;
mod envelope;

pub use bandpass::{bandpass_filtfilt, min_signal_len, preprocess, DEFAULT_FILTER_ORDER};
pub use envelope::{amplitude_envelope, analytic_signal};

use thiserror::Error;

/// Errors in the envelope detection pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid passband: {low} Hz – {high} Hz (Nyquist is {nyquist} Hz)")]
    InvalidBand { low: f64, high: f64, nyquist: f64 },

    #[error("Invalid filter order: {0} (must be >= 1)")]
    InvalidOrder(usize),

    #[error("Signal too short for filter: need more than {needed} samples, have {available}")]
    SignalTooShort { needed: usize, available: usize },

    #[error("Empty signal")]
    EmptySignal,

    #[error("Training corpus is empty")]
    EmptyCorpus,

    #[error("Reference envelope is empty")]
    EmptyReference,

    #[error("Envelope length mismatch at corpus index {index}: expected {expected}, got {actual}")]
    LengthMismatch {
        expected: usize,
        actual: usize,
        index: usize,
    },

    #[error("Confidence level must be in (0, 1), got {0}")]
    InvalidConfidence(f64),

    #[error("Statistics error: {0}")]
    Statistics(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Schema version mismatch: file has v{found}, expected v{expected}")]
    SchemaMismatch { found: u32, expected: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
