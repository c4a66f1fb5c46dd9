//! envguard: Envelope-Based Vibration Anomaly Detection
//!
//! Detects degradation in rotating machinery from accelerometer time series.
//!
//! ## Architecture
//!
//! - **Processing**: zero-phase Butterworth bandpass + analytic-signal envelope
//! - **Baseline**: reference envelope trained from assumed-healthy signals
//! - **Classifier**: one-sided normal-quantile threshold over test-signal energy

pub mod baseline;
pub mod config;
pub mod ingest;
pub mod processing;
pub mod types;

// Re-export monitor configuration
pub use config::MonitorConfig;

// Re-export commonly used types
pub use types::{
    ChannelSelector, ClassificationResult, FlaggedSignal, ReferenceEnvelope, VibrationRecord,
};

// Re-export the pipeline surface
pub use baseline::{classify_corpus, train_reference_envelope};
pub use processing::{amplitude_envelope, bandpass_filtfilt, preprocess, PipelineError};
