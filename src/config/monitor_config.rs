//! Monitor configuration - acquisition and detection parameters as TOML values
//!
//! Every field has a default matching the reference deployment (25.6 kHz
//! accelerometers, 1-10 kHz analysis band), ensuring zero-change behavior when
//! no config file is present.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::processing::PipelineError;
use crate::types::ChannelSelector;

/// Environment variable holding an explicit config file path.
pub const CONFIG_ENV_VAR: &str = "ENVGUARD_CONFIG";

/// Default config file name searched in the working directory.
pub const CONFIG_FILE_NAME: &str = "monitor_config.toml";

// ============================================================================
// Monitor Config
// ============================================================================

/// Pipeline configuration for one monitored machine.
///
/// Load with [`MonitorConfig::load`], which searches:
/// 1. `$ENVGUARD_CONFIG` env var
/// 2. `./monitor_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Accelerometer sampling rate (Hz)
    #[serde(default = "default_sample_rate_hz")]
    pub sample_rate_hz: f64,

    /// Lower passband edge (Hz)
    #[serde(default = "default_band_low_hz")]
    pub band_low_hz: f64,

    /// Upper passband edge (Hz)
    #[serde(default = "default_band_high_hz")]
    pub band_high_hz: f64,

    /// Bandpass filter order (biquad sections)
    #[serde(default = "default_filter_order")]
    pub filter_order: usize,

    /// Sensor channel the pipeline consumes
    #[serde(default)]
    pub channel: ChannelSelector,

    /// Confidence level for the anomaly threshold, in (0, 1)
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Number of training signals averaged into the reference envelope
    #[serde(default = "default_train_count")]
    pub train_count: usize,
}

fn default_sample_rate_hz() -> f64 {
    25_600.0
}

fn default_band_low_hz() -> f64 {
    1_000.0
}

fn default_band_high_hz() -> f64 {
    10_000.0
}

fn default_filter_order() -> usize {
    crate::processing::DEFAULT_FILTER_ORDER
}

fn default_confidence() -> f64 {
    0.95
}

fn default_train_count() -> usize {
    400
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: default_sample_rate_hz(),
            band_low_hz: default_band_low_hz(),
            band_high_hz: default_band_high_hz(),
            filter_order: default_filter_order(),
            channel: ChannelSelector::default(),
            confidence: default_confidence(),
            train_count: default_train_count(),
        }
    }
}

impl MonitorConfig {
    /// Load configuration using the documented search order, falling back to
    /// defaults when no file is found. A file that exists but fails to parse
    /// is a hard error, not a silent fallback.
    pub fn load() -> Result<Self, PipelineError> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            info!(path = %path, "Loading config from {CONFIG_ENV_VAR}");
            return Self::load_from(Path::new(&path));
        }

        let cwd_config = Path::new(CONFIG_FILE_NAME);
        if cwd_config.exists() {
            info!(path = %cwd_config.display(), "Loading config from working directory");
            return Self::load_from(cwd_config);
        }

        info!("No config file found, using built-in defaults");
        Ok(Self::default())
    }

    /// Load configuration from an explicit TOML file.
    pub fn load_from(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate parameter relationships up front so pipeline stages can trust
    /// the band, order, and confidence values they receive.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let nyquist = self.sample_rate_hz / 2.0;
        if !(self.band_low_hz > 0.0
            && self.band_low_hz < self.band_high_hz
            && self.band_high_hz < nyquist)
        {
            return Err(PipelineError::InvalidBand {
                low: self.band_low_hz,
                high: self.band_high_hz,
                nyquist,
            });
        }
        if self.filter_order == 0 {
            return Err(PipelineError::InvalidOrder(self.filter_order));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(PipelineError::InvalidConfidence(self.confidence));
        }
        if self.train_count == 0 {
            warn!("train_count is 0; training will reject the run");
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
