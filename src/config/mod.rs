//! Monitor Configuration Module
//!
//! Per-deployment pipeline configuration loaded from TOML files, replacing
//! hardcoded acquisition and detection constants with operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `ENVGUARD_CONFIG` environment variable (path to TOML file)
//! 2. `monitor_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! The configuration is an explicit value passed into each pipeline stage;
//! there is no process-global config state.

mod monitor_config;

pub use monitor_config::*;
