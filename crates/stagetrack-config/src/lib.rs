// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Stagetrack Configuration System
//!
//! Type-safe TOML configuration for the tracking pipeline: optical
//! calibration (pixel-to-stage scale, crop geometry), camera ROI, controller
//! gain, and loop cadences. Every tunable the pipeline reads comes from
//! here — nothing is hardcoded at call sites.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stagetrack_config::load_config;
//!
//! let config = load_config(None).expect("Failed to load config");
//! println!("Controller gain: {}", config.control.gain);
//! println!("Pixel scale: {}", config.optics.pixel_to_stage_scale);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;

pub use loader::{find_config_file, load_config, load_config_or_default};
pub use types::{CameraConfig, ControlConfig, OpticsConfig, TrackerConfig, VisionConfig};

/// Errors raised while locating, parsing, or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
