// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `stagetrack_configuration.toml`.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub optics: OpticsConfig,
    pub camera: CameraConfig,
    pub vision: VisionConfig,
    pub control: ControlConfig,
}

impl TrackerConfig {
    /// Checks cross-field invariants the type system cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.optics.pixel_to_stage_scale.is_finite())
            || self.optics.pixel_to_stage_scale <= 0.0
        {
            return Err(ConfigError::Validation(format!(
                "optics.pixel_to_stage_scale must be a positive number, got {}",
                self.optics.pixel_to_stage_scale
            )));
        }
        if self.optics.crop_size == 0 {
            return Err(ConfigError::Validation(
                "optics.crop_size must be > 0".to_string(),
            ));
        }
        if self.optics.crop_size > self.camera.roi_height
            || self.optics.crop_size > self.camera.roi_width / 2
        {
            return Err(ConfigError::Validation(format!(
                "optics.crop_size {} does not fit one {}x{} frame panel",
                self.optics.crop_size,
                self.camera.roi_width / 2,
                self.camera.roi_height
            )));
        }
        if self.camera.roi_width == 0 || self.camera.roi_height == 0 {
            return Err(ConfigError::Validation(
                "camera ROI dimensions must be > 0".to_string(),
            ));
        }
        if !(self.control.gain.is_finite()) || self.control.gain <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "control.gain must be a positive number, got {}",
                self.control.gain
            )));
        }
        Ok(())
    }
}

/// Optical calibration for the pixel-to-stage conversion
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OpticsConfig {
    /// Stage units moved per canonical-region pixel of offset. Derived from
    /// the objective magnification during calibration, never at runtime.
    pub pixel_to_stage_scale: f64,
    /// Side length of the square tracking window cut from the active panel,
    /// in raw frame pixels.
    pub crop_size: u32,
}

impl Default for OpticsConfig {
    fn default() -> Self {
        Self {
            // 0.1 stage units per raw pixel at the calibrated magnification,
            // rescaled by the 770 -> 512 canonical resampling.
            pixel_to_stage_scale: 0.1 * (770.0 / 512.0),
            crop_size: 770,
        }
    }
}

/// Camera readout region applied at startup
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CameraConfig {
    pub roi_x: u32,
    pub roi_y: u32,
    pub roi_width: u32,
    pub roi_height: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        // Center band of the 2048x2048 sensor: both panels side by side.
        Self {
            roi_x: 0,
            roi_y: 512,
            roi_width: 2048,
            roi_height: 1024,
        }
    }
}

/// Vision-stage pacing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VisionConfig {
    /// Delay after each segmentation attempt, capping the vision rate
    /// independently of frame arrival.
    pub segmentation_interval_ms: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            segmentation_interval_ms: 90,
        }
    }
}

/// Proportional controller settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Velocity per unit of position error.
    pub gain: f64,
    /// Delay between stage position polls / drive commands.
    pub poll_interval_ms: u64,
    /// Wait applied when tracking is toggled off, letting an in-flight drive
    /// command finish its direction bookkeeping before the stop is issued.
    pub settle_delay_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            gain: 6.0,
            poll_interval_ms: 50,
            settle_delay_ms: 100,
        }
    }
}
