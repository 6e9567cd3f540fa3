use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{LyricMotionError, Result, SpringConfig};

/// Top-level configuration for the animation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Shift applied to the playback clock before classification, in seconds.
    pub timing_offset: f32,
    /// Index distance around the active line that receives spring physics.
    pub animation_range: usize,
    /// Upper bound for a single frame delta, in seconds.
    pub max_frame_delta: f32,
    /// Lines shorter than this, in seconds, use the fast glow preset.
    pub fast_line_threshold: f32,
    pub last_line_min_duration: f32,
    pub default_line_duration: f32,
    pub springs: SpringPresets,
    pub layout: LayoutConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timing_offset: -0.3,
            animation_range: 5,
            max_frame_delta: 0.05,
            fast_line_threshold: 2.0,
            last_line_min_duration: 2.0,
            default_line_duration: 5.0,
            springs: SpringPresets::default(),
            layout: LayoutConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks the values serde cannot rule out on its own. Spring presets are
    /// already validated during deserialization.
    pub fn validate(&self) -> Result<()> {
        if !self.timing_offset.is_finite() {
            return Err(invalid("timing_offset must be finite"));
        }
        if !(self.max_frame_delta.is_finite() && self.max_frame_delta > 0.0) {
            return Err(invalid("max_frame_delta must be positive"));
        }
        if !(self.fast_line_threshold.is_finite() && self.fast_line_threshold >= 0.0) {
            return Err(invalid("fast_line_threshold must not be negative"));
        }
        if !(self.last_line_min_duration.is_finite() && self.last_line_min_duration > 0.0) {
            return Err(invalid("last_line_min_duration must be positive"));
        }
        if !(self.default_line_duration.is_finite() && self.default_line_duration > 0.0) {
            return Err(invalid("default_line_duration must be positive"));
        }
        self.layout.validate()
    }
}

fn invalid(reason: &str) -> LyricMotionError {
    LyricMotionError::InvalidConfig(reason.to_string())
}

/// Named spring presets used by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringPresets {
    pub smooth: SpringConfig,
    pub fast: SpringConfig,
    pub scroll: SpringConfig,
}

impl Default for SpringPresets {
    fn default() -> Self {
        Self {
            smooth: SpringConfig::SMOOTH,
            fast: SpringConfig::FAST,
            scroll: SpringConfig::SCROLL,
        }
    }
}

/// Geometry for the default uniform line layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub line_height: f32,
    pub viewport_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            line_height: 48.0,
            viewport_height: 480.0,
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<()> {
        if !(self.line_height.is_finite() && self.line_height > 0.0) {
            return Err(invalid("layout.line_height must be positive"));
        }
        if !(self.viewport_height.is_finite() && self.viewport_height >= 0.0) {
            return Err(invalid("layout.viewport_height must not be negative"));
        }
        Ok(())
    }
}
