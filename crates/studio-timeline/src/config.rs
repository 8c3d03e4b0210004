//! Engine configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use studio_core::{FrameRate, RationalTime, Result, StudioError};

/// Settings for a new timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineDefaults {
    pub name: String,
    pub frame_rate: FrameRate,
    pub sample_rate: u32,
    pub channels: u16,
    pub width: u32,
    pub height: u32,
    /// Video tracks created up front.
    pub video_tracks: usize,
    /// Audio tracks created up front.
    pub audio_tracks: usize,
}

impl Default for TimelineDefaults {
    fn default() -> Self {
        Self {
            name: "Untitled Project".to_string(),
            frame_rate: FrameRate::FPS_30,
            sample_rate: 48_000,
            channels: 2,
            width: 1920,
            height: 1080,
            video_tracks: 3,
            audio_tracks: 4,
        }
    }
}

/// Configuration for an [`crate::Engine`] instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Floor for the derived timeline duration.
    pub min_duration: RationalTime,
    /// Maximum number of undo steps kept.
    pub history_limit: usize,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Record selection changes as undoable history entries.
    pub record_selection: bool,
    pub timeline: TimelineDefaults,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_duration: RationalTime::from_secs(60),
            history_limit: 100,
            min_speed: 0.1,
            max_speed: 4.0,
            record_selection: true,
            timeline: TimelineDefaults::default(),
        }
    }
}

impl EngineConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_duration.is_negative() {
            return Err(StudioError::InvalidParameter(format!(
                "min_duration must not be negative, got {}",
                self.min_duration
            )));
        }
        if self.history_limit == 0 {
            return Err(StudioError::InvalidParameter(
                "history_limit must be at least 1".into(),
            ));
        }
        if !(self.min_speed > 0.0 && self.min_speed <= self.max_speed && self.max_speed.is_finite())
        {
            return Err(StudioError::InvalidParameter(format!(
                "invalid speed range [{}, {}]",
                self.min_speed, self.max_speed
            )));
        }
        if !self.timeline.frame_rate.is_valid() {
            return Err(StudioError::InvalidParameter(format!(
                "invalid frame rate {}/{}",
                self.timeline.frame_rate.numerator, self.timeline.frame_rate.denominator
            )));
        }
        Ok(())
    }
}
