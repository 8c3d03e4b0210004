//! Timeline persistence with versioning and migration.
//!
//! Uses JSON with a schema version field for forward-compatible persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use studio_core::{RationalTime, Result, StudioError};

use crate::duration;
use crate::error::EditResult;
use crate::timeline::Timeline;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Versioned timeline file wrapper.
#[derive(Debug, Serialize, Deserialize)]
pub struct TimelineFile {
    /// Schema version for migration.
    pub version: u32,
    pub timeline: Timeline,
    /// Application version that wrote this file.
    pub app_version: String,
}

impl TimelineFile {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            version: CURRENT_VERSION,
            timeline,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            StudioError::Serialization(format!("Failed to serialize timeline: {}", e))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| StudioError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CURRENT_VERSION {
            return Err(StudioError::Serialization(format!(
                "Timeline file version {} is newer than supported version {}",
                version, CURRENT_VERSION
            )));
        }

        let migrated = migrate(raw, version)?;
        serde_json::from_value(migrated)
            .map_err(|e| StudioError::Serialization(format!("Failed to parse timeline: {}", e)))
    }

    /// Unwrap the timeline after checking its structure and recomputing the
    /// derived duration, since the file may not have come from this engine.
    pub fn into_timeline(self, min_duration: RationalTime) -> EditResult<Timeline> {
        let mut timeline = self.timeline;
        timeline.check_invariants()?;
        duration::republish(&mut timeline, min_duration);
        Ok(timeline)
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 files are a bare timeline object.
                if data.get("version").is_none() {
                    data = serde_json::json!({
                        "version": 1,
                        "timeline": data,
                        "app_version": "0.0.0",
                    });
                }
                version = 1;
            }
            _ => {
                return Err(StudioError::Serialization(format!(
                    "No migration path from version {}",
                    version
                )));
            }
        }
    }

    Ok(data)
}

/// Where the engine saves and loads its timeline.
pub trait TimelineStore {
    fn save(&mut self, timeline: &Timeline) -> Result<()>;
    fn load(&mut self) -> Result<TimelineFile>;
}

/// JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TimelineStore for JsonFileStore {
    fn save(&mut self, timeline: &Timeline) -> Result<()> {
        let data = TimelineFile::new(timeline.clone()).to_json()?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }

    fn load(&mut self) -> Result<TimelineFile> {
        let data = std::fs::read(&self.path)?;
        TimelineFile::from_json(&data)
    }
}

/// In-memory store holding the serialized bytes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with raw file contents.
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

impl TimelineStore for MemoryStore {
    fn save(&mut self, timeline: &Timeline) -> Result<()> {
        self.data = Some(TimelineFile::new(timeline.clone()).to_json()?);
        Ok(())
    }

    fn load(&mut self) -> Result<TimelineFile> {
        let data = self
            .data
            .as_deref()
            .ok_or_else(|| StudioError::NotFound("no timeline saved".into()))?;
        TimelineFile::from_json(data)
    }
}
