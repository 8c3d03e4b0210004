//! Descriptors of imported media, as supplied by the import subsystem.
//!
//! The engine never reads media bytes; it only needs to know how long a
//! resource is and what kind of clip it produces.

use serde::{Deserialize, Serialize};
use studio_core::RationalTime;
use uuid::Uuid;

/// Kind of imported media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
}

/// A probed media resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub kind: MediaKind,
    /// Full source length.
    pub duration: RationalTime,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Resource {
    /// Create a resource from a probed duration in seconds.
    pub fn new(name: impl Into<String>, kind: MediaKind, duration_seconds: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            duration: RationalTime::from_seconds_f64(duration_seconds),
            width: None,
            height: None,
        }
    }

    /// A still image with the default still duration.
    pub fn still_image(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: MediaKind::Image,
            duration: image_duration(),
            width: Some(width),
            height: Some(height),
        }
    }
}

/// Source length given to stills, which have no intrinsic duration.
pub fn image_duration() -> RationalTime {
    RationalTime::from_secs(5)
}
