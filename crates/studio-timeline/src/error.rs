//! Error types for timeline operations.

use std::fmt;

use studio_core::StudioError;
use thiserror::Error;
use uuid::Uuid;

/// What kind of entity a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Track,
    Clip,
    Effect,
    Keyframe,
    Marker,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Track => "track",
            Self::Clip => "clip",
            Self::Effect => "effect",
            Self::Keyframe => "keyframe",
            Self::Marker => "marker",
        };
        f.write_str(name)
    }
}

/// Errors reported by the editing engine.
///
/// None of these are fatal: a failed operation leaves the engine exactly as
/// it was before the call.
#[derive(Debug, Error)]
pub enum EditError {
    /// Invalid trim/split bounds, non-positive durations, bad keyframe times.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Unknown clip, track, effect, keyframe or marker id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    /// The operation targets a locked track.
    #[error("Track {track_id} is locked")]
    Locked { track_id: Uuid },

    /// Undo/redo with nothing to undo/redo.
    #[error("Invalid state: {0}")]
    State(String),

    /// The persistence collaborator failed.
    #[error(transparent)]
    Persistence(#[from] StudioError),
}

impl EditError {
    pub(crate) fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type alias for timeline operations.
pub type EditResult<T> = std::result::Result<T, EditError>;
