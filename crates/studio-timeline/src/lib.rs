//! Studio Timeline - Non-linear editing engine
//!
//! Implements the timeline model and everything that edits it:
//! - Timelines containing tracks, tracks containing clips
//! - Edit operations with push-right overlap resolution
//! - Clip selection
//! - Snapshot-based undo/redo
//! - Playhead and transport bookkeeping
//! - Versioned JSON persistence

pub mod clip;
pub mod config;
pub mod duration;
pub mod edit;
pub mod effect;
pub mod engine;
pub mod error;
pub mod history;
pub mod playback;
pub mod resource;
pub mod selection;
pub mod serialization;
pub mod timeline;
pub mod track;

pub use clip::{BlendMode, Clip, ClipContent, ClipKind};
pub use config::{EngineConfig, TimelineDefaults};
pub use edit::{EditCommand, EditOutcome, OperationKind, Placement};
pub use effect::{Effect, EffectParameter, EffectType, ParamKind, ParamValue};
pub use engine::{Engine, EngineEvent};
pub use error::{EditError, EditResult, EntityKind};
pub use history::{History, HistoryEntry, HistoryState, Snapshot};
pub use playback::{PlaybackClock, PlaybackState};
pub use resource::{MediaKind, Resource};
pub use selection::Selection;
pub use serialization::{JsonFileStore, MemoryStore, TimelineFile, TimelineStore};
pub use timeline::{Marker, MarkerKind, Timeline};
pub use track::{Track, TrackKind, TrackUpdate};
