//! The timeline: tracks, markers and derived duration.
//!
//! Tracks are held behind `Arc` and mutated through `Arc::make_mut`, so a
//! cloned timeline (a history snapshot) shares every track that has not been
//! touched since and only pays for copying the tracks an edit actually changes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use studio_core::{FrameRate, RationalTime};
use uuid::Uuid;

use crate::clip::Clip;
use crate::config::TimelineDefaults;
use crate::error::{EditError, EditResult, EntityKind};
use crate::track::{Track, TrackKind};

/// Kind of timeline marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerKind {
    Chapter,
    Cue,
    Comment,
}

/// A named point on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: Uuid,
    pub time: RationalTime,
    pub name: String,
    pub color: String,
    pub kind: MarkerKind,
    pub description: Option<String>,
}

impl Marker {
    pub fn new(time: RationalTime, name: impl Into<String>, kind: MarkerKind) -> Self {
        let color = match kind {
            MarkerKind::Chapter => "#f0ad4e",
            MarkerKind::Cue => "#5bc0de",
            MarkerKind::Comment => "#5cb85c",
        };
        Self {
            id: Uuid::new_v4(),
            time,
            name: name.into(),
            color: color.to_string(),
            kind,
            description: None,
        }
    }
}

/// The edited timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    pub id: Uuid,
    pub name: String,
    pub frame_rate: FrameRate,
    pub sample_rate: u32,
    pub channels: u16,
    pub width: u32,
    pub height: u32,
    /// Derived from clip extents; see [`crate::duration`].
    duration: RationalTime,
    tracks: Vec<Arc<Track>>,
    markers: Vec<Marker>,
}

impl Timeline {
    /// An empty timeline with no tracks.
    pub fn new(name: impl Into<String>, frame_rate: FrameRate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            frame_rate,
            sample_rate: 48_000,
            channels: 2,
            width: 1920,
            height: 1080,
            duration: RationalTime::ZERO,
            tracks: Vec::new(),
            markers: Vec::new(),
        }
    }

    /// A timeline laid out from configured defaults, including its
    /// initial video and audio tracks.
    pub fn from_defaults(defaults: &TimelineDefaults) -> Self {
        let mut timeline = Self::new(defaults.name.clone(), defaults.frame_rate);
        timeline.sample_rate = defaults.sample_rate;
        timeline.channels = defaults.channels;
        timeline.width = defaults.width;
        timeline.height = defaults.height;
        for _ in 0..defaults.video_tracks {
            timeline.push_track(TrackKind::Video, None);
        }
        for _ in 0..defaults.audio_tracks {
            timeline.push_track(TrackKind::Audio, None);
        }
        timeline
    }

    pub fn duration(&self) -> RationalTime {
        self.duration
    }

    pub(crate) fn set_duration(&mut self, duration: RationalTime) {
        self.duration = duration;
    }

    pub fn tracks(&self) -> impl Iterator<Item = &Track> + '_ {
        self.tracks.iter().map(|t| t.as_ref())
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn track(&self, id: Uuid) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id).map(|t| t.as_ref())
    }

    pub fn track_at(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index).map(|t| t.as_ref())
    }

    /// Mutable access; copies the track first if a snapshot still shares it.
    pub(crate) fn track_mut(&mut self, id: Uuid) -> Option<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.id == id)
            .map(Arc::make_mut)
    }

    pub(crate) fn tracks_mut(&mut self) -> impl Iterator<Item = &mut Arc<Track>> {
        self.tracks.iter_mut()
    }

    /// Whether `other` shares storage for the track at `index`.
    pub fn shares_track_with(&self, other: &Timeline, index: usize) -> bool {
        match (self.tracks.get(index), other.tracks.get(index)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Append a track of `kind`. Unnamed tracks are called "<Kind> <n>".
    pub(crate) fn push_track(&mut self, kind: TrackKind, name: Option<String>) -> Uuid {
        let same_kind = self.tracks.iter().filter(|t| t.kind == kind).count();
        let name = name.unwrap_or_else(|| format!("{} {}", kind.label(), same_kind + 1));
        let mut track = Track::new(kind, name, self.tracks.len());
        track.color = kind.color(same_kind).to_string();
        let id = track.id;
        self.tracks.push(Arc::new(track));
        id
    }

    /// Remove a track and renumber the ones after it.
    pub(crate) fn remove_track(&mut self, id: Uuid) -> Option<Track> {
        let index = self.tracks.iter().position(|t| t.id == id)?;
        let removed = self.tracks.remove(index);
        for track in self.tracks.iter_mut().skip(index) {
            Arc::make_mut(track).index -= 1;
        }
        Some(Arc::try_unwrap(removed).unwrap_or_else(|shared| (*shared).clone()))
    }

    pub fn clips(&self) -> impl Iterator<Item = &Clip> + '_ {
        self.tracks.iter().flat_map(|t| t.clips().iter())
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clip_count()).sum()
    }

    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.tracks.iter().find_map(|t| t.clip(id))
    }

    pub fn contains_clip(&self, id: Uuid) -> bool {
        self.clip(id).is_some()
    }

    /// Track owning clip `id`.
    pub fn track_of(&self, clip_id: Uuid) -> Option<&Track> {
        self.tracks
            .iter()
            .find(|t| t.clip(clip_id).is_some())
            .map(|t| t.as_ref())
    }

    /// Track lookup that reports a typed error.
    pub(crate) fn require_track(&self, id: Uuid) -> EditResult<&Track> {
        self.track(id)
            .ok_or_else(|| EditError::not_found(EntityKind::Track, id))
    }

    /// Owning track of a clip, rejected if unknown or locked.
    pub(crate) fn require_unlocked_track_of(&self, clip_id: Uuid) -> EditResult<&Track> {
        let track = self
            .track_of(clip_id)
            .ok_or_else(|| EditError::not_found(EntityKind::Clip, clip_id))?;
        if track.locked {
            return Err(EditError::Locked { track_id: track.id });
        }
        Ok(track)
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub(crate) fn insert_marker(&mut self, marker: Marker) {
        let index = self.markers.partition_point(|m| m.time <= marker.time);
        self.markers.insert(index, marker);
    }

    pub(crate) fn remove_marker(&mut self, id: Uuid) -> Option<Marker> {
        let index = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(index))
    }

    /// Verify every structural invariant. Used on timelines that did not
    /// come out of the edit engine, such as loaded files.
    pub fn check_invariants(&self) -> EditResult<()> {
        if !self.frame_rate.is_valid() {
            return Err(EditError::validation(format!(
                "invalid frame rate {}/{}",
                self.frame_rate.numerator, self.frame_rate.denominator
            )));
        }
        for (index, track) in self.tracks().enumerate() {
            if track.index != index {
                return Err(EditError::validation(format!(
                    "track '{}' has index {} at position {}",
                    track.name, track.index, index
                )));
            }
            if !track.is_consistent() {
                return Err(EditError::validation(format!(
                    "track '{}' has overlapping, unsorted or foreign clips",
                    track.name
                )));
            }
            for clip in track.clips() {
                clip.validate()?;
            }
        }
        let mut ids: Vec<Uuid> = self.clips().map(|c| c.id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(EditError::validation("duplicate clip ids"));
        }
        Ok(())
    }
}
