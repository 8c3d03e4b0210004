//! Track types for the timeline.

use std::fmt;

use serde::{Deserialize, Serialize};
use studio_core::{RationalTime, TimeRange};
use uuid::Uuid;

use crate::clip::Clip;

/// Kind of track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Video,
    Audio,
    Subtitle,
    Overlay,
}

impl TrackKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Video => "Video",
            Self::Audio => "Audio",
            Self::Subtitle => "Subtitle",
            Self::Overlay => "Overlay",
        }
    }

    /// Row height in pixels for a new track.
    pub fn default_height(self) -> u32 {
        match self {
            Self::Video => 80,
            _ => 60,
        }
    }

    /// Display color for the `nth` track of this kind.
    pub fn color(self, nth: usize) -> &'static str {
        const VIDEO: &[&str] = &["#4a90e2", "#5cb85c", "#f0ad4e", "#d9534f"];
        const AUDIO: &[&str] = &["#5bc0de", "#5cb85c", "#f0ad4e", "#d9534f"];
        const SUBTITLE: &[&str] = &["#6f42c1", "#e83e8c"];
        const OVERLAY: &[&str] = &["#fd7e14", "#20c997"];
        let palette = match self {
            Self::Video => VIDEO,
            Self::Audio => AUDIO,
            Self::Subtitle => SUBTITLE,
            Self::Overlay => OVERLAY,
        };
        palette[nth % palette.len()]
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Partial update of a track's flags and mix settings.
///
/// `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackUpdate {
    pub name: Option<String>,
    pub locked: Option<bool>,
    pub muted: Option<bool>,
    pub hidden: Option<bool>,
    pub solo: Option<bool>,
    pub volume: Option<f32>,
    pub pan: Option<f32>,
}

impl TrackUpdate {
    pub fn locked(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Self::default()
        }
    }

    pub fn muted(muted: bool) -> Self {
        Self {
            muted: Some(muted),
            ..Self::default()
        }
    }
}

/// A track: clips of one kind, sorted by start, never overlapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Uuid,
    pub name: String,
    pub kind: TrackKind,
    /// Position in the timeline's track list.
    pub index: usize,
    pub height: u32,
    pub color: String,
    pub locked: bool,
    pub muted: bool,
    pub hidden: bool,
    pub solo: bool,
    /// Gain, 0.0..=2.0.
    pub volume: f32,
    /// Stereo pan, -1.0..=1.0.
    pub pan: f32,
    clips: Vec<Clip>,
}

impl Track {
    pub fn new(kind: TrackKind, name: impl Into<String>, index: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            index,
            height: kind.default_height(),
            color: kind.color(0).to_string(),
            locked: false,
            muted: false,
            hidden: false,
            solo: false,
            volume: 1.0,
            pan: 0.0,
            clips: Vec::new(),
        }
    }

    /// Clips in ascending start order.
    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn clip(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub(crate) fn clip_mut(&mut self, id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    pub(crate) fn clips_mut(&mut self) -> impl Iterator<Item = &mut Clip> {
        self.clips.iter_mut()
    }

    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// End of the last clip, or zero for an empty track.
    pub fn end(&self) -> RationalTime {
        self.clips
            .iter()
            .map(Clip::end)
            .max()
            .unwrap_or(RationalTime::ZERO)
    }

    /// Clip covering `time`, if any.
    pub fn clip_at_time(&self, time: RationalTime) -> Option<&Clip> {
        self.clips.iter().find(|c| c.range().contains(time))
    }

    /// First clip other than `ignore` whose range intersects `range`.
    pub fn first_overlap(&self, range: TimeRange, ignore: Option<Uuid>) -> Option<&Clip> {
        self.clips
            .iter()
            .filter(|c| Some(c.id) != ignore)
            .find(|c| c.range().overlaps(range))
    }

    /// Push-right placement: starting from `start`, jump past every clip the
    /// candidate collides with until it fits. Clips are visited in start
    /// order, so one pass suffices and no existing clip moves.
    pub fn resolve_push_right(&self, start: RationalTime, duration: RationalTime) -> RationalTime {
        let mut candidate = TimeRange::new(start, duration);
        for clip in &self.clips {
            if clip.range().overlaps(candidate) {
                candidate.start = clip.end();
            }
        }
        candidate.start
    }

    /// Insert keeping start order; returns the index used.
    pub(crate) fn insert_sorted(&mut self, mut clip: Clip) -> usize {
        clip.set_track_id(self.id);
        let index = self.clips.partition_point(|c| c.start() <= clip.start());
        self.clips.insert(index, clip);
        index
    }

    pub(crate) fn insert_at(&mut self, index: usize, mut clip: Clip) {
        clip.set_track_id(self.id);
        let index = index.min(self.clips.len());
        self.clips.insert(index, clip);
    }

    pub(crate) fn remove_clip(&mut self, id: Uuid) -> Option<(usize, Clip)> {
        let index = self.position(id)?;
        Some((index, self.clips.remove(index)))
    }

    /// Sorted by start and pairwise non-overlapping.
    pub fn is_consistent(&self) -> bool {
        self.clips.windows(2).all(|w| w[0].end() <= w[1].start())
            && self.clips.iter().all(|c| c.track_id() == self.id)
    }

    /// Apply a flag/mix update, clamping volume and pan into range.
    pub(crate) fn apply_update(&mut self, update: &TrackUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(locked) = update.locked {
            self.locked = locked;
        }
        if let Some(muted) = update.muted {
            self.muted = muted;
        }
        if let Some(hidden) = update.hidden {
            self.hidden = hidden;
        }
        if let Some(solo) = update.solo {
            self.solo = solo;
        }
        if let Some(volume) = update.volume {
            self.volume = volume.clamp(0.0, 2.0);
        }
        if let Some(pan) = update.pan {
            self.pan = pan.clamp(-1.0, 1.0);
        }
    }
}
