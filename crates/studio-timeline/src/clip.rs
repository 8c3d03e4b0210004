//! Clip types for the timeline.

use serde::{Deserialize, Serialize};
use studio_core::{ClipTransform, EasingCurve, KeyframeTrack, RationalTime, TimeRange};
use uuid::Uuid;

use crate::effect::Effect;
use crate::error::{EditError, EditResult};
use crate::resource::{MediaKind, Resource};

/// Kind of clip, derived from its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipKind {
    Video,
    Audio,
    Image,
    Text,
}

/// Compositing blend mode for visual clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    SoftLight,
    HardLight,
    ColorDodge,
    ColorBurn,
    Darken,
    Lighten,
    Difference,
    Exclusion,
}

/// Kind-specific clip properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClipContent {
    Video {
        transform: ClipTransform,
        opacity: f32,
        blend_mode: BlendMode,
    },
    Audio {
        volume: f32,
        pan: f32,
        muted: bool,
        fade_in: RationalTime,
        fade_out: RationalTime,
    },
    Image {
        transform: ClipTransform,
        opacity: f32,
        blend_mode: BlendMode,
    },
    Text {
        text: String,
        font_size: f32,
        color: String,
        transform: ClipTransform,
    },
}

impl ClipContent {
    /// Neutral content for a resource of the given media kind.
    pub fn for_media(kind: MediaKind) -> Self {
        match kind {
            MediaKind::Video => Self::Video {
                transform: ClipTransform::IDENTITY,
                opacity: 1.0,
                blend_mode: BlendMode::Normal,
            },
            MediaKind::Audio => Self::Audio {
                volume: 1.0,
                pan: 0.0,
                muted: false,
                fade_in: RationalTime::ZERO,
                fade_out: RationalTime::ZERO,
            },
            MediaKind::Image => Self::Image {
                transform: ClipTransform::IDENTITY,
                opacity: 1.0,
                blend_mode: BlendMode::Normal,
            },
        }
    }

    /// Title content with default styling.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text {
            text: text.into(),
            font_size: 48.0,
            color: "#ffffff".to_string(),
            transform: ClipTransform::IDENTITY,
        }
    }

    pub fn kind(&self) -> ClipKind {
        match self {
            Self::Video { .. } => ClipKind::Video,
            Self::Audio { .. } => ClipKind::Audio,
            Self::Image { .. } => ClipKind::Image,
            Self::Text { .. } => ClipKind::Text,
        }
    }
}

/// A placed, trimmed span of an external resource.
///
/// Timing fields are private so that `duration == out - in` and
/// `end == start + duration` hold for every clip the engine hands out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: Uuid,
    pub name: String,
    /// Owning track. Maintained by the engine.
    track_id: Uuid,
    /// Imported resource this clip plays. Never owned by the clip.
    pub resource_id: Uuid,
    start: RationalTime,
    source_in: RationalTime,
    source_out: RationalTime,
    source_duration: RationalTime,
    /// Mirrors the engine selection; not persisted.
    #[serde(skip)]
    selected: bool,
    pub effects: Vec<Effect>,
    /// Animated clip properties, keyed by property name.
    pub keyframes: Vec<KeyframeTrack>,
    pub content: ClipContent,
}

impl Clip {
    /// A clip covering the whole resource, placed at `start`.
    pub fn from_resource(resource: &Resource, start: RationalTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: resource.name.clone(),
            track_id: Uuid::nil(),
            resource_id: resource.id,
            start,
            source_in: RationalTime::ZERO,
            source_out: resource.duration,
            source_duration: resource.duration,
            selected: false,
            effects: Vec::new(),
            keyframes: Vec::new(),
            content: ClipContent::for_media(resource.kind),
        }
    }

    /// Restrict the clip to `[source_in, source_out)` of its resource.
    pub fn with_source_range(
        mut self,
        source_in: RationalTime,
        source_out: RationalTime,
    ) -> EditResult<Self> {
        self.source_in = source_in;
        self.source_out = source_out;
        self.validate()?;
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_content(mut self, content: ClipContent) -> Self {
        self.content = content;
        self
    }

    /// Check the clip's own invariants.
    pub fn validate(&self) -> EditResult<()> {
        if self.start > RationalTime::MAX_EDIT || self.source_duration > RationalTime::MAX_EDIT {
            return Err(EditError::validation(format!(
                "clip '{}' lies beyond the editable range ({} max)",
                self.name,
                RationalTime::MAX_EDIT
            )));
        }
        if self.start.is_negative() {
            return Err(EditError::validation(format!(
                "clip '{}' starts before zero ({})",
                self.name, self.start
            )));
        }
        if self.source_in.is_negative() {
            return Err(EditError::validation(format!(
                "clip '{}' in point {} is negative",
                self.name, self.source_in
            )));
        }
        if self.source_out <= self.source_in {
            return Err(EditError::validation(format!(
                "clip '{}' has non-positive duration (in {}, out {})",
                self.name, self.source_in, self.source_out
            )));
        }
        if self.source_out > self.source_duration {
            return Err(EditError::validation(format!(
                "clip '{}' out point {} exceeds source duration {}",
                self.name, self.source_out, self.source_duration
            )));
        }
        Ok(())
    }

    pub fn kind(&self) -> ClipKind {
        self.content.kind()
    }

    pub fn track_id(&self) -> Uuid {
        self.track_id
    }

    pub fn start(&self) -> RationalTime {
        self.start
    }

    pub fn duration(&self) -> RationalTime {
        self.source_out - self.source_in
    }

    /// Timeline end (exclusive).
    pub fn end(&self) -> RationalTime {
        self.start + self.duration()
    }

    pub fn source_in(&self) -> RationalTime {
        self.source_in
    }

    pub fn source_out(&self) -> RationalTime {
        self.source_out
    }

    pub fn source_duration(&self) -> RationalTime {
        self.source_duration
    }

    /// Whether the clip is in the engine's current selection.
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// Timeline range covered by the clip.
    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.duration())
    }

    pub fn effect(&self, effect_id: Uuid) -> Option<&Effect> {
        self.effects.iter().find(|fx| fx.id == effect_id)
    }

    pub(crate) fn effect_mut(&mut self, effect_id: Uuid) -> Option<&mut Effect> {
        self.effects.iter_mut().find(|fx| fx.id == effect_id)
    }

    pub fn keyframe_track(&self, property: &str) -> Option<&KeyframeTrack> {
        self.keyframes.iter().find(|kt| kt.name == property)
    }

    pub(crate) fn set_track_id(&mut self, track_id: Uuid) {
        self.track_id = track_id;
    }

    pub(crate) fn set_start(&mut self, start: RationalTime) {
        self.start = start;
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub(crate) fn set_source_bounds(&mut self, source_in: RationalTime, source_out: RationalTime) {
        self.source_in = source_in;
        self.source_out = source_out;
    }

    pub(crate) fn set_keyframe(
        &mut self,
        property: &str,
        time: RationalTime,
        value: f64,
        easing: EasingCurve,
    ) {
        match self.keyframes.iter_mut().find(|kt| kt.name == property) {
            Some(track) => track.set(time, value, easing),
            None => {
                let mut track = KeyframeTrack::new(property);
                track.set(time, value, easing);
                self.keyframes.push(track);
            }
        }
    }

    /// Remove a keyframe; drops the property track once it is empty.
    pub(crate) fn remove_keyframe(&mut self, property: &str, time: RationalTime) -> bool {
        let Some(pos) = self.keyframes.iter().position(|kt| kt.name == property) else {
            return false;
        };
        let removed = self.keyframes[pos].remove(time);
        if self.keyframes[pos].is_empty() {
            self.keyframes.remove(pos);
        }
        removed
    }

    /// Cut the clip at timeline time `at` (strictly inside the clip).
    ///
    /// `self` keeps `[start, at)`; the returned clip covers `[at, end)` with
    /// a fresh id, the same resource and a matching source window.
    pub(crate) fn split_off(&mut self, at: RationalTime) -> Clip {
        let offset = at - self.start;
        let cut = self.source_in + offset;

        let mut right = self.clone();
        right.id = Uuid::new_v4();
        right.start = at;
        right.source_in = cut;
        right.selected = false;
        right.effects = Vec::with_capacity(self.effects.len());
        for fx in &mut self.effects {
            let mut copy = fx.duplicate();
            for (left, tail) in fx.parameters.iter_mut().zip(copy.parameters.iter_mut()) {
                tail.keyframes = left.keyframes.split_at(offset);
            }
            right.effects.push(copy);
        }
        right.keyframes = self
            .keyframes
            .iter_mut()
            .map(|kt| kt.split_at(offset))
            .collect();

        self.source_out = cut;
        right
    }
}
