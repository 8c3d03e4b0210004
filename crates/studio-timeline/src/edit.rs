//! Edit operations on the timeline.
//!
//! Every mutation is an `EditCommand`. Applying a command either succeeds
//! completely or returns an error with the timeline untouched: single
//! commands validate before they write, and batches run against a scratch
//! copy that only replaces the timeline once every step succeeded.

use serde::{Deserialize, Serialize};
use studio_core::{EasingCurve, RationalTime};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clip::Clip;
use crate::effect::{Effect, ParamValue};
use crate::error::{EditError, EditResult, EntityKind};
use crate::timeline::{Marker, Timeline};
use crate::track::{TrackKind, TrackUpdate};

// ── Operation kinds ─────────────────────────────────────────────

/// Category of a recorded operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    AddTrack,
    RemoveTrack,
    UpdateTrack,
    AddClip,
    RemoveClip,
    MoveClip,
    TrimClip,
    SplitClip,
    AddEffect,
    RemoveEffect,
    UpdateEffect,
    AddKeyframe,
    RemoveKeyframe,
    AddMarker,
    RemoveMarker,
    Select,
    Batch,
}

// ── Results ─────────────────────────────────────────────────────

/// Where a clip ended up after an add or move.
///
/// `start` differs from `requested_start` when push-right resolution had to
/// relocate the clip past a colliding one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub clip_id: Uuid,
    pub track_id: Uuid,
    pub requested_start: RationalTime,
    pub start: RationalTime,
}

impl Placement {
    pub fn was_relocated(&self) -> bool {
        self.start != self.requested_start
    }
}

/// What a successfully applied command changed.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    TrackAdded {
        track_id: Uuid,
    },
    TrackRemoved {
        track_id: Uuid,
        clip_ids: Vec<Uuid>,
    },
    TrackUpdated {
        track_id: Uuid,
    },
    ClipAdded(Placement),
    ClipMoved {
        placement: Placement,
        from_track: Uuid,
    },
    ClipUpdated {
        clip_id: Uuid,
    },
    ClipSplit {
        original: Uuid,
        created: Uuid,
    },
    ClipRemoved {
        clip_id: Uuid,
        track_id: Uuid,
    },
    EffectAdded {
        clip_id: Uuid,
        effect_id: Uuid,
    },
    MarkerAdded {
        marker_id: Uuid,
    },
    MarkerRemoved {
        marker_id: Uuid,
    },
    Batch(Vec<EditOutcome>),
}

impl EditOutcome {
    /// Ids of clips that no longer exist after this change.
    pub fn removed_clips(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        self.collect_removed(&mut ids);
        ids
    }

    fn collect_removed(&self, ids: &mut Vec<Uuid>) {
        match self {
            Self::TrackRemoved { clip_ids, .. } => ids.extend_from_slice(clip_ids),
            Self::ClipRemoved { clip_id, .. } => ids.push(*clip_id),
            Self::Batch(outcomes) => outcomes.iter().for_each(|o| o.collect_removed(ids)),
            _ => {}
        }
    }
}

// ── Edit commands ───────────────────────────────────────────────

/// A timeline mutation.
#[derive(Debug, Clone)]
pub enum EditCommand {
    AddTrack {
        kind: TrackKind,
        name: Option<String>,
    },
    /// Removes the track and every clip on it.
    RemoveTrack {
        track_id: Uuid,
    },
    UpdateTrack {
        track_id: Uuid,
        update: TrackUpdate,
    },
    /// Place a clip, pushing it right past any collision.
    AddClip {
        track_id: Uuid,
        clip: Clip,
    },
    /// Move a clip to `start`, optionally onto another track.
    MoveClip {
        clip_id: Uuid,
        start: RationalTime,
        track_id: Option<Uuid>,
    },
    /// Set new source in/out points.
    TrimClip {
        clip_id: Uuid,
        source_in: RationalTime,
        source_out: RationalTime,
    },
    /// Cut a clip in two at timeline time `at`.
    SplitClip {
        clip_id: Uuid,
        at: RationalTime,
    },
    RemoveClip {
        clip_id: Uuid,
    },
    AddEffect {
        clip_id: Uuid,
        effect: Effect,
    },
    RemoveEffect {
        clip_id: Uuid,
        effect_id: Uuid,
    },
    SetEffectEnabled {
        clip_id: Uuid,
        effect_id: Uuid,
        enabled: bool,
    },
    SetEffectParameter {
        clip_id: Uuid,
        effect_id: Uuid,
        name: String,
        value: ParamValue,
    },
    /// Insert or update a keyframe; `time` is relative to the clip start.
    SetKeyframe {
        clip_id: Uuid,
        property: String,
        time: RationalTime,
        value: f64,
        easing: EasingCurve,
    },
    RemoveKeyframe {
        clip_id: Uuid,
        property: String,
        time: RationalTime,
    },
    AddMarker {
        marker: Marker,
    },
    RemoveMarker {
        marker_id: Uuid,
    },
    /// Several commands applied as one atomic unit.
    Batch(Vec<EditCommand>),
}

impl EditCommand {
    /// Apply this command to `timeline`.
    ///
    /// Does not touch the derived duration or selection flags; the engine
    /// republishes those after a successful apply.
    pub fn apply(&self, timeline: &mut Timeline) -> EditResult<EditOutcome> {
        match self {
            Self::AddTrack { kind, name } => {
                let track_id = timeline.push_track(*kind, name.clone());
                Ok(EditOutcome::TrackAdded { track_id })
            }
            Self::RemoveTrack { track_id } => {
                let track = timeline
                    .remove_track(*track_id)
                    .ok_or_else(|| EditError::not_found(EntityKind::Track, *track_id))?;
                let clip_ids = track.clips().iter().map(|c| c.id).collect();
                Ok(EditOutcome::TrackRemoved {
                    track_id: *track_id,
                    clip_ids,
                })
            }
            Self::UpdateTrack { track_id, update } => {
                let track = timeline
                    .track_mut(*track_id)
                    .ok_or_else(|| EditError::not_found(EntityKind::Track, *track_id))?;
                track.apply_update(update);
                Ok(EditOutcome::TrackUpdated {
                    track_id: *track_id,
                })
            }
            Self::AddClip { track_id, clip } => add_clip(timeline, *track_id, clip.clone()),
            Self::MoveClip {
                clip_id,
                start,
                track_id,
            } => move_clip(timeline, *clip_id, *start, *track_id),
            Self::TrimClip {
                clip_id,
                source_in,
                source_out,
            } => trim_clip(timeline, *clip_id, *source_in, *source_out),
            Self::SplitClip { clip_id, at } => split_clip(timeline, *clip_id, *at),
            Self::RemoveClip { clip_id } => {
                let track_id = timeline.require_unlocked_track_of(*clip_id)?.id;
                if let Some(track) = timeline.track_mut(track_id) {
                    track.remove_clip(*clip_id);
                }
                debug!(clip = %clip_id, track = %track_id, "Removed clip");
                Ok(EditOutcome::ClipRemoved {
                    clip_id: *clip_id,
                    track_id,
                })
            }
            Self::AddEffect { clip_id, effect } => {
                let effect_id = effect.id;
                with_clip(timeline, *clip_id, |clip| {
                    if clip.effect(effect_id).is_some() {
                        return Err(EditError::validation(format!(
                            "effect {} already attached",
                            effect_id
                        )));
                    }
                    clip.effects.push(effect.clone());
                    Ok(())
                })?;
                Ok(EditOutcome::EffectAdded {
                    clip_id: *clip_id,
                    effect_id,
                })
            }
            Self::RemoveEffect { clip_id, effect_id } => {
                with_clip(timeline, *clip_id, |clip| {
                    let index = clip
                        .effects
                        .iter()
                        .position(|fx| fx.id == *effect_id)
                        .ok_or_else(|| EditError::not_found(EntityKind::Effect, *effect_id))?;
                    clip.effects.remove(index);
                    Ok(())
                })?;
                Ok(EditOutcome::ClipUpdated { clip_id: *clip_id })
            }
            Self::SetEffectEnabled {
                clip_id,
                effect_id,
                enabled,
            } => {
                with_clip(timeline, *clip_id, |clip| {
                    let fx = clip
                        .effect_mut(*effect_id)
                        .ok_or_else(|| EditError::not_found(EntityKind::Effect, *effect_id))?;
                    fx.enabled = *enabled;
                    Ok(())
                })?;
                Ok(EditOutcome::ClipUpdated { clip_id: *clip_id })
            }
            Self::SetEffectParameter {
                clip_id,
                effect_id,
                name,
                value,
            } => {
                with_clip(timeline, *clip_id, |clip| {
                    clip.effect_mut(*effect_id)
                        .ok_or_else(|| EditError::not_found(EntityKind::Effect, *effect_id))?
                        .set_parameter(name, value.clone())
                })?;
                Ok(EditOutcome::ClipUpdated { clip_id: *clip_id })
            }
            Self::SetKeyframe {
                clip_id,
                property,
                time,
                value,
                easing,
            } => {
                with_clip(timeline, *clip_id, |clip| {
                    if time.is_negative() || *time > clip.duration() {
                        return Err(EditError::validation(format!(
                            "keyframe at {} outside clip '{}' (0..{})",
                            time,
                            clip.name,
                            clip.duration()
                        )));
                    }
                    if !value.is_finite() {
                        return Err(EditError::validation("keyframe value must be finite"));
                    }
                    clip.set_keyframe(property, *time, *value, *easing);
                    Ok(())
                })?;
                Ok(EditOutcome::ClipUpdated { clip_id: *clip_id })
            }
            Self::RemoveKeyframe {
                clip_id,
                property,
                time,
            } => {
                with_clip(timeline, *clip_id, |clip| {
                    if clip.remove_keyframe(property, *time) {
                        Ok(())
                    } else {
                        Err(EditError::not_found(EntityKind::Keyframe, *clip_id))
                    }
                })?;
                Ok(EditOutcome::ClipUpdated { clip_id: *clip_id })
            }
            Self::AddMarker { marker } => {
                if marker.time.is_negative() {
                    return Err(EditError::validation(format!(
                        "marker '{}' placed before zero",
                        marker.name
                    )));
                }
                if timeline.markers().iter().any(|m| m.id == marker.id) {
                    return Err(EditError::validation(format!(
                        "marker {} already exists",
                        marker.id
                    )));
                }
                timeline.insert_marker(marker.clone());
                Ok(EditOutcome::MarkerAdded {
                    marker_id: marker.id,
                })
            }
            Self::RemoveMarker { marker_id } => {
                timeline
                    .remove_marker(*marker_id)
                    .ok_or_else(|| EditError::not_found(EntityKind::Marker, *marker_id))?;
                Ok(EditOutcome::MarkerRemoved {
                    marker_id: *marker_id,
                })
            }
            Self::Batch(commands) => {
                let mut scratch = timeline.clone();
                let mut outcomes = Vec::with_capacity(commands.len());
                for command in commands {
                    outcomes.push(command.apply(&mut scratch)?);
                }
                *timeline = scratch;
                Ok(EditOutcome::Batch(outcomes))
            }
        }
    }

    pub fn kind(&self) -> OperationKind {
        match self {
            Self::AddTrack { .. } => OperationKind::AddTrack,
            Self::RemoveTrack { .. } => OperationKind::RemoveTrack,
            Self::UpdateTrack { .. } => OperationKind::UpdateTrack,
            Self::AddClip { .. } => OperationKind::AddClip,
            Self::MoveClip { .. } => OperationKind::MoveClip,
            Self::TrimClip { .. } => OperationKind::TrimClip,
            Self::SplitClip { .. } => OperationKind::SplitClip,
            Self::RemoveClip { .. } => OperationKind::RemoveClip,
            Self::AddEffect { .. } => OperationKind::AddEffect,
            Self::RemoveEffect { .. } => OperationKind::RemoveEffect,
            Self::SetEffectEnabled { .. } | Self::SetEffectParameter { .. } => {
                OperationKind::UpdateEffect
            }
            Self::SetKeyframe { .. } => OperationKind::AddKeyframe,
            Self::RemoveKeyframe { .. } => OperationKind::RemoveKeyframe,
            Self::AddMarker { .. } => OperationKind::AddMarker,
            Self::RemoveMarker { .. } => OperationKind::RemoveMarker,
            Self::Batch(_) => OperationKind::Batch,
        }
    }

    /// Human-readable label for history, resolved against the timeline
    /// before the command runs.
    pub fn describe(&self, timeline: &Timeline) -> String {
        let clip_name = |id: &Uuid| {
            timeline
                .clip(*id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        let track_label = |id: &Uuid| {
            timeline
                .track(*id)
                .map(|t| t.kind.label().to_lowercase())
                .unwrap_or_else(|| "unknown".to_string())
        };
        match self {
            Self::AddTrack { kind, .. } => format!("Add {} track", kind.label().to_lowercase()),
            Self::RemoveTrack { track_id } => format!("Remove {} track", track_label(track_id)),
            Self::UpdateTrack { track_id, .. } => {
                format!("Update {} track", track_label(track_id))
            }
            Self::AddClip { clip, .. } => format!("Add clip {}", clip.name),
            Self::MoveClip { clip_id, .. } => format!("Move clip {}", clip_name(clip_id)),
            Self::TrimClip { clip_id, .. } => format!("Trim clip {}", clip_name(clip_id)),
            Self::SplitClip { clip_id, .. } => format!("Split clip {}", clip_name(clip_id)),
            Self::RemoveClip { clip_id } => format!("Remove clip {}", clip_name(clip_id)),
            Self::AddEffect { effect, clip_id } => {
                format!("Add {} to {}", effect.name, clip_name(clip_id))
            }
            Self::RemoveEffect { clip_id, .. } => format!("Remove effect from {}", clip_name(clip_id)),
            Self::SetEffectEnabled { clip_id, enabled, .. } => format!(
                "{} effect on {}",
                if *enabled { "Enable" } else { "Disable" },
                clip_name(clip_id)
            ),
            Self::SetEffectParameter { clip_id, name, .. } => {
                format!("Set {} on {}", name, clip_name(clip_id))
            }
            Self::SetKeyframe { clip_id, property, .. } => {
                format!("Add {} keyframe to {}", property, clip_name(clip_id))
            }
            Self::RemoveKeyframe { clip_id, property, .. } => {
                format!("Remove {} keyframe from {}", property, clip_name(clip_id))
            }
            Self::AddMarker { marker } => format!("Add marker {}", marker.name),
            Self::RemoveMarker { .. } => "Remove marker".to_string(),
            Self::Batch(commands) => format!("{} edits", commands.len()),
        }
    }
}

// ── Operation bodies ────────────────────────────────────────────

fn add_clip(timeline: &mut Timeline, track_id: Uuid, mut clip: Clip) -> EditResult<EditOutcome> {
    let track = timeline.require_track(track_id)?;
    if track.locked {
        return Err(EditError::Locked { track_id });
    }
    clip.validate()?;
    if timeline.contains_clip(clip.id) {
        return Err(EditError::validation(format!(
            "clip {} is already on the timeline",
            clip.id
        )));
    }

    let requested_start = clip.start();
    let start = track.resolve_push_right(requested_start, clip.duration());
    clip.set_start(start);
    let placement = Placement {
        clip_id: clip.id,
        track_id,
        requested_start,
        start,
    };
    if placement.was_relocated() {
        warn!(
            clip = %clip.id,
            requested = %requested_start,
            actual = %start,
            "Clip pushed right to avoid overlap"
        );
    }

    if let Some(track) = timeline.track_mut(track_id) {
        track.insert_sorted(clip);
    }
    debug!(clip = %placement.clip_id, track = %track_id, start = %start, "Added clip");
    Ok(EditOutcome::ClipAdded(placement))
}

fn move_clip(
    timeline: &mut Timeline,
    clip_id: Uuid,
    new_start: RationalTime,
    new_track: Option<Uuid>,
) -> EditResult<EditOutcome> {
    let from_track = timeline.require_unlocked_track_of(clip_id)?.id;
    let to_track = new_track.unwrap_or(from_track);
    let destination = timeline.require_track(to_track)?;
    if destination.locked {
        return Err(EditError::Locked { track_id: to_track });
    }
    if new_start > RationalTime::MAX_EDIT {
        return Err(EditError::validation(format!(
            "start {} lies beyond the editable range",
            new_start
        )));
    }

    let Some((_, mut clip)) = timeline
        .track_mut(from_track)
        .and_then(|t| t.remove_clip(clip_id))
    else {
        return Err(EditError::not_found(EntityKind::Clip, clip_id));
    };

    let requested_start = new_start.max(RationalTime::ZERO);
    let Some(destination) = timeline.track_mut(to_track) else {
        return Err(EditError::not_found(EntityKind::Track, to_track));
    };
    let start = destination.resolve_push_right(requested_start, clip.duration());
    clip.set_start(start);
    destination.insert_sorted(clip);

    let placement = Placement {
        clip_id,
        track_id: to_track,
        requested_start,
        start,
    };
    if placement.was_relocated() {
        warn!(
            clip = %clip_id,
            requested = %requested_start,
            actual = %start,
            "Moved clip pushed right to avoid overlap"
        );
    }
    debug!(clip = %clip_id, from = %from_track, to = %to_track, start = %start, "Moved clip");
    Ok(EditOutcome::ClipMoved {
        placement,
        from_track,
    })
}

fn trim_clip(
    timeline: &mut Timeline,
    clip_id: Uuid,
    new_in: RationalTime,
    new_out: RationalTime,
) -> EditResult<EditOutcome> {
    let track = timeline.require_unlocked_track_of(clip_id)?;
    let track_id = track.id;
    let Some(clip) = track.clip(clip_id) else {
        return Err(EditError::not_found(EntityKind::Clip, clip_id));
    };

    let source_in = new_in.max(RationalTime::ZERO);
    let source_out = new_out.min(clip.source_out());
    if source_out - source_in <= RationalTime::ZERO {
        return Err(EditError::validation(format!(
            "trim of '{}' to [{}, {}) leaves no duration",
            clip.name, source_in, source_out
        )));
    }

    let trimmed = studio_core::TimeRange::new(clip.start(), source_out - source_in);
    if let Some(other) = track.first_overlap(trimmed, Some(clip_id)) {
        return Err(EditError::validation(format!(
            "trim of '{}' would overlap '{}'",
            clip.name, other.name
        )));
    }

    if let Some(clip) = timeline
        .track_mut(track_id)
        .and_then(|t| t.clip_mut(clip_id))
    {
        clip.set_source_bounds(source_in, source_out);
    }
    debug!(clip = %clip_id, source_in = %source_in, source_out = %source_out, "Trimmed clip");
    Ok(EditOutcome::ClipUpdated { clip_id })
}

fn split_clip(timeline: &mut Timeline, clip_id: Uuid, at: RationalTime) -> EditResult<EditOutcome> {
    let track = timeline.require_unlocked_track_of(clip_id)?;
    let track_id = track.id;
    let Some(index) = track.position(clip_id) else {
        return Err(EditError::not_found(EntityKind::Clip, clip_id));
    };
    let range = track.clips()[index].range();
    if !range.contains_interior(at) {
        return Err(EditError::validation(format!(
            "split point {} outside clip span ({}, {})",
            at,
            range.start,
            range.end()
        )));
    }

    let Some(track) = timeline.track_mut(track_id) else {
        return Err(EditError::not_found(EntityKind::Track, track_id));
    };
    let Some(original) = track.clip_mut(clip_id) else {
        return Err(EditError::not_found(EntityKind::Clip, clip_id));
    };
    let tail = original.split_off(at);
    let created = tail.id;
    track.insert_at(index + 1, tail);

    debug!(clip = %clip_id, created = %created, at = %at, "Split clip");
    Ok(EditOutcome::ClipSplit {
        original: clip_id,
        created,
    })
}

/// Run `f` on a clip whose track is unlocked.
fn with_clip<F>(timeline: &mut Timeline, clip_id: Uuid, f: F) -> EditResult<()>
where
    F: FnOnce(&mut Clip) -> EditResult<()>,
{
    let track_id = timeline.require_unlocked_track_of(clip_id)?.id;
    let clip = timeline
        .track_mut(track_id)
        .and_then(|t| t.clip_mut(clip_id))
        .ok_or_else(|| EditError::not_found(EntityKind::Clip, clip_id))?;
    let mut edited = clip.clone();
    f(&mut edited)?;
    *clip = edited;
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────
