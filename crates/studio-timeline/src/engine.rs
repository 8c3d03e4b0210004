//! The editing engine.
//!
//! `Engine` owns one timeline together with its selection, history and
//! playback clock, and is the only way to change them. Every mutating call
//! runs to completion before it returns: on success the derived state
//! (duration, selection flags, playhead clamp) is republished, a history
//! entry is recorded and subscribers are notified; on failure nothing
//! changes and nothing is sent.

use crossbeam_channel::{Receiver, Sender};
use studio_core::{EasingCurve, RationalTime};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::clip::Clip;
use crate::config::EngineConfig;
use crate::duration;
use crate::edit::{EditCommand, EditOutcome, OperationKind, Placement};
use crate::effect::{Effect, ParamValue};
use crate::error::{EditError, EditResult, EntityKind};
use crate::history::{History, HistoryEntry, HistoryState, Snapshot};
use crate::playback::{PlaybackClock, PlaybackState};
use crate::resource::Resource;
use crate::selection::Selection;
use crate::serialization::TimelineStore;
use crate::timeline::{Marker, Timeline};
use crate::track::{TrackKind, TrackUpdate};

/// Change notification sent to subscribers after an operation completes.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    TimelineChanged { duration: RationalTime },
    ClipAdded { clip_id: Uuid, track_id: Uuid },
    ClipRemoved { clip_id: Uuid },
    ClipUpdated { clip_id: Uuid },
    SelectionChanged { selected: Vec<Uuid> },
    PlaybackChanged(PlaybackState),
    HistoryChanged(HistoryState),
}

/// Timeline editing engine.
pub struct Engine {
    config: EngineConfig,
    timeline: Timeline,
    selection: Selection,
    history: History,
    playback: PlaybackClock,
    subscribers: Vec<Sender<EngineEvent>>,
}

impl Engine {
    /// Create an engine with a timeline laid out from `config`.
    pub fn new(config: EngineConfig) -> studio_core::Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let mut timeline = Timeline::from_defaults(&config.timeline);
        duration::republish(&mut timeline, config.min_duration);
        let playback = PlaybackClock::new(
            timeline.frame_rate,
            timeline.duration(),
            config.min_speed,
            config.max_speed,
        );
        info!(
            timeline = %timeline.id,
            tracks = timeline.track_count(),
            "Editing engine created"
        );
        Self {
            history: History::new(config.history_limit),
            config,
            timeline,
            selection: Selection::new(),
            playback,
            subscribers: Vec::new(),
        }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn playback(&self) -> &PlaybackState {
        self.playback.state()
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.playback
    }

    pub fn history_state(&self) -> HistoryState {
        self.history.state()
    }

    /// Register a listener. Events arrive strictly after the operation
    /// that caused them has completed; dropped receivers are pruned.
    pub fn subscribe(&mut self) -> Receiver<EngineEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    // ── Tracks ──────────────────────────────────────────────────

    pub fn add_track(&mut self, kind: TrackKind) -> EditResult<Uuid> {
        self.add_named_track(kind, None)
    }

    pub fn add_named_track(&mut self, kind: TrackKind, name: Option<String>) -> EditResult<Uuid> {
        match self.execute(EditCommand::AddTrack { kind, name })? {
            EditOutcome::TrackAdded { track_id } => {
                info!(track = %track_id, kind = %kind, "Added track");
                Ok(track_id)
            }
            other => Err(unexpected(other)),
        }
    }

    /// Remove a track with all of its clips.
    pub fn remove_track(&mut self, track_id: Uuid) -> EditResult<()> {
        let outcome = self.execute(EditCommand::RemoveTrack { track_id })?;
        info!(
            track = %track_id,
            clips = outcome.removed_clips().len(),
            "Removed track"
        );
        Ok(())
    }

    /// Update flags, mix or name. Allowed on locked tracks.
    pub fn set_track_flags(&mut self, track_id: Uuid, update: TrackUpdate) -> EditResult<()> {
        self.execute(EditCommand::UpdateTrack { track_id, update })?;
        Ok(())
    }

    // ── Clips ───────────────────────────────────────────────────

    pub fn add_clip(&mut self, clip: Clip, track_id: Uuid) -> EditResult<Placement> {
        match self.execute(EditCommand::AddClip { track_id, clip })? {
            EditOutcome::ClipAdded(placement) => Ok(placement),
            other => Err(unexpected(other)),
        }
    }

    /// Add a clip spanning the whole of `resource` at `start`.
    pub fn add_clip_from_resource(
        &mut self,
        resource: &Resource,
        track_id: Uuid,
        start: RationalTime,
    ) -> EditResult<Placement> {
        if !resource.duration.is_positive() {
            let err = EditError::validation(format!(
                "resource '{}' has no duration",
                resource.name
            ));
            warn!(resource = %resource.id, error = %err, "Rejected clip");
            return Err(err);
        }
        self.add_clip(Clip::from_resource(resource, start), track_id)
    }

    pub fn move_clip(
        &mut self,
        clip_id: Uuid,
        start: RationalTime,
        track_id: Option<Uuid>,
    ) -> EditResult<Placement> {
        match self.execute(EditCommand::MoveClip {
            clip_id,
            start,
            track_id,
        })? {
            EditOutcome::ClipMoved { placement, .. } => Ok(placement),
            other => Err(unexpected(other)),
        }
    }

    pub fn trim_clip(
        &mut self,
        clip_id: Uuid,
        source_in: RationalTime,
        source_out: RationalTime,
    ) -> EditResult<()> {
        self.execute(EditCommand::TrimClip {
            clip_id,
            source_in,
            source_out,
        })?;
        Ok(())
    }

    /// Split at timeline time `at`; returns the id of the new right half.
    pub fn split_clip(&mut self, clip_id: Uuid, at: RationalTime) -> EditResult<Uuid> {
        match self.execute(EditCommand::SplitClip { clip_id, at })? {
            EditOutcome::ClipSplit { created, .. } => Ok(created),
            other => Err(unexpected(other)),
        }
    }

    pub fn remove_clip(&mut self, clip_id: Uuid) -> EditResult<()> {
        self.execute(EditCommand::RemoveClip { clip_id })?;
        Ok(())
    }

    // ── Effects and keyframes ───────────────────────────────────

    pub fn add_effect(&mut self, clip_id: Uuid, effect: Effect) -> EditResult<Uuid> {
        let effect_id = effect.id;
        self.execute(EditCommand::AddEffect { clip_id, effect })?;
        Ok(effect_id)
    }

    pub fn remove_effect(&mut self, clip_id: Uuid, effect_id: Uuid) -> EditResult<()> {
        self.execute(EditCommand::RemoveEffect { clip_id, effect_id })?;
        Ok(())
    }

    pub fn set_effect_enabled(
        &mut self,
        clip_id: Uuid,
        effect_id: Uuid,
        enabled: bool,
    ) -> EditResult<()> {
        self.execute(EditCommand::SetEffectEnabled {
            clip_id,
            effect_id,
            enabled,
        })?;
        Ok(())
    }

    pub fn set_effect_parameter(
        &mut self,
        clip_id: Uuid,
        effect_id: Uuid,
        name: &str,
        value: ParamValue,
    ) -> EditResult<()> {
        self.execute(EditCommand::SetEffectParameter {
            clip_id,
            effect_id,
            name: name.to_string(),
            value,
        })?;
        Ok(())
    }

    /// Insert or replace a keyframe at `time` relative to the clip start.
    pub fn set_keyframe(
        &mut self,
        clip_id: Uuid,
        property: &str,
        time: RationalTime,
        value: f64,
        easing: EasingCurve,
    ) -> EditResult<()> {
        self.execute(EditCommand::SetKeyframe {
            clip_id,
            property: property.to_string(),
            time,
            value,
            easing,
        })?;
        Ok(())
    }

    pub fn remove_keyframe(
        &mut self,
        clip_id: Uuid,
        property: &str,
        time: RationalTime,
    ) -> EditResult<()> {
        self.execute(EditCommand::RemoveKeyframe {
            clip_id,
            property: property.to_string(),
            time,
        })?;
        Ok(())
    }

    // ── Markers ─────────────────────────────────────────────────

    pub fn add_marker(&mut self, marker: Marker) -> EditResult<Uuid> {
        let marker_id = marker.id;
        self.execute(EditCommand::AddMarker { marker })?;
        Ok(marker_id)
    }

    pub fn remove_marker(&mut self, marker_id: Uuid) -> EditResult<()> {
        self.execute(EditCommand::RemoveMarker { marker_id })?;
        Ok(())
    }

    // ── Command pipeline ────────────────────────────────────────

    /// Apply any edit command, including batches, as one undoable step.
    pub fn execute(&mut self, command: EditCommand) -> EditResult<EditOutcome> {
        let description = command.describe(&self.timeline);
        self.run(command, description)
    }

    fn run(&mut self, command: EditCommand, description: String) -> EditResult<EditOutcome> {
        let before = self.snapshot();
        let outcome = match command.apply(&mut self.timeline) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(operation = %description, error = %err, "Edit rejected");
                return Err(err);
            }
        };
        if self.timeline == before.timeline {
            debug!(operation = %description, "Edit left the timeline unchanged");
            self.timeline = before.timeline;
            return Ok(outcome);
        }

        let removed = outcome.removed_clips();
        let selection_changed = self.selection.retain(|id| !removed.contains(&id));
        self.selection.publish(&mut self.timeline);
        let playback_changed = self.republish_duration();
        self.record(command.kind(), description, before);

        let mut events = Vec::new();
        self.outcome_events(&outcome, &mut events);
        events.push(EngineEvent::TimelineChanged {
            duration: self.timeline.duration(),
        });
        if selection_changed {
            events.push(self.selection_event());
        }
        if playback_changed {
            events.push(EngineEvent::PlaybackChanged(self.playback.state().clone()));
        }
        events.push(EngineEvent::HistoryChanged(self.history.state()));
        self.emit(events);
        Ok(outcome)
    }

    fn outcome_events(&self, outcome: &EditOutcome, events: &mut Vec<EngineEvent>) {
        match outcome {
            EditOutcome::TrackRemoved { clip_ids, .. } => events.extend(
                clip_ids
                    .iter()
                    .map(|&clip_id| EngineEvent::ClipRemoved { clip_id }),
            ),
            EditOutcome::ClipAdded(placement) => events.push(EngineEvent::ClipAdded {
                clip_id: placement.clip_id,
                track_id: placement.track_id,
            }),
            EditOutcome::ClipMoved { placement, .. } => {
                events.push(EngineEvent::ClipUpdated {
                    clip_id: placement.clip_id,
                })
            }
            EditOutcome::ClipUpdated { clip_id } | EditOutcome::EffectAdded { clip_id, .. } => {
                events.push(EngineEvent::ClipUpdated { clip_id: *clip_id })
            }
            EditOutcome::ClipSplit { original, created } => {
                events.push(EngineEvent::ClipUpdated { clip_id: *original });
                if let Some(track) = self.timeline.track_of(*created) {
                    events.push(EngineEvent::ClipAdded {
                        clip_id: *created,
                        track_id: track.id,
                    });
                }
            }
            EditOutcome::ClipRemoved { clip_id, .. } => {
                events.push(EngineEvent::ClipRemoved { clip_id: *clip_id })
            }
            EditOutcome::Batch(outcomes) => {
                for outcome in outcomes {
                    self.outcome_events(outcome, events);
                }
            }
            EditOutcome::TrackAdded { .. }
            | EditOutcome::TrackUpdated { .. }
            | EditOutcome::MarkerAdded { .. }
            | EditOutcome::MarkerRemoved { .. } => {}
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            timeline: self.timeline.clone(),
            selection: self.selection.clone(),
        }
    }

    fn record(&mut self, kind: OperationKind, description: String, before: Snapshot) {
        let after = self.snapshot();
        debug!(operation = %description, "Recorded history entry");
        self.history
            .record(HistoryEntry::new(kind, description, before, after));
    }

    /// Recompute the duration and follow it with the playhead. Returns
    /// whether the playback state moved.
    fn republish_duration(&mut self) -> bool {
        duration::republish(&mut self.timeline, self.config.min_duration);
        let before = self.playback.state().clone();
        self.playback.set_duration(self.timeline.duration());
        *self.playback.state() != before
    }

    fn selection_event(&self) -> EngineEvent {
        EngineEvent::SelectionChanged {
            selected: self.selection.ids().to_vec(),
        }
    }

    fn emit(&mut self, events: Vec<EngineEvent>) {
        if events.is_empty() {
            return;
        }
        self.subscribers
            .retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }

    // ── Selection ───────────────────────────────────────────────

    /// Single-select `clip_id`, or toggle it when `multi` is set.
    pub fn select_clip(&mut self, clip_id: Uuid, multi: bool) -> EditResult<()> {
        if !self.timeline.contains_clip(clip_id) {
            let err = EditError::not_found(EntityKind::Clip, clip_id);
            warn!(error = %err, "Selection rejected");
            return Err(err);
        }
        let description = match self.timeline.clip(clip_id) {
            Some(clip) => format!("Select {}", clip.name),
            None => "Select clip".to_string(),
        };
        self.change_selection(description, |selection| selection.select(clip_id, multi));
        Ok(())
    }

    /// Replace the selection with the ids that exist on the timeline.
    /// Unknown ids are dropped; returns how many were kept.
    pub fn select_clips(&mut self, ids: &[Uuid]) -> usize {
        let known: Vec<Uuid> = ids
            .iter()
            .copied()
            .filter(|id| self.timeline.contains_clip(*id))
            .collect();
        if known.len() != ids.len() {
            debug!(
                requested = ids.len(),
                kept = known.len(),
                "Ignored unknown clips in selection"
            );
        }
        let description = format!("Select {} clips", known.len());
        self.change_selection(description, |selection| selection.select_many(known));
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.change_selection("Clear selection".to_string(), Selection::clear);
    }

    fn change_selection(&mut self, description: String, f: impl FnOnce(&mut Selection)) {
        let before = self.snapshot();
        f(&mut self.selection);
        if self.selection == before.selection {
            return;
        }
        self.selection.publish(&mut self.timeline);

        let mut events = vec![self.selection_event()];
        if self.config.record_selection {
            self.record(OperationKind::Select, description, before);
            events.push(EngineEvent::HistoryChanged(self.history.state()));
        }
        self.emit(events);
    }

    /// Remove every selected clip as one undoable step. Returns the number
    /// removed.
    pub fn delete_selected(&mut self) -> EditResult<usize> {
        if self.selection.is_empty() {
            return Ok(0);
        }
        let commands: Vec<EditCommand> = self
            .selection
            .ids()
            .iter()
            .map(|&clip_id| EditCommand::RemoveClip { clip_id })
            .collect();
        let count = commands.len();
        let description = if count == 1 {
            "Delete 1 clip".to_string()
        } else {
            format!("Delete {} clips", count)
        };
        self.run(EditCommand::Batch(commands), description)?;
        Ok(count)
    }

    // ── History ─────────────────────────────────────────────────

    pub fn undo(&mut self) -> EditResult<()> {
        let Some((snapshot, description)) = self
            .history
            .undo()
            .map(|e| (e.before.clone(), e.description.clone()))
        else {
            return Err(EditError::State("nothing to undo".into()));
        };
        self.restore(snapshot);
        info!(operation = %description, "Undo");
        Ok(())
    }

    pub fn redo(&mut self) -> EditResult<()> {
        let Some((snapshot, description)) = self
            .history
            .redo()
            .map(|e| (e.after.clone(), e.description.clone()))
        else {
            return Err(EditError::State("nothing to redo".into()));
        };
        self.restore(snapshot);
        info!(operation = %description, "Redo");
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        info!("History cleared");
        self.emit(vec![EngineEvent::HistoryChanged(self.history.state())]);
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let selection_changed = snapshot.selection != self.selection;
        self.timeline = snapshot.timeline;
        self.selection = snapshot.selection;
        let playback_changed = self.republish_duration();

        let mut events = vec![EngineEvent::TimelineChanged {
            duration: self.timeline.duration(),
        }];
        if selection_changed {
            events.push(self.selection_event());
        }
        if playback_changed {
            events.push(EngineEvent::PlaybackChanged(self.playback.state().clone()));
        }
        events.push(EngineEvent::HistoryChanged(self.history.state()));
        self.emit(events);
    }

    // ── Playback ────────────────────────────────────────────────

    fn with_clock<R>(&mut self, f: impl FnOnce(&mut PlaybackClock) -> R) -> R {
        let before = self.playback.state().clone();
        let result = f(&mut self.playback);
        if *self.playback.state() != before {
            debug!(
                position = %self.playback.position(),
                playing = self.playback.is_playing(),
                "Playback changed"
            );
            self.emit(vec![EngineEvent::PlaybackChanged(
                self.playback.state().clone(),
            )]);
        }
        result
    }

    /// Move the playhead, clamped to the timeline. Returns the new position.
    pub fn set_position(&mut self, position: RationalTime) -> RationalTime {
        self.with_clock(|clock| clock.set_position(position))
    }

    pub fn toggle_playback(&mut self) -> bool {
        self.with_clock(PlaybackClock::toggle)
    }

    pub fn play(&mut self) {
        self.with_clock(PlaybackClock::play)
    }

    pub fn pause(&mut self) {
        self.with_clock(PlaybackClock::pause)
    }

    pub fn set_speed(&mut self, speed: f64) -> f64 {
        self.with_clock(|clock| clock.set_speed(speed))
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.with_clock(|clock| clock.set_loop(looping))
    }

    pub fn set_volume(&mut self, volume: f32) -> f32 {
        self.with_clock(|clock| clock.set_volume(volume))
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.with_clock(|clock| clock.set_muted(muted))
    }

    pub fn set_in_point(&mut self, point: Option<RationalTime>) -> EditResult<()> {
        self.with_clock(|clock| clock.set_in_point(point))
    }

    pub fn set_out_point(&mut self, point: Option<RationalTime>) -> EditResult<()> {
        self.with_clock(|clock| clock.set_out_point(point))
    }

    pub fn clear_range(&mut self) {
        self.with_clock(PlaybackClock::clear_range)
    }

    pub fn step_frames(&mut self, frames: i64) -> RationalTime {
        self.with_clock(|clock| clock.step_frames(frames))
    }

    /// Drive the transport by `elapsed` wall time.
    pub fn advance(&mut self, elapsed: RationalTime) -> bool {
        self.with_clock(|clock| clock.advance(elapsed))
    }

    pub fn time_to_frame(&self, time: RationalTime) -> i64 {
        self.playback.time_to_frame(time)
    }

    pub fn frame_to_time(&self, frame: i64) -> RationalTime {
        self.playback.frame_to_time(frame)
    }

    pub fn current_frame(&self) -> i64 {
        self.playback.current_frame()
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Persist the current timeline.
    pub fn save(&self, store: &mut dyn TimelineStore) -> EditResult<()> {
        store.save(&self.timeline)?;
        info!(timeline = %self.timeline.id, clips = self.timeline.clip_count(), "Saved timeline");
        Ok(())
    }

    /// Replace the timeline with the stored one. Clears history and
    /// selection and parks the playhead at zero.
    pub fn load(&mut self, store: &mut dyn TimelineStore) -> EditResult<()> {
        let file = store.load()?;
        let mut timeline = file.into_timeline(self.config.min_duration)?;
        let selection = Selection::new();
        selection.publish(&mut timeline);

        self.timeline = timeline;
        self.selection = selection;
        self.history.clear();
        self.playback.set_frame_rate(self.timeline.frame_rate);
        self.playback.set_duration(self.timeline.duration());
        self.playback.rewind();
        info!(
            timeline = %self.timeline.id,
            tracks = self.timeline.track_count(),
            clips = self.timeline.clip_count(),
            "Loaded timeline"
        );

        self.emit(vec![
            EngineEvent::TimelineChanged {
                duration: self.timeline.duration(),
            },
            self.selection_event(),
            EngineEvent::PlaybackChanged(self.playback.state().clone()),
            EngineEvent::HistoryChanged(self.history.state()),
        ]);
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

fn unexpected(outcome: EditOutcome) -> EditError {
    EditError::State(format!("unexpected edit outcome {:?}", outcome))
}
