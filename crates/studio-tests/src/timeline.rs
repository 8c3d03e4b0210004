//! Integration tests for timeline editing.
//!
//! Exercises studio-core time values flowing through studio-timeline's
//! engine, track store and edit operations.

use studio_core::{EasingCurve, RationalTime};
use studio_timeline::{
    Clip, ClipContent, ClipKind, EditCommand, EditError, Effect, EffectType, EngineEvent,
    EntityKind, Marker, MarkerKind, MediaKind, ParamValue, Resource, TrackKind, TrackUpdate,
};
use uuid::Uuid;

use crate::support::{add_video, engine, secs, track, video};

// ── Placement ──────────────────────────────────────────────────

#[test]
fn push_right_places_second_clip_after_first() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 10);
    let placement = engine.add_clip_from_resource(&video(10), t, secs(5)).unwrap();

    assert!(placement.was_relocated());
    assert_eq!(placement.start, secs(10));
    let clips = engine.timeline().track(t).unwrap().clips();
    assert_eq!(clips.len(), 2);
    assert_eq!(clips[0].id, a);
    assert_eq!(clips[1].id, placement.clip_id);
}

#[test]
fn push_right_skips_a_run_of_clips() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    add_video(&mut engine, t, 0, 5);
    add_video(&mut engine, t, 5, 5);
    add_video(&mut engine, t, 12, 5);

    // [0,5) and [5,10) collide; the 2s gap [10,12) fits exactly.
    let placement = engine.add_clip_from_resource(&video(2), t, secs(3)).unwrap();
    assert_eq!(placement.start, secs(10));
    assert!(engine.timeline().check_invariants().is_ok());
}

#[test]
fn clip_content_follows_resource_kind() {
    let mut engine = engine();
    let audio = track(&engine, TrackKind::Audio, 0);
    let music = Resource::new("music", MediaKind::Audio, 30.0);
    let id = engine
        .add_clip_from_resource(&music, audio, RationalTime::ZERO)
        .unwrap()
        .clip_id;
    assert!(matches!(
        engine.timeline().clip(id).unwrap().content,
        ClipContent::Audio { .. }
    ));
}

#[test]
fn title_over_still_image() {
    let mut engine = engine();
    let v1 = track(&engine, TrackKind::Video, 0);
    let overlay = engine.add_track(TrackKind::Overlay).unwrap();

    let still = Resource::still_image("poster", 1920, 1080);
    let poster = engine
        .add_clip_from_resource(&still, v1, secs(2))
        .unwrap()
        .clip_id;
    let title = Clip::from_resource(&still, secs(2))
        .with_name("Opening title")
        .with_content(ClipContent::text("Chapter One"));
    let title = engine.add_clip(title, overlay).unwrap().clip_id;

    let timeline = engine.timeline();
    let poster = timeline.clip(poster).unwrap();
    assert_eq!(poster.kind(), ClipKind::Image);
    assert_eq!(poster.duration(), secs(5));
    let title = timeline.clip(title).unwrap();
    assert!(matches!(&title.content, ClipContent::Text { text, .. } if text == "Chapter One"));
    assert_eq!(title.end(), poster.end());
}

#[test]
fn zero_length_resource_is_rejected() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let empty = Resource::new("empty", MediaKind::Video, 0.0);
    assert!(matches!(
        engine.add_clip_from_resource(&empty, t, RationalTime::ZERO),
        Err(EditError::Validation(_))
    ));
    assert!(!engine.can_undo());
}

// ── Move / trim / split ────────────────────────────────────────

#[test]
fn move_to_locked_track_leaves_clip_in_place() {
    let mut engine = engine();
    let v1 = track(&engine, TrackKind::Video, 0);
    let v2 = track(&engine, TrackKind::Video, 1);
    let a = add_video(&mut engine, v1, 7, 3);
    engine.set_track_flags(v2, TrackUpdate::locked(true)).unwrap();
    let history = engine.history_state();

    let result = engine.move_clip(a, secs(0), Some(v2));
    assert!(matches!(result, Err(EditError::Locked { track_id }) if track_id == v2));

    let clip = engine.timeline().clip(a).unwrap();
    assert_eq!(clip.track_id(), v1);
    assert_eq!(clip.start(), secs(7));
    assert_eq!(engine.history_state(), history);
}

#[test]
fn move_within_track_collides_with_neighbour() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 4);
    let b = add_video(&mut engine, t, 10, 4);

    let placement = engine.move_clip(b, secs(2), None).unwrap();
    assert_eq!(placement.requested_start, secs(2));
    assert_eq!(placement.start, secs(4));
    let order: Vec<_> = engine.timeline().track(t).unwrap().clips().iter().map(|c| c.id).collect();
    assert_eq!(order, vec![a, b]);
}

#[test]
fn trim_with_current_bounds_is_a_no_op() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 10);
    engine.trim_clip(a, secs(1), secs(9)).unwrap();
    let before = engine.timeline().clone();

    let clip = engine.timeline().clip(a).unwrap();
    let (i, o) = (clip.source_in(), clip.source_out());
    engine.trim_clip(a, i, o).unwrap();
    assert_eq!(engine.timeline(), &before);
}

#[test]
fn split_conserves_duration_and_source() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 3, 10);
    engine.trim_clip(a, secs(2), secs(10)).unwrap();
    let total = engine.timeline().clip(a).unwrap().duration();

    let at = RationalTime::new(15, 2);
    let b = engine.split_clip(a, at).unwrap();

    let left = engine.timeline().clip(a).unwrap();
    let right = engine.timeline().clip(b).unwrap();
    assert_eq!(left.duration() + right.duration(), total);
    assert_eq!(left.end(), right.start());
    assert_eq!(left.source_out(), right.source_in());
    assert_eq!(right.source_out(), secs(10));
}

#[test]
fn split_copies_effects_with_fresh_ids() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 10);
    let fx = engine.add_effect(a, Effect::new(EffectType::Blur)).unwrap();

    let b = engine.split_clip(a, secs(5)).unwrap();
    let right = engine.timeline().clip(b).unwrap();
    assert_eq!(right.effects.len(), 1);
    assert_ne!(right.effects[0].id, fx);
    assert_eq!(right.effects[0].effect_type, EffectType::Blur);
}

#[test]
fn split_divides_keyframes_at_the_cut() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 10);
    engine
        .set_keyframe(a, "opacity", secs(0), 0.0, EasingCurve::Linear)
        .unwrap();
    engine
        .set_keyframe(a, "opacity", secs(10), 1.0, EasingCurve::Linear)
        .unwrap();

    let b = engine.split_clip(a, secs(4)).unwrap();
    let left = engine.timeline().clip(a).unwrap().keyframe_track("opacity").unwrap();
    let right = engine.timeline().clip(b).unwrap().keyframe_track("opacity").unwrap();
    assert!((left.evaluate(secs(4)) - 0.4).abs() < 1e-9);
    assert!((right.evaluate(secs(0)) - 0.4).abs() < 1e-9);
    assert!((right.evaluate(secs(6)) - 1.0).abs() < 1e-9);
}

// ── Effects, keyframes, markers ────────────────────────────────

#[test]
fn effect_parameters_are_validated() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 10);
    let fx = engine.add_effect(a, Effect::new(EffectType::ChromaKey)).unwrap();

    engine
        .set_effect_parameter(a, fx, "key_color", ParamValue::Color("#0000ff".into()))
        .unwrap();
    assert!(engine
        .set_effect_parameter(a, fx, "key_color", ParamValue::Color("blue".into()))
        .is_err());
    assert!(engine
        .set_effect_parameter(a, fx, "tolerance", ParamValue::Boolean(true))
        .is_err());

    let effect = engine.timeline().clip(a).unwrap().effect(fx).unwrap();
    assert_eq!(
        effect.parameter("key_color").unwrap().value,
        ParamValue::Color("#0000ff".into())
    );
}

#[test]
fn locked_track_rejects_effect_edits() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 10);
    engine.set_track_flags(t, TrackUpdate::locked(true)).unwrap();

    assert!(matches!(
        engine.add_effect(a, Effect::new(EffectType::Sharpen)),
        Err(EditError::Locked { .. })
    ));
    assert!(matches!(
        engine.set_keyframe(a, "opacity", secs(1), 0.5, EasingCurve::Linear),
        Err(EditError::Locked { .. })
    ));
    // Removing the whole track is still allowed.
    engine.remove_track(t).unwrap();
    assert!(engine.timeline().clip(a).is_none());
}

#[test]
fn missing_keyframe_reports_not_found() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 10);
    assert!(matches!(
        engine.remove_keyframe(a, "scale", secs(1)),
        Err(EditError::NotFound { kind: EntityKind::Keyframe, .. })
    ));
}

#[test]
fn markers_are_kept_in_time_order() {
    let mut engine = engine();
    engine
        .add_marker(Marker::new(secs(20), "outro", MarkerKind::Chapter))
        .unwrap();
    let intro = engine
        .add_marker(Marker::new(secs(2), "intro", MarkerKind::Chapter))
        .unwrap();
    let names: Vec<_> = engine.timeline().markers().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["intro", "outro"]);

    engine.remove_marker(intro).unwrap();
    assert_eq!(engine.timeline().markers().len(), 1);
}

// ── Tracks & selection ─────────────────────────────────────────

#[test]
fn new_tracks_get_numbered_names() {
    let mut engine = engine();
    let id = engine.add_track(TrackKind::Video).unwrap();
    let sub = engine.add_track(TrackKind::Subtitle).unwrap();
    let timeline = engine.timeline();
    assert_eq!(timeline.track(id).unwrap().name, "Video 3");
    assert_eq!(timeline.track(id).unwrap().index, 3);
    assert_eq!(timeline.track(sub).unwrap().name, "Subtitle 1");
    assert_eq!(timeline.track(sub).unwrap().height, 60);
}

#[test]
fn select_clips_filters_unknown_ids() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 2);
    let kept = engine.select_clips(&[Uuid::new_v4(), a]);
    assert_eq!(kept, 1);
    assert_eq!(engine.selection().ids(), &[a]);
}

#[test]
fn removing_selected_clip_emits_selection_change() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 2);
    engine.select_clip(a, false).unwrap();
    let rx = engine.subscribe();

    engine.remove_clip(a).unwrap();
    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&EngineEvent::ClipRemoved { clip_id: a }));
    assert!(events.contains(&EngineEvent::SelectionChanged { selected: vec![] }));
}

// ── Batches ────────────────────────────────────────────────────

#[test]
fn batch_executes_as_one_history_step() {
    let mut engine = engine();
    let v1 = track(&engine, TrackKind::Video, 0);
    let v2 = track(&engine, TrackKind::Video, 1);
    let a = add_video(&mut engine, v1, 0, 10);
    let steps = engine.history_state().len;

    engine
        .execute(EditCommand::Batch(vec![
            EditCommand::SplitClip { clip_id: a, at: secs(5) },
            EditCommand::MoveClip { clip_id: a, start: secs(20), track_id: Some(v2) },
        ]))
        .unwrap();
    assert_eq!(engine.history_state().len, steps + 1);
    assert_eq!(engine.timeline().clip(a).unwrap().track_id(), v2);
    assert_eq!(engine.timeline().clip_count(), 2);

    engine.undo().unwrap();
    assert_eq!(engine.timeline().clip_count(), 1);
    assert_eq!(engine.timeline().clip(a).unwrap().track_id(), v1);
}
