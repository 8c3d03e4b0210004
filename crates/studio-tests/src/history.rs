//! Integration tests for undo/redo through the engine.

use studio_core::RationalTime;
use studio_timeline::{EditError, Engine, EngineConfig, EngineEvent, TrackKind};

use crate::support::{add_video, engine, init_tracing, secs, track};

#[test]
fn five_adds_then_five_undos_restore_empty_track() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let initial = engine.timeline().clone();

    for i in 0..5 {
        add_video(&mut engine, t, i * 3, 2);
    }
    assert_eq!(engine.timeline().track(t).unwrap().clip_count(), 5);

    for _ in 0..5 {
        engine.undo().unwrap();
    }
    assert!(engine.timeline().track(t).unwrap().is_empty());
    assert_eq!(engine.timeline(), &initial);
    assert!(!engine.can_undo());
    assert!(engine.can_redo());
}

#[test]
fn undo_then_redo_reproduces_each_operation() {
    let mut engine = engine();
    let v1 = track(&engine, TrackKind::Video, 0);
    let v2 = track(&engine, TrackKind::Video, 1);
    let a = add_video(&mut engine, v1, 0, 12);

    let mut states = vec![engine.timeline().clone()];
    engine.trim_clip(a, secs(1), secs(11)).unwrap();
    states.push(engine.timeline().clone());
    let b = engine.split_clip(a, secs(4)).unwrap();
    states.push(engine.timeline().clone());
    engine.move_clip(b, secs(30), Some(v2)).unwrap();
    states.push(engine.timeline().clone());
    engine.remove_clip(a).unwrap();
    states.push(engine.timeline().clone());

    for expected in states.iter().rev().skip(1) {
        engine.undo().unwrap();
        assert_eq!(engine.timeline(), expected);
    }
    for expected in states.iter().skip(1) {
        engine.redo().unwrap();
        assert_eq!(engine.timeline(), expected);
    }
}

#[test]
fn nothing_to_undo_is_a_state_error() {
    let mut engine = engine();
    let before = engine.timeline().clone();
    assert!(matches!(engine.undo(), Err(EditError::State(_))));
    assert!(matches!(engine.redo(), Err(EditError::State(_))));
    assert_eq!(engine.timeline(), &before);
}

#[test]
fn new_edit_discards_redo() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    add_video(&mut engine, t, 0, 2);
    engine.undo().unwrap();
    assert!(engine.can_redo());

    add_video(&mut engine, t, 5, 2);
    assert!(!engine.can_redo());
    assert_eq!(engine.history_state().len, 1);
}

#[test]
fn history_is_bounded() {
    init_tracing();
    let mut engine = Engine::new(EngineConfig {
        history_limit: 4,
        ..EngineConfig::default()
    })
    .unwrap();
    let t = track(&engine, TrackKind::Video, 0);
    for i in 0..10 {
        add_video(&mut engine, t, i * 2, 1);
    }
    let state = engine.history_state();
    assert_eq!(state.len, 4);
    assert_eq!(state.limit, 4);

    let mut undone = 0;
    while engine.undo().is_ok() {
        undone += 1;
    }
    assert_eq!(undone, 4);
    assert_eq!(engine.timeline().clip_count(), 6);
}

#[test]
fn selection_changes_are_undoable() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 2);
    let b = add_video(&mut engine, t, 4, 2);

    engine.select_clip(a, false).unwrap();
    engine.select_clip(b, true).unwrap();
    assert_eq!(
        engine.history_state().undo_description.as_deref(),
        Some("Select video")
    );

    engine.undo().unwrap();
    assert_eq!(engine.selection().ids(), &[a]);
    assert!(!engine.timeline().clip(b).unwrap().is_selected());
}

#[test]
fn undo_shrinks_duration_and_clamps_playhead() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    add_video(&mut engine, t, 100, 20);
    engine.set_position(secs(110));
    let rx = engine.subscribe();

    engine.undo().unwrap();
    assert_eq!(engine.timeline().duration(), secs(60));
    assert_eq!(engine.playback().position, secs(60));

    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&EngineEvent::TimelineChanged { duration: secs(60) }));
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::PlaybackChanged(p) if p.position == secs(60))));
}

#[test]
fn history_descriptions_name_the_clip() {
    let mut engine = engine();
    let t = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, t, 0, 8);
    engine.split_clip(a, RationalTime::new(9, 2)).unwrap();

    let state = engine.history_state();
    assert_eq!(state.undo_description.as_deref(), Some("Split clip video"));
    assert_eq!(state.current_index, Some(1));
}
