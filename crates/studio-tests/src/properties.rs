//! Property tests: structural invariants hold under arbitrary edit sequences.

use proptest::prelude::*;
use studio_core::RationalTime;
use studio_timeline::{duration, Engine, TrackKind};
use uuid::Uuid;

use crate::support::{engine, secs, track, video};

#[derive(Debug, Clone)]
enum Op {
    Add { track: usize, start: i64, len: i64 },
    Move { clip: usize, track: usize, start: i64 },
    Trim { clip: usize, cut_in: i64, cut_out: i64 },
    Split { clip: usize, tenths: i64 },
    Remove { clip: usize },
    Undo,
    Redo,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..2usize, 0..60i64, 1..15i64).prop_map(|(track, start, len)| Op::Add { track, start, len }),
        2 => (0..16usize, 0..2usize, -5..60i64).prop_map(|(clip, track, start)| Op::Move { clip, track, start }),
        2 => (0..16usize, -2..6i64, 0..8i64).prop_map(|(clip, cut_in, cut_out)| Op::Trim { clip, cut_in, cut_out }),
        2 => (0..16usize, 1..10i64).prop_map(|(clip, tenths)| Op::Split { clip, tenths }),
        1 => (0..16usize).prop_map(|clip| Op::Remove { clip }),
        1 => Just(Op::Undo),
        1 => Just(Op::Redo),
    ]
}

fn nth_clip(engine: &Engine, n: usize) -> Option<Uuid> {
    let ids: Vec<Uuid> = engine.timeline().clips().map(|c| c.id).collect();
    if ids.is_empty() {
        None
    } else {
        Some(ids[n % ids.len()])
    }
}

/// Apply `op`; rejections are expected and ignored.
fn apply(engine: &mut Engine, op: &Op) {
    let tracks = [
        track(engine, TrackKind::Video, 0),
        track(engine, TrackKind::Video, 1),
    ];
    match *op {
        Op::Add { track, start, len } => {
            let _ = engine.add_clip_from_resource(&video(len), tracks[track], secs(start));
        }
        Op::Move { clip, track, start } => {
            if let Some(id) = nth_clip(engine, clip) {
                let _ = engine.move_clip(id, secs(start), Some(tracks[track]));
            }
        }
        Op::Trim { clip, cut_in, cut_out } => {
            if let Some(id) = nth_clip(engine, clip) {
                let c = engine.timeline().clip(id).unwrap();
                let (i, o) = (c.source_in() + secs(cut_in), c.source_out() - secs(cut_out));
                let _ = engine.trim_clip(id, i, o);
            }
        }
        Op::Split { clip, tenths } => {
            if let Some(id) = nth_clip(engine, clip) {
                let c = engine.timeline().clip(id).unwrap();
                let at = c.start() + c.duration() * tenths / 10;
                let _ = engine.split_clip(id, at);
            }
        }
        Op::Remove { clip } => {
            if let Some(id) = nth_clip(engine, clip) {
                let _ = engine.remove_clip(id);
            }
        }
        Op::Undo => {
            let _ = engine.undo();
        }
        Op::Redo => {
            let _ = engine.redo();
        }
    }
}

fn assert_invariants(engine: &Engine) {
    let timeline = engine.timeline();
    assert!(timeline.check_invariants().is_ok());
    for track in timeline.tracks() {
        for pair in track.clips().windows(2) {
            assert!(pair[0].end() <= pair[1].start());
        }
    }
    let expected = duration::content_end(timeline).max(engine.config().min_duration);
    assert_eq!(timeline.duration(), expected);
    assert!(engine.playback().position <= timeline.duration());
    for clip in timeline.clips() {
        assert!(clip.duration() > RationalTime::ZERO);
        assert_eq!(clip.duration(), clip.source_out() - clip.source_in());
        assert_eq!(clip.is_selected(), engine.selection().contains(clip.id));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_after_every_operation(ops in prop::collection::vec(op(), 1..40)) {
        let mut engine = engine();
        for op in &ops {
            apply(&mut engine, op);
            assert_invariants(&engine);
        }
    }

    #[test]
    fn undoing_everything_restores_the_start(ops in prop::collection::vec(op(), 1..25)) {
        let mut engine = engine();
        let initial = engine.timeline().clone();
        for op in ops.iter().filter(|op| !matches!(op, Op::Undo | Op::Redo)) {
            apply(&mut engine, op);
        }
        while engine.undo().is_ok() {}
        prop_assert_eq!(engine.timeline(), &initial);
    }

    #[test]
    fn split_conserves_duration(len in 2..40i64, tenths in 1..10i64) {
        let mut engine = engine();
        let t = track(&engine, TrackKind::Video, 0);
        let id = engine.add_clip_from_resource(&video(len), t, secs(3)).unwrap().clip_id;
        let before = engine.timeline().clip(id).unwrap().duration();
        let at = secs(3) + before * tenths / 10;

        let created = engine.split_clip(id, at).unwrap();
        let left = engine.timeline().clip(id).unwrap().duration();
        let right = engine.timeline().clip(created).unwrap().duration();
        prop_assert_eq!(left + right, before);
    }
}
