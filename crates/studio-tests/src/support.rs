//! Shared fixtures for the integration tests.

use studio_core::RationalTime;
use studio_timeline::{Engine, EngineConfig, MediaKind, Resource, TimelineDefaults, TrackKind};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Install a subscriber honouring `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn secs(n: i64) -> RationalTime {
    RationalTime::from_secs(n)
}

/// Engine with two video tracks and one audio track.
pub fn engine() -> Engine {
    init_tracing();
    Engine::new(EngineConfig {
        timeline: TimelineDefaults {
            name: "Integration".into(),
            video_tracks: 2,
            audio_tracks: 1,
            ..TimelineDefaults::default()
        },
        ..EngineConfig::default()
    })
    .unwrap()
}

/// Id of the `nth` track of `kind`.
pub fn track(engine: &Engine, kind: TrackKind, nth: usize) -> Uuid {
    engine
        .timeline()
        .tracks()
        .filter(|t| t.kind == kind)
        .nth(nth)
        .unwrap()
        .id
}

pub fn video(seconds: i64) -> Resource {
    Resource::new("video", MediaKind::Video, seconds as f64)
}

/// Add a whole-resource video clip and return its id.
pub fn add_video(engine: &mut Engine, track_id: Uuid, start: i64, len: i64) -> Uuid {
    engine
        .add_clip_from_resource(&video(len), track_id, secs(start))
        .unwrap()
        .clip_id
}
