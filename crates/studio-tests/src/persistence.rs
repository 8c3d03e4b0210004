//! Save/load round trips through the persistence collaborators.

use studio_core::StudioError;
use studio_timeline::{
    EditError, Effect, EffectType, Engine, JsonFileStore, MemoryStore, TimelineFile, TimelineStore,
    TrackKind,
};

use crate::support::{add_video, engine, secs, track};

fn edited_engine() -> Engine {
    let mut engine = engine();
    let v1 = track(&engine, TrackKind::Video, 0);
    let a = add_video(&mut engine, v1, 0, 20);
    engine.add_effect(a, Effect::new(EffectType::ColorCorrection)).unwrap();
    engine.split_clip(a, secs(8)).unwrap();
    engine
}

#[test]
fn edited_timeline_survives_memory_roundtrip() -> anyhow::Result<()> {
    let source = edited_engine();
    let mut store = MemoryStore::new();
    source.save(&mut store)?;

    let mut loaded = engine();
    loaded.load(&mut store)?;
    assert_eq!(loaded.timeline(), source.timeline());
    loaded.timeline().check_invariants()?;
    Ok(())
}

#[test]
fn edited_timeline_survives_file_roundtrip() -> anyhow::Result<()> {
    let source = edited_engine();
    let path = std::env::temp_dir().join(format!("studio-it-{}.json", uuid::Uuid::new_v4()));
    let mut store = JsonFileStore::new(&path);
    source.save(&mut store)?;

    let mut loaded = engine();
    loaded.load(&mut store)?;
    assert_eq!(loaded.timeline(), source.timeline());
    std::fs::remove_file(&path)?;
    Ok(())
}

#[test]
fn unversioned_file_is_migrated() -> anyhow::Result<()> {
    let source = edited_engine();
    let bare = serde_json::to_vec(source.timeline())?;
    let mut store = MemoryStore::with_data(bare);

    let mut loaded = engine();
    loaded.load(&mut store)?;
    assert_eq!(loaded.timeline().id, source.timeline().id);
    Ok(())
}

#[test]
fn overlapping_file_is_rejected() -> anyhow::Result<()> {
    let source = edited_engine();
    let file = TimelineFile::new(source.timeline().clone()).to_json()?;
    let mut json: serde_json::Value = serde_json::from_slice(&file)?;
    // Drag the second clip back onto the first.
    let clips = &mut json["timeline"]["tracks"][0]["clips"];
    clips[1]["start"] = clips[0]["start"].clone();
    let mut store = MemoryStore::with_data(serde_json::to_vec(&json)?);

    let mut target = engine();
    let before = target.timeline().clone();
    assert!(matches!(target.load(&mut store), Err(EditError::Validation(_))));
    assert_eq!(target.timeline(), &before);
    Ok(())
}

#[test]
fn future_version_is_rejected() {
    let mut store = MemoryStore::with_data(br#"{"version": 7, "timeline": {}, "app_version": "9"}"#.to_vec());
    assert!(matches!(store.load(), Err(StudioError::Serialization(_))));
}
