//! Clip selection.

use std::sync::Arc;

use smallvec::SmallVec;
use uuid::Uuid;

use crate::timeline::Timeline;

/// Ordered set of selected clip ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: SmallVec<[Uuid; 8]>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-select replaces the selection; multi-select toggles `id`.
    pub fn select(&mut self, id: Uuid, multi: bool) {
        if multi {
            if let Some(index) = self.ids.iter().position(|s| *s == id) {
                self.ids.remove(index);
            } else {
                self.ids.push(id);
            }
        } else {
            self.ids.clear();
            self.ids.push(id);
        }
    }

    /// Replace the selection with `ids`, dropping duplicates.
    pub fn select_many(&mut self, ids: impl IntoIterator<Item = Uuid>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    /// Keep only ids for which `keep` returns true. Returns whether any
    /// were dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(Uuid) -> bool) -> bool {
        let before = self.ids.len();
        self.ids.retain(|id| keep(*id));
        self.ids.len() != before
    }

    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Mirror the selection onto each clip's `selected` flag.
    ///
    /// Only tracks whose flags actually change are copied out of shared
    /// snapshot storage.
    pub fn publish(&self, timeline: &mut Timeline) {
        for track in timeline.tracks_mut() {
            let stale = track
                .clips()
                .iter()
                .any(|c| c.is_selected() != self.contains(c.id));
            if stale {
                for clip in Arc::make_mut(track).clips_mut() {
                    let selected = self.contains(clip.id);
                    clip.set_selected(selected);
                }
            }
        }
    }
}
