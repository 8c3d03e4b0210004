//! Timeline length derived from clip extents.

use studio_core::RationalTime;

use crate::timeline::Timeline;

/// Latest clip end across all tracks, zero for an empty timeline.
pub fn content_end(timeline: &Timeline) -> RationalTime {
    timeline
        .tracks()
        .map(|t| t.end())
        .max()
        .unwrap_or(RationalTime::ZERO)
}

/// `max(content_end, minimum)`.
pub fn timeline_duration(timeline: &Timeline, minimum: RationalTime) -> RationalTime {
    content_end(timeline).max(minimum)
}

/// Recompute and store the timeline duration. Returns whether it changed.
pub fn republish(timeline: &mut Timeline, minimum: RationalTime) -> bool {
    let duration = timeline_duration(timeline, minimum);
    let changed = duration != timeline.duration();
    timeline.set_duration(duration);
    changed
}
