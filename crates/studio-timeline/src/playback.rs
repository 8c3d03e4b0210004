//! Transport state: playhead, speed, loop and monitor volume.

use serde::{Deserialize, Serialize};
use studio_core::{FrameRate, RationalTime};

use crate::error::{EditError, EditResult};

/// Observable transport state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub position: RationalTime,
    pub playing: bool,
    pub speed: f64,
    pub looping: bool,
    /// Monitor volume, 0.0..=1.0.
    pub volume: f32,
    pub muted: bool,
    pub in_point: Option<RationalTime>,
    pub out_point: Option<RationalTime>,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            position: RationalTime::ZERO,
            playing: false,
            speed: 1.0,
            looping: false,
            volume: 1.0,
            muted: false,
            in_point: None,
            out_point: None,
        }
    }
}

/// Playhead bookkeeping against a timeline of known duration.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    state: PlaybackState,
    duration: RationalTime,
    frame_rate: FrameRate,
    min_speed: f64,
    max_speed: f64,
}

impl PlaybackClock {
    pub fn new(frame_rate: FrameRate, duration: RationalTime, min_speed: f64, max_speed: f64) -> Self {
        Self {
            state: PlaybackState::default(),
            duration: duration.max(RationalTime::ZERO),
            frame_rate,
            min_speed,
            max_speed,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn position(&self) -> RationalTime {
        self.state.position
    }

    pub fn is_playing(&self) -> bool {
        self.state.playing
    }

    pub fn duration(&self) -> RationalTime {
        self.duration
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.frame_rate
    }

    /// Move the playhead, clamped to `[0, duration]`. Returns the new position.
    pub fn set_position(&mut self, position: RationalTime) -> RationalTime {
        self.state.position = position.clamp_to(RationalTime::ZERO, self.duration);
        self.state.position
    }

    /// Flip between playing and paused. Returns the new playing flag.
    pub fn toggle(&mut self) -> bool {
        if self.state.playing {
            self.pause();
        } else {
            self.play();
        }
        self.state.playing
    }

    /// Start playing. A playhead parked at the end of the active range
    /// rewinds to its start first.
    pub fn play(&mut self) {
        let (start, end) = self.active_range();
        if self.state.position >= end {
            self.state.position = start;
        }
        self.state.playing = true;
    }

    pub fn pause(&mut self) {
        self.state.playing = false;
    }

    /// Set the speed factor clamped to the configured range. Non-finite
    /// input is ignored. Returns the speed in effect.
    pub fn set_speed(&mut self, speed: f64) -> f64 {
        if speed.is_finite() {
            self.state.speed = speed.clamp(self.min_speed, self.max_speed);
        }
        self.state.speed
    }

    pub fn set_loop(&mut self, looping: bool) {
        self.state.looping = looping;
    }

    /// Monitor volume clamped to `[0, 1]`; NaN is ignored.
    pub fn set_volume(&mut self, volume: f32) -> f32 {
        if !volume.is_nan() {
            self.state.volume = volume.clamp(0.0, 1.0);
        }
        self.state.volume
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.state.muted = muted;
    }

    /// Set or clear the range start. Must stay before the out point.
    pub fn set_in_point(&mut self, point: Option<RationalTime>) -> EditResult<()> {
        let point = point.map(|t| t.clamp_to(RationalTime::ZERO, self.duration));
        if let (Some(i), Some(o)) = (point, self.state.out_point) {
            if i >= o {
                return Err(EditError::validation(format!(
                    "in point {} must be before out point {}",
                    i, o
                )));
            }
        }
        self.state.in_point = point;
        Ok(())
    }

    /// Set or clear the range end. Must stay after the in point.
    pub fn set_out_point(&mut self, point: Option<RationalTime>) -> EditResult<()> {
        let point = point.map(|t| t.clamp_to(RationalTime::ZERO, self.duration));
        if let (Some(i), Some(o)) = (self.state.in_point, point) {
            if i >= o {
                return Err(EditError::validation(format!(
                    "out point {} must be after in point {}",
                    o, i
                )));
            }
        }
        self.state.out_point = point;
        Ok(())
    }

    pub fn clear_range(&mut self) {
        self.state.in_point = None;
        self.state.out_point = None;
    }

    /// `[in, out]`, defaulting to the whole timeline.
    pub fn active_range(&self) -> (RationalTime, RationalTime) {
        (
            self.state.in_point.unwrap_or(RationalTime::ZERO),
            self.state.out_point.unwrap_or(self.duration),
        )
    }

    /// Move by whole frames from the current frame, clamped to the timeline.
    pub fn step_frames(&mut self, frames: i64) -> RationalTime {
        let last = self.time_to_frame(self.duration);
        let target = self.current_frame().saturating_add(frames).clamp(0, last);
        self.set_position(self.frame_to_time(target))
    }

    /// Advance a playing clock by `elapsed` wall time scaled by speed.
    ///
    /// Past the end of the active range the playhead wraps to the range
    /// start when looping; otherwise it parks at the end and stops. Returns
    /// whether the state changed.
    pub fn advance(&mut self, elapsed: RationalTime) -> bool {
        if !self.state.playing || !elapsed.is_positive() {
            return false;
        }
        let before = self.state.clone();
        let (start, end) = self.active_range();
        let target = self.state.position + elapsed.mul_f64(self.state.speed);

        if target < end {
            self.state.position = target;
        } else if self.state.looping && end > start {
            self.state.position = start + (target - start).rem_euclid(end - start);
        } else {
            self.state.position = end;
            self.state.playing = false;
        }
        self.state != before
    }

    /// `round(time * fps)`.
    pub fn time_to_frame(&self, time: RationalTime) -> i64 {
        time.to_frames_rounded(self.frame_rate)
    }

    /// `frame / fps`.
    pub fn frame_to_time(&self, frame: i64) -> RationalTime {
        RationalTime::from_frames(frame, self.frame_rate)
    }

    pub fn current_frame(&self) -> i64 {
        self.time_to_frame(self.state.position)
    }

    /// Follow a timeline length change, re-clamping the playhead and range.
    pub fn set_duration(&mut self, duration: RationalTime) {
        self.duration = duration.max(RationalTime::ZERO);
        let clamp = |t: RationalTime| t.clamp_to(RationalTime::ZERO, duration);
        self.state.position = clamp(self.state.position);
        self.state.in_point = self.state.in_point.map(clamp);
        self.state.out_point = self.state.out_point.map(clamp);
        if let (Some(i), Some(o)) = (self.state.in_point, self.state.out_point) {
            if i >= o {
                self.clear_range();
            }
        }
    }

    pub fn set_frame_rate(&mut self, frame_rate: FrameRate) {
        self.frame_rate = frame_rate;
    }

    /// Stop and park at zero with no range, keeping speed, loop and volume.
    pub fn rewind(&mut self) {
        self.state.playing = false;
        self.state.position = RationalTime::ZERO;
        self.clear_range();
    }
}
