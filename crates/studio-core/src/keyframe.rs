//! Keyframe tracks for animated clip properties and effect parameters.
//!
//! Keyframe times are relative to the start of the owning clip. Easing uses
//! cubic Bézier curves solved with Newton-Raphson so that the curve's X axis
//! maps onto normalized time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::time::{RationalTime, TimeRange};

// ── Easing curves ───────────────────────────────────────────────

/// Cubic Bézier control points (x1, y1, x2, y2) of a curve from (0,0) to (1,1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl CubicBezier {
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    fn sample(t: f64, p1: f64, p2: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
    }

    fn sample_dx(&self, t: f64) -> f64 {
        let mt = 1.0 - t;
        3.0 * mt * mt * self.x1 + 6.0 * mt * t * (self.x2 - self.x1) + 3.0 * t * t * (1.0 - self.x2)
    }

    /// Eased progress for normalized time `x` in `[0, 1]`.
    pub fn evaluate(&self, x: f64) -> f64 {
        if x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }

        let mut t = x;
        for _ in 0..8 {
            let err = Self::sample(t, self.x1, self.x2) - x;
            if err.abs() < 1e-10 {
                break;
            }
            let dx = self.sample_dx(t);
            if dx.abs() < 1e-12 {
                break;
            }
            t = (t - err / dx).clamp(0.0, 1.0);
        }

        Self::sample(t, self.y1, self.y2)
    }

    pub const LINEAR: Self = Self::new(0.0, 0.0, 1.0, 1.0);
    pub const EASE: Self = Self::new(0.25, 0.1, 0.25, 1.0);
    pub const EASE_IN: Self = Self::new(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: Self = Self::new(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: Self = Self::new(0.42, 0.0, 0.58, 1.0);
}

/// How to interpolate from one keyframe to the next.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingCurve {
    /// Step: hold the value until the next keyframe.
    Hold,
    #[default]
    Linear,
    Bezier(CubicBezier),
}

impl EasingCurve {
    /// Resolve a CSS-style easing name (`"ease-in-out"`, `"step"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let curve = match name {
            "linear" => Self::Linear,
            "step" | "hold" => Self::Hold,
            "ease" | "smooth" => Self::Bezier(CubicBezier::EASE),
            "ease-in" => Self::Bezier(CubicBezier::EASE_IN),
            "ease-out" => Self::Bezier(CubicBezier::EASE_OUT),
            "ease-in-out" => Self::Bezier(CubicBezier::EASE_IN_OUT),
            _ => return None,
        };
        Some(curve)
    }
}

// ── Keyframe ────────────────────────────────────────────────────

/// A single keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub time: RationalTime,
    pub value: f64,
    /// Curve used when interpolating towards the next keyframe.
    pub easing: EasingCurve,
}

impl Keyframe {
    pub fn new(time: RationalTime, value: f64, easing: EasingCurve) -> Self {
        Self {
            time,
            value,
            easing,
        }
    }
}

// ── Keyframe track ──────────────────────────────────────────────

/// Keyframes for a single animated property, kept sorted by time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframeTrack {
    /// Property or parameter name this track animates.
    pub name: String,
    keyframes: Vec<Keyframe>,
}

impl KeyframeTrack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyframes: Vec::new(),
        }
    }

    /// Insert or update the keyframe at `time`.
    pub fn set(&mut self, time: RationalTime, value: f64, easing: EasingCurve) {
        match self.keyframes.binary_search_by(|kf| kf.time.cmp(&time)) {
            Ok(pos) => {
                let kf = &mut self.keyframes[pos];
                kf.value = value;
                kf.easing = easing;
            }
            Err(pos) => self
                .keyframes
                .insert(pos, Keyframe::new(time, value, easing)),
        }
    }

    /// Remove the keyframe at exactly `time`. Returns whether one existed.
    pub fn remove(&mut self, time: RationalTime) -> bool {
        match self.keyframes.binary_search_by(|kf| kf.time.cmp(&time)) {
            Ok(pos) => {
                self.keyframes.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    /// Value at `time`; clamps to the first/last keyframe outside the span.
    pub fn evaluate(&self, time: RationalTime) -> f64 {
        let (first, last) = match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }
        let idx = self.keyframes.partition_point(|kf| kf.time <= time) - 1;
        Self::interpolate(&self.keyframes[idx], &self.keyframes[idx + 1], time)
    }

    fn interpolate(a: &Keyframe, b: &Keyframe, time: RationalTime) -> f64 {
        let t_start = a.time.to_seconds_f64();
        let span = b.time.to_seconds_f64() - t_start;
        if span <= 0.0 {
            return a.value;
        }
        let t = ((time.to_seconds_f64() - t_start) / span).clamp(0.0, 1.0);

        match a.easing {
            EasingCurve::Hold => a.value,
            EasingCurve::Linear => a.value + (b.value - a.value) * t,
            EasingCurve::Bezier(bezier) => a.value + (b.value - a.value) * bezier.evaluate(t),
        }
    }

    /// Cut the track at `offset`. `self` keeps `[.., offset]`, the returned
    /// track holds `[offset, ..]` re-based so that `offset` becomes zero.
    /// A keyframe is written on both sides of the cut when the track is
    /// animated across it, so neither half changes its curve.
    pub fn split_at(&mut self, offset: RationalTime) -> KeyframeTrack {
        let mut right = KeyframeTrack::new(self.name.clone());
        if self.keyframes.is_empty() {
            return right;
        }

        let boundary = self.evaluate(offset);
        let boundary_easing = self
            .keyframes
            .iter()
            .rev()
            .find(|kf| kf.time <= offset)
            .map(|kf| kf.easing)
            .unwrap_or_default();

        right.keyframes = self
            .keyframes
            .iter()
            .filter(|kf| kf.time >= offset)
            .map(|kf| Keyframe::new(kf.time - offset, kf.value, kf.easing))
            .collect();
        if right.keyframes.first().map(|kf| kf.time) != Some(RationalTime::ZERO) {
            right.set(RationalTime::ZERO, boundary, boundary_easing);
        }

        self.keyframes.retain(|kf| kf.time <= offset);
        if self.keyframes.last().map(|kf| kf.time) != Some(offset) {
            self.set(offset, boundary, boundary_easing);
        }

        right
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Span between the first and last keyframe.
    pub fn time_range(&self) -> Option<TimeRange> {
        match (self.keyframes.first(), self.keyframes.last()) {
            (Some(first), Some(last)) => Some(TimeRange::from_start_end(first.time, last.time)),
            _ => None,
        }
    }
}

impl fmt::Display for KeyframeTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "KeyframeTrack({}, {} keyframes)",
            self.name,
            self.keyframes.len()
        )
    }
}

// ── Tests ───────────────────────────────────────────────────────
