//! Studio Core - Foundation types for the timeline engine
//!
//! This crate provides the fundamental types shared by the editing engine:
//! - Time representation (RationalTime, FrameRate, TimeRange)
//! - Keyframe tracks with easing curves
//! - 2D clip transforms
//! - The shared error type

pub mod error;
pub mod geometry;
pub mod keyframe;
pub mod time;

pub use error::{Result, StudioError};
pub use geometry::{ClipTransform, Vec2};
pub use keyframe::{CubicBezier, EasingCurve, Keyframe, KeyframeTrack};
pub use time::{FrameRate, RationalTime, TimeRange};
