//! Keyframe schedule
//!
//! A list of timestamps, each marking whether the animated value sits at the
//! bottom or the top of its range at that moment. Between keyframes the value
//! travels linearly from the current keyframe's end to the next one's.

use serde::{Deserialize, Serialize};

use super::AnimationError;
use crate::foundation::math::utils;

/// End of the range a keyframe pins the value to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyframeAction {
    /// Bottom of the range
    Bottom,
    /// Top of the range
    Top,
}

/// One entry of a [`KeyframeSchedule`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    /// Game time in seconds
    pub timestamp: f64,
    /// Where the value is at `timestamp`
    pub action: KeyframeAction,
}

impl Keyframe {
    /// Create a keyframe
    pub fn new(timestamp: f64, action: KeyframeAction) -> Self {
        Self { timestamp, action }
    }
}

/// Ordered keyframes with a playback cursor
///
/// The cursor only moves forward, to the last keyframe whose timestamp is not
/// after the current time, until [`reset`](Self::reset).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeSchedule {
    keyframes: Vec<Keyframe>,
    current: usize,
}

impl KeyframeSchedule {
    /// Create a schedule; timestamps must be finite and strictly increasing
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self, AnimationError> {
        for (index, keyframe) in keyframes.iter().enumerate() {
            if !keyframe.timestamp.is_finite() {
                return Err(AnimationError::InvalidTimestamp {
                    index,
                    timestamp: keyframe.timestamp,
                });
            }
            if index > 0 && keyframe.timestamp <= keyframes[index - 1].timestamp {
                return Err(AnimationError::UnorderedKeyframes {
                    index,
                    timestamp: keyframe.timestamp,
                    previous: keyframes[index - 1].timestamp,
                });
            }
        }

        Ok(Self { keyframes, current: 0 })
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Whether the schedule has no keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// The keyframes in order
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Index of the keyframe the cursor is on
    pub fn current_index(&self) -> Option<usize> {
        (!self.keyframes.is_empty()).then_some(self.current)
    }

    /// Move the cursor up to `time`; returns whether it moved
    pub fn advance(&mut self, time: f64) -> bool {
        let previous = self.current;
        while self.current + 1 < self.keyframes.len() && self.keyframes[self.current + 1].timestamp <= time {
            self.current += 1;
        }
        self.current != previous
    }

    /// Rewind the cursor to the first keyframe
    pub fn reset(&mut self) {
        self.current = 0;
    }

    /// Progress from the current keyframe to the next, in [0, 1]
    ///
    /// Zero past the last keyframe or on an empty schedule.
    pub fn fraction(&self, time: f64) -> f64 {
        match (self.keyframes.get(self.current), self.keyframes.get(self.current + 1)) {
            (Some(start), Some(end)) => {
                ((time - start.timestamp) / (end.timestamp - start.timestamp)).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Value between `bottom` and `top` at `time`
    ///
    /// The last keyframe holds its end of the range. An empty schedule sits
    /// at the bottom.
    #[allow(clippy::cast_possible_truncation)]
    pub fn interpolate(&self, time: f64, bottom: f32, top: f32) -> f32 {
        let Some(origin) = self.keyframes.get(self.current).map(|k| k.action) else {
            return bottom;
        };
        let destination = self
            .keyframes
            .get(self.current + 1)
            .map_or(origin, |k| k.action);
        let fraction = self.fraction(time) as f32;

        match (origin, destination) {
            (KeyframeAction::Bottom, KeyframeAction::Bottom) => bottom,
            (KeyframeAction::Top, KeyframeAction::Top) => top,
            (KeyframeAction::Top, KeyframeAction::Bottom) => utils::lerp(bottom, top, 1.0 - fraction),
            (KeyframeAction::Bottom, KeyframeAction::Top) => utils::lerp(bottom, top, fraction),
        }
    }
}
