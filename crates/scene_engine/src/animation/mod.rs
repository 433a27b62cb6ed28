//! # Animation and Timing
//!
//! Everything that changes the scene between frames: the game clock and its
//! state machine, the keyframe schedule, the camera rig and per-node motions.
//! [`AnimationDriver`] runs them in order once per frame, before the scene is
//! propagated.

pub mod camera;
pub mod driver;
pub mod game_state;
pub mod keyframes;
pub mod motion;

pub use camera::{CameraFrame, CameraRig};
pub use driver::{AnimationDriver, FrameState};
pub use game_state::{GameClock, GameState, StateTransition};
pub use keyframes::{Keyframe, KeyframeAction, KeyframeSchedule};
pub use motion::{Motion, MotionClocks};

use thiserror::Error;

/// Errors raised while setting up animation data
#[derive(Debug, Error, PartialEq)]
pub enum AnimationError {
    /// A keyframe timestamp is NaN or infinite
    #[error("Keyframe {index} has a non-finite timestamp {timestamp}")]
    InvalidTimestamp {
        /// Position in the schedule
        index: usize,
        /// Offending value
        timestamp: f64,
    },

    /// Keyframe timestamps do not strictly increase
    #[error("Keyframe {index} at {timestamp}s does not come after {previous}s")]
    UnorderedKeyframes {
        /// Position in the schedule
        index: usize,
        /// Offending value
        timestamp: f64,
        /// Timestamp of the keyframe before it
        previous: f64,
    },
}
