//! Time-driven node motions

use serde::{Deserialize, Serialize};

use super::keyframes::KeyframeSchedule;
use crate::foundation::math::{serde_vec3, Vec3};
use crate::scene::node::Transform;

/// Clocks a motion may read
#[derive(Debug, Clone, Copy)]
pub struct MotionClocks<'a> {
    /// Seconds since start, pauses included
    pub total_elapsed: f64,
    /// Seconds spent running
    pub game_elapsed: f64,
    /// Keyframe schedule, already advanced to `game_elapsed`
    pub keyframes: &'a KeyframeSchedule,
}

/// Motion attached to a scene node
///
/// Applied before propagation every frame. A motion owns the transform
/// components it writes and leaves the others alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Constant angular velocity: `rotation = rates * total_elapsed`
    Spin {
        /// Radians per second about X, Y and Z
        #[serde(with = "serde_vec3")]
        rates: Vec3,
    },
    /// Circular path in the XZ plane around `center`
    Orbit {
        /// Circle center; its Y is the node's height
        #[serde(with = "serde_vec3")]
        center: Vec3,
        /// Circle radius
        radius: f32,
        /// Radians per second
        angular_speed: f32,
        /// Angle at time zero
        #[serde(default)]
        phase: f32,
    },
    /// Vertical position driven by the keyframe schedule on the game clock
    Keyframed {
        /// Height at a `Bottom` keyframe
        bottom: f32,
        /// Height at a `Top` keyframe
        top: f32,
    },
}

impl Motion {
    /// Write this frame's pose into `transform`
    #[allow(clippy::cast_possible_truncation)]
    pub fn apply(&self, transform: &mut Transform, clocks: &MotionClocks<'_>) {
        match *self {
            Motion::Spin { rates } => {
                transform.rotation = rates * clocks.total_elapsed as f32;
            }
            Motion::Orbit { center, radius, angular_speed, phase } => {
                let angle = angular_speed * clocks.total_elapsed as f32 + phase;
                transform.position = center + Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
            }
            Motion::Keyframed { bottom, top } => {
                transform.position.y = clocks.keyframes.interpolate(clocks.game_elapsed, bottom, top);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::animation::keyframes::{Keyframe, KeyframeAction};

    fn clocks(schedule: &KeyframeSchedule, total: f64, game: f64) -> MotionClocks<'_> {
        MotionClocks {
            total_elapsed: total,
            game_elapsed: game,
            keyframes: schedule,
        }
    }

    #[test]
    fn test_spin_scales_with_total_time() {
        let schedule = KeyframeSchedule::default();
        let mut transform = Transform::default();
        let motion = Motion::Spin { rates: Vec3::new(0.0, 2.0, 0.0) };

        motion.apply(&mut transform, &clocks(&schedule, 1.5, 0.0));
        assert_relative_eq!(transform.rotation, Vec3::new(0.0, 3.0, 0.0));
    }

    #[test]
    fn test_orbit_stays_on_circle() {
        let schedule = KeyframeSchedule::default();
        let mut transform = Transform::default();
        let center = Vec3::new(0.0, -10.0, -80.0);
        let motion = Motion::Orbit { center, radius: 20.0, angular_speed: 1.0, phase: 0.0 };

        motion.apply(&mut transform, &clocks(&schedule, 0.0, 0.0));
        assert_relative_eq!(transform.position, Vec3::new(20.0, -10.0, -80.0));

        motion.apply(&mut transform, &clocks(&schedule, 2.0, 0.0));
        assert_relative_eq!((transform.position - center).norm(), 20.0, epsilon = 1e-4);
        assert_relative_eq!(transform.position.y, -10.0);
    }

    #[test]
    fn test_keyframed_only_writes_height() {
        let mut schedule = KeyframeSchedule::new(vec![
            Keyframe::new(0.0, KeyframeAction::Bottom),
            Keyframe::new(2.0, KeyframeAction::Top),
        ])
        .unwrap();
        schedule.advance(1.0);

        let mut transform = Transform::default();
        transform.position = Vec3::new(5.0, 0.0, -3.0);
        let motion = Motion::Keyframed { bottom: 0.0, top: 8.0 };

        motion.apply(&mut transform, &clocks(&schedule, 50.0, 1.0));
        assert_relative_eq!(transform.position, Vec3::new(5.0, 4.0, -3.0));
    }
}
