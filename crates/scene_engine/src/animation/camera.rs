//! Camera rig
//!
//! Produces the view-projection matrix fed to the transform propagator and
//! the camera position bound for lighting.

use serde::{Deserialize, Serialize};

use crate::core::config::CameraConfig;
use crate::foundation::math::{serde_vec3, utils, Mat4, Mat4Ext, Point3, Vec3};

/// How the camera is placed each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CameraRig {
    /// Static camera looking down -Z, tilted by `pitch` then turned by `yaw`
    Fixed {
        /// World position
        #[serde(with = "serde_vec3")]
        position: Vec3,
        /// Rotation about X in radians
        pitch: f32,
        /// Rotation about Y in radians
        yaw: f32,
    },
    /// Camera circling `target` in the XZ plane while looking at it
    Orbit {
        /// Point looked at
        #[serde(with = "serde_vec3")]
        target: Vec3,
        /// Horizontal distance from the target
        radius: f32,
        /// Height above the target
        height: f32,
        /// Radians per second
        angular_speed: f32,
    },
}

impl Default for CameraRig {
    fn default() -> Self {
        CameraRig::Fixed {
            position: Vec3::new(0.0, 2.0, -20.0),
            pitch: 0.3,
            yaw: 0.1,
        }
    }
}

/// Camera matrices for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    /// World to view
    pub view: Mat4,
    /// View to clip
    pub projection: Mat4,
    /// `projection * view`
    pub view_projection: Mat4,
    /// Camera position in world space
    pub position: Vec3,
}

impl CameraRig {
    /// View matrix and eye position at `time` seconds
    #[allow(clippy::cast_possible_truncation)]
    pub fn view(&self, time: f64) -> (Mat4, Vec3) {
        match *self {
            CameraRig::Fixed { position, pitch, yaw } => {
                let view = Mat4::rotation_x(pitch) * Mat4::rotation_y(yaw) * Mat4::new_translation(&-position);
                (view, position)
            }
            CameraRig::Orbit { target, radius, height, angular_speed } => {
                let angle = angular_speed * time as f32;
                let eye = target + Vec3::new(radius * angle.cos(), height, radius * angle.sin());
                let view = Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &Vec3::y());
                (view, eye)
            }
        }
    }

    /// Full camera state for a window of `width` x `height` pixels
    ///
    /// A zero-sized window (minimized) uses a square aspect ratio.
    #[allow(clippy::cast_precision_loss)]
    pub fn frame(&self, time: f64, camera: &CameraConfig, width: u32, height: u32) -> CameraFrame {
        let aspect = if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };

        let projection = Mat4::perspective(utils::deg_to_rad(camera.fov_degrees), aspect, camera.near, camera.far);
        let (view, position) = self.view(time);

        CameraFrame {
            view,
            projection,
            view_projection: projection * view,
            position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::foundation::math::Vec4;

    #[test]
    fn test_default_rig() {
        let CameraRig::Fixed { position, pitch, yaw } = CameraRig::default() else {
            panic!("default rig should be fixed");
        };
        assert_eq!(position, Vec3::new(0.0, 2.0, -20.0));
        assert_relative_eq!(pitch, 0.3);
        assert_relative_eq!(yaw, 0.1);
    }

    #[test]
    fn test_fixed_view_moves_eye_to_origin() {
        let rig = CameraRig::Fixed {
            position: Vec3::new(1.0, 2.0, 3.0),
            pitch: 0.0,
            yaw: 0.0,
        };
        let (view, eye) = rig.view(10.0);
        assert_eq!(eye, Vec3::new(1.0, 2.0, 3.0));
        let eye_in_view = view * Vec4::new(1.0, 2.0, 3.0, 1.0);
        assert_relative_eq!(eye_in_view, Vec4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn test_fixed_view_applies_yaw_before_pitch() {
        let rig = CameraRig::Fixed { position: Vec3::zeros(), pitch: 0.3, yaw: 0.1 };
        let (view, _) = rig.view(0.0);
        let expected = Mat4::rotation_x(0.3) * Mat4::rotation_y(0.1);
        assert_relative_eq!(view, expected, epsilon = 1e-6);
    }

    #[test]
    fn test_orbit_keeps_distance_and_faces_target() {
        let rig = CameraRig::Orbit {
            target: Vec3::new(0.0, -10.0, -80.0),
            radius: 30.0,
            height: 5.0,
            angular_speed: 0.5,
        };

        for time in [0.0, 1.0, 7.5] {
            let (view, eye) = rig.view(time);
            let offset = eye - Vec3::new(0.0, -10.0, -80.0);
            assert_relative_eq!(offset.y, 5.0, epsilon = 1e-4);
            assert_relative_eq!(Vec3::new(offset.x, 0.0, offset.z).norm(), 30.0, epsilon = 1e-3);

            // the target lies straight ahead, on the view -Z axis
            let target = view * Vec4::new(0.0, -10.0, -80.0, 1.0);
            assert_relative_eq!(target.x, 0.0, epsilon = 1e-3);
            assert_relative_eq!(target.y, 0.0, epsilon = 1e-3);
            assert!(target.z < 0.0);
        }
    }

    #[test]
    fn test_frame_combines_projection_and_view() {
        let rig = CameraRig::default();
        let config = CameraConfig::default();
        let frame = rig.frame(0.0, &config, 1366, 768);

        assert_relative_eq!(frame.view_projection, frame.projection * frame.view);
        let expected = Mat4::new_perspective(1366.0 / 768.0, utils::deg_to_rad(80.0), 0.1, 350.0);
        assert_relative_eq!(frame.projection, expected);
    }

    #[test]
    fn test_minimized_window_does_not_break_projection() {
        let frame = CameraRig::default().frame(0.0, &CameraConfig::default(), 0, 0);
        assert!(frame.projection.iter().all(|v| v.is_finite()));
    }
}
