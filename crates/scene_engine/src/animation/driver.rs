//! Per-frame animation driver

use log::trace;

use super::camera::CameraFrame;
use super::game_state::{GameClock, GameState, StateTransition};
use super::motion::MotionClocks;
use crate::core::config::{CameraConfig, EngineConfig};
use crate::foundation::math::{Mat4, Vec3};
use crate::input::InputManager;
use crate::scene::Scene;

/// What the driver decided this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Wall-clock seconds since the previous frame
    pub delta_time: f64,
    /// Seconds since start, pauses included
    pub total_elapsed: f64,
    /// Seconds spent running
    pub game_elapsed: f64,
    /// State after this frame's input
    pub game_state: GameState,
    /// State change this frame, if any
    pub transition: Option<StateTransition>,
    /// Whether the keyframe cursor moved this frame
    pub keyframe_jumped: bool,
    /// Projection times view
    pub view_projection: Mat4,
    /// Camera position in world space
    pub camera_position: Vec3,
}

/// Advances clocks, keyframes, motions and the camera once per frame
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    clock: GameClock,
    camera: CameraConfig,
}

impl AnimationDriver {
    /// Create a driver from the engine configuration
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            clock: GameClock::new(config.timing.start_offset_secs),
            camera: config.camera.clone(),
        }
    }

    /// The game clock
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// End the running game
    pub fn lose(&mut self) -> Option<StateTransition> {
        self.clock.lose()
    }

    /// Run the frame's animation step
    ///
    /// Order: clocks and state machine, keyframe cursor, node motions, camera.
    /// Starting or resetting the game rewinds the keyframe schedule. The
    /// cursor only advances while the game is running.
    pub fn update(
        &mut self,
        delta_time: f64,
        input: &InputManager,
        scene: &mut Scene,
        window_size: (u32, u32),
    ) -> FrameState {
        let transition = self.clock.update(delta_time, input);
        if matches!(transition, Some(StateTransition::Started | StateTransition::Reset)) {
            scene.keyframes.reset();
        }

        let keyframe_jumped = self.clock.state() == GameState::Running
            && scene.keyframes.advance(self.clock.game_elapsed());
        if keyframe_jumped {
            trace!("Keyframe cursor moved to {:?}", scene.keyframes.current_index());
        }

        let clocks = MotionClocks {
            total_elapsed: self.clock.total_elapsed(),
            game_elapsed: self.clock.game_elapsed(),
            keyframes: &scene.keyframes,
        };
        for (_, node) in scene.graph.iter_mut() {
            if let Some(motion) = &node.motion {
                motion.apply(&mut node.transform, &clocks);
            }
        }

        let CameraFrame { view_projection, position, .. } = scene.camera.frame(
            self.clock.total_elapsed(),
            &self.camera,
            window_size.0,
            window_size.1,
        );

        FrameState {
            delta_time,
            total_elapsed: self.clock.total_elapsed(),
            game_elapsed: self.clock.game_elapsed(),
            game_state: self.clock.state(),
            transition,
            keyframe_jumped,
            view_projection,
            camera_position: position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::animation::{CameraRig, Keyframe, KeyframeAction, KeyframeSchedule, Motion};
    use crate::input::MouseButton;
    use crate::scene::{NodeId, NodeKind, SceneNode};

    fn click(input: &mut InputManager, left: bool, right: bool) {
        input.update(|button| match button {
            MouseButton::Left => left,
            MouseButton::Right => right,
            MouseButton::Middle => false,
        });
    }

    fn scene_with(motion: Motion) -> (Scene, NodeId) {
        let keyframes = KeyframeSchedule::new(vec![
            Keyframe::new(0.0, KeyframeAction::Bottom),
            Keyframe::new(1.0, KeyframeAction::Top),
            Keyframe::new(2.0, KeyframeAction::Bottom),
        ])
        .unwrap();
        let mut scene = Scene::new(CameraRig::default(), keyframes);
        let node = scene
            .graph
            .add_child(NodeId::ROOT, SceneNode::new(NodeKind::group()).with_motion(motion))
            .unwrap();
        (scene, node)
    }

    #[test]
    fn test_motions_follow_the_clock() {
        let (mut scene, ball) = scene_with(Motion::Spin { rates: Vec3::new(0.0, 2.0, 0.0) });
        let mut driver = AnimationDriver::new(&EngineConfig::default());
        let mut input = InputManager::new();

        click(&mut input, false, false);
        driver.update(1.0, &input, &mut scene, (800, 600));
        assert_eq!(scene.graph.get(ball).unwrap().transform.rotation, Vec3::zeros());

        click(&mut input, true, false);
        let state = driver.update(1.0, &input, &mut scene, (800, 600));
        assert_eq!(state.transition, Some(StateTransition::Started));

        click(&mut input, false, false);
        driver.update(0.25, &input, &mut scene, (800, 600));
        assert_relative_eq!(scene.graph.get(ball).unwrap().transform.rotation.y, 0.5);
    }

    #[test]
    fn test_keyframes_advance_only_while_running() {
        let (mut scene, ball) = scene_with(Motion::Keyframed { bottom: 0.0, top: 10.0 });
        let mut driver = AnimationDriver::new(&EngineConfig::default());
        let mut input = InputManager::new();

        click(&mut input, true, false);
        driver.update(0.0, &input, &mut scene, (800, 600));

        click(&mut input, false, false);
        let state = driver.update(0.5, &input, &mut scene, (800, 600));
        assert!(!state.keyframe_jumped);
        assert_relative_eq!(scene.graph.get(ball).unwrap().transform.position.y, 5.0);

        let state = driver.update(0.75, &input, &mut scene, (800, 600));
        assert!(state.keyframe_jumped);
        assert_eq!(scene.keyframes.current_index(), Some(1));
        assert_relative_eq!(scene.graph.get(ball).unwrap().transform.position.y, 7.5);

        // pause: the game clock stops, so does the ball
        click(&mut input, false, true);
        driver.update(0.0, &input, &mut scene, (800, 600));
        click(&mut input, false, false);
        let state = driver.update(5.0, &input, &mut scene, (800, 600));
        assert_eq!(state.game_state, GameState::Paused);
        assert!(!state.keyframe_jumped);
        assert_relative_eq!(state.game_elapsed, 1.25);
        assert_relative_eq!(scene.graph.get(ball).unwrap().transform.position.y, 7.5);
    }

    #[test]
    fn test_reset_rewinds_keyframes() {
        let (mut scene, _) = scene_with(Motion::Keyframed { bottom: 0.0, top: 10.0 });
        let mut driver = AnimationDriver::new(&EngineConfig::default());
        let mut input = InputManager::new();

        click(&mut input, true, false);
        driver.update(0.0, &input, &mut scene, (800, 600));
        click(&mut input, false, false);
        driver.update(1.5, &input, &mut scene, (800, 600));
        assert_eq!(scene.keyframes.current_index(), Some(1));

        assert_eq!(driver.lose(), Some(StateTransition::Lost));
        click(&mut input, true, false);
        driver.update(0.1, &input, &mut scene, (800, 600));
        click(&mut input, false, false);
        let state = driver.update(0.1, &input, &mut scene, (800, 600));

        assert_eq!(state.transition, Some(StateTransition::Reset));
        assert_eq!(state.game_state, GameState::NotStarted);
        assert_eq!(scene.keyframes.current_index(), Some(0));
    }

    #[test]
    fn test_camera_follows_window_aspect() {
        let (mut scene, _) = scene_with(Motion::Spin { rates: Vec3::zeros() });
        let mut driver = AnimationDriver::new(&EngineConfig::default());
        let input = InputManager::new();

        let wide = driver.update(0.0, &input, &mut scene, (1600, 800));
        let square = driver.update(0.0, &input, &mut scene, (800, 800));
        assert_eq!(wide.camera_position, Vec3::new(0.0, 2.0, -20.0));
        assert!(wide.view_projection != square.view_projection);
    }
}
