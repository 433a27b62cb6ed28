//! Game clock and its state machine
//!
//! ```text
//! NotStarted --left press--> Running <--right press--> Paused
//!                               |                         |
//!                               +---------lose()----------+--> Lost
//! Lost --left release--> NotStarted
//! ```

use log::info;

use crate::input::{InputManager, MouseButton};

/// Where the game is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// Waiting for the first click
    #[default]
    NotStarted,
    /// Game clock advancing
    Running,
    /// Game clock frozen, total clock advancing
    Paused,
    /// Waiting for the click that resets the game
    Lost,
}

/// State change reported to the caller, one per frame at most
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateTransition {
    /// NotStarted to Running; both clocks were reset to the start offset
    Started,
    /// Running to Paused
    Paused,
    /// Paused to Running
    Resumed,
    /// Running or Paused to Lost
    Lost,
    /// Lost to NotStarted; keyframe playback must restart
    Reset,
}

/// Two clocks gated by [`GameState`]
///
/// `total_elapsed` advances in every state once the game has started and
/// drives ambient motion. `game_elapsed` advances only while running and
/// drives the keyframe schedule.
#[derive(Debug, Clone)]
pub struct GameClock {
    state: GameState,
    total_elapsed: f64,
    game_elapsed: f64,
    start_offset: f64,
}

impl GameClock {
    /// Create a clock that starts at `start_offset` seconds
    pub fn new(start_offset: f64) -> Self {
        Self {
            state: GameState::NotStarted,
            total_elapsed: start_offset,
            game_elapsed: start_offset,
            start_offset,
        }
    }

    /// Current state
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Seconds since start, pauses included
    pub fn total_elapsed(&self) -> f64 {
        self.total_elapsed
    }

    /// Seconds spent running since start
    pub fn game_elapsed(&self) -> f64 {
        self.game_elapsed
    }

    /// Whether the game has left [`GameState::NotStarted`]
    pub fn is_started(&self) -> bool {
        self.state != GameState::NotStarted
    }

    /// Advance the clocks by `delta_time` and apply this frame's input edges
    ///
    /// Clocks advance with the state the frame began in: the frame that
    /// pauses still counts as running.
    pub fn update(&mut self, delta_time: f64, input: &InputManager) -> Option<StateTransition> {
        let transition = match self.state {
            GameState::NotStarted => {
                if input.just_pressed(MouseButton::Left) {
                    self.total_elapsed = self.start_offset;
                    self.game_elapsed = self.start_offset;
                    self.state = GameState::Running;
                    Some(StateTransition::Started)
                } else {
                    None
                }
            }
            GameState::Running => {
                self.total_elapsed += delta_time;
                self.game_elapsed += delta_time;
                if input.just_pressed(MouseButton::Right) {
                    self.state = GameState::Paused;
                    Some(StateTransition::Paused)
                } else {
                    None
                }
            }
            GameState::Paused => {
                self.total_elapsed += delta_time;
                if input.just_pressed(MouseButton::Right) {
                    self.state = GameState::Running;
                    Some(StateTransition::Resumed)
                } else {
                    None
                }
            }
            GameState::Lost => {
                self.total_elapsed += delta_time;
                if input.just_released(MouseButton::Left) {
                    self.state = GameState::NotStarted;
                    Some(StateTransition::Reset)
                } else {
                    None
                }
            }
        };

        if let Some(transition) = transition {
            info!("Game state {:?}: now {:?}", transition, self.state);
        }
        transition
    }

    /// End the game; only a running or paused game can be lost
    pub fn lose(&mut self) -> Option<StateTransition> {
        match self.state {
            GameState::Running | GameState::Paused => {
                self.state = GameState::Lost;
                info!("Game lost after {:.2}s", self.game_elapsed);
                Some(StateTransition::Lost)
            }
            GameState::NotStarted | GameState::Lost => None,
        }
    }
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(0.0)
    }
}
