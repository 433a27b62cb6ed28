//! Input management system
//!
//! Mouse buttons are sampled once per frame. Comparing the sample with the
//! previous frame's turns level state into press and release edges.

/// Mouse buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button
    Left,
    /// Right mouse button
    Right,
    /// Middle mouse button
    Middle,
}

impl MouseButton {
    /// Every tracked button
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Right, MouseButton::Middle];

    fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
            MouseButton::Middle => 2,
        }
    }
}

/// Input manager
#[derive(Debug, Clone, Default)]
pub struct InputManager {
    current: [bool; 3],
    previous: [bool; 3],
}

impl InputManager {
    /// Create a new input manager with every button up
    pub fn new() -> Self {
        Self::default()
    }

    /// Take this frame's button sample
    pub fn update(&mut self, mut is_down: impl FnMut(MouseButton) -> bool) {
        self.previous = self.current;
        for button in MouseButton::ALL {
            self.current[button.index()] = is_down(button);
        }
    }

    /// Whether the button is held this frame
    pub fn is_down(&self, button: MouseButton) -> bool {
        self.current[button.index()]
    }

    /// Whether the button went down since the previous frame
    pub fn just_pressed(&self, button: MouseButton) -> bool {
        self.current[button.index()] && !self.previous[button.index()]
    }

    /// Whether the button came up since the previous frame
    pub fn just_released(&self, button: MouseButton) -> bool {
        !self.current[button.index()] && self.previous[button.index()]
    }
}
