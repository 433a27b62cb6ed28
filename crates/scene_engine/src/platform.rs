//! Window and event source seam
//!
//! The frame loop only needs a drawable size, mouse button levels, an event
//! pump, buffer presentation and a quit flag. Windowing backends implement
//! [`Platform`]; [`HeadlessPlatform`] replays a scripted sequence of button
//! states and quits after a fixed number of presented frames.

use log::trace;

use crate::input::MouseButton;

/// Everything the frame loop asks of the window system
pub trait Platform {
    /// Current drawable size in pixels
    fn window_size(&self) -> (u32, u32);

    /// Whether the button is currently held
    fn mouse_button_down(&self, button: MouseButton) -> bool;

    /// Process pending window system events
    fn poll_events(&mut self);

    /// Present the finished frame
    fn present(&mut self);

    /// Whether the user asked to quit
    fn should_close(&self) -> bool;
}

/// Scripted platform without a window
///
/// Each call to [`Platform::poll_events`] moves to the next scripted frame.
/// Frames past the end of the script hold no buttons.
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    window_size: (u32, u32),
    script: Vec<Vec<MouseButton>>,
    polled: usize,
    presented: u64,
    frame_limit: u64,
}

impl HeadlessPlatform {
    /// Platform reporting `width`x`height` that closes after `frame_limit` presents
    pub fn new(width: u32, height: u32, frame_limit: u64) -> Self {
        Self {
            window_size: (width, height),
            script: Vec::new(),
            polled: 0,
            presented: 0,
            frame_limit,
        }
    }

    /// Buttons held on each successive frame
    pub fn with_script(mut self, frames: impl IntoIterator<Item = Vec<MouseButton>>) -> Self {
        self.script = frames.into_iter().collect();
        self
    }

    /// Change the reported window size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.window_size = (width, height);
    }

    /// Number of frames presented so far
    pub fn presented_frames(&self) -> u64 {
        self.presented
    }

    fn current_frame(&self) -> Option<&[MouseButton]> {
        let index = self.polled.checked_sub(1)?;
        self.script.get(index).map(Vec::as_slice)
    }
}

impl Platform for HeadlessPlatform {
    fn window_size(&self) -> (u32, u32) {
        self.window_size
    }

    fn mouse_button_down(&self, button: MouseButton) -> bool {
        self.current_frame().is_some_and(|held| held.contains(&button))
    }

    fn poll_events(&mut self) {
        self.polled += 1;
    }

    fn present(&mut self) {
        self.presented += 1;
        trace!("Presented headless frame {}", self.presented);
    }

    fn should_close(&self) -> bool {
        self.presented >= self.frame_limit
    }
}
