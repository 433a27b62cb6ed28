//! Backend implementations for the render module
//!
//! Only the headless recording backend lives in this crate. Windowed
//! backends implement [`RenderBackend`](crate::render::api::RenderBackend)
//! in the application that owns the graphics context.

/// Command-recording backend for headless runs and tests
pub mod recording;

pub use recording::{DrawCall, ProgramRole, RecordingBackend, RenderCommand};
