//! # Unified Configuration
//!
//! Configuration for every subsystem of the frame loop, loadable from TOML or
//! RON through [`Config`].
//!
//! ## Configuration Categories
//!
//! - **Window**: initial dimensions used to size the off-screen render targets
//! - **Camera**: projection parameters
//! - **Render**: clear color, shading limits
//! - **Shaders**: sources handed to the shader provider
//! - **Timing**: clock start offset

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Window configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Scene Engine".to_string(),
            width: 1366,
            height: 768,
        }
    }
}

/// Perspective projection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near clipping plane distance
    pub near: f32,
    /// Far clipping plane distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 80.0,
            near: 0.1,
            far: 350.0,
        }
    }
}

/// Render pipeline settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// RGBA clear color of the scene pass
    pub clear_color: [f32; 4],
    /// Point light ids at or above this are skipped by the dispatcher
    pub max_point_lights: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.3, 0.5, 0.8, 1.0],
            max_point_lights: 8,
        }
    }
}

/// Vertex/fragment source pair handed to the shader provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShaderSource {
    /// Path to the vertex shader
    pub vertex: String,
    /// Path to the fragment shader
    pub fragment: String,
}

impl ShaderSource {
    /// Create a new shader source pair
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

/// Programs used by the two render passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShaderConfig {
    /// Program used by the scene pass
    pub scene: ShaderSource,
    /// Program used by the post-process pass
    pub post_process: ShaderSource,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            scene: ShaderSource::new("res/shaders/simple.vert", "res/shaders/simple.frag"),
            post_process: ShaderSource::new("res/shaders/framebuffer.vert", "res/shaders/framebuffer.frag"),
        }
    }
}

/// Game clock settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Seconds both clocks are set to when the game starts
    pub start_offset_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { start_offset_secs: 0.0 }
    }
}

/// # Engine Configuration
///
/// Top level configuration for the frame loop.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Projection settings
    pub camera: CameraConfig,
    /// Render pipeline settings
    pub render: RenderConfig,
    /// Shader sources
    pub shaders: ShaderConfig,
    /// Clock settings
    pub timing: TimingConfig,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Set the window dimensions
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the scene pass clear color
    pub fn with_clear_color(mut self, clear_color: [f32; 4]) -> Self {
        self.render.clear_color = clear_color;
        self
    }

    /// Set the point light limit
    pub fn with_max_point_lights(mut self, max_point_lights: u32) -> Self {
        self.render.max_point_lights = max_point_lights;
        self
    }

    /// Set the clock start offset
    pub fn with_start_offset(mut self, seconds: f64) -> Self {
        self.timing.start_offset_secs = seconds;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window must have a non-zero size, got {}x{}",
                self.window.width, self.window.height
            )));
        }

        if !(self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "field of view must be in (0, 180) degrees, got {}",
                self.camera.fov_degrees
            )));
        }

        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(ConfigError::Invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.near, self.camera.far
            )));
        }

        if self.timing.start_offset_secs < 0.0 {
            return Err(ConfigError::Invalid("start offset cannot be negative".to_string()));
        }

        Ok(())
    }
}
