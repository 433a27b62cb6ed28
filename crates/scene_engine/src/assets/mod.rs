//! Asset provider interface
//!
//! Model files and texture images are decoded outside the core. The scene
//! builder asks an [`AssetProvider`] for them by path and only ever sees
//! plain [`Mesh`] and [`ImageData`] values.

use std::collections::HashMap;

use thiserror::Error;

use crate::render::primitives::Mesh;

/// Decoded image data ready for GPU upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Raw pixel data, row major
    pub data: Vec<u8>,
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Number of color channels (3 for RGB, 4 for RGBA)
    pub channels: u8,
}

impl ImageData {
    /// Wrap already decoded RGBA pixels
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, AssetError> {
        let image = Self { data, width, height, channels: 4 };
        image.validate()?;
        Ok(image)
    }

    /// Create a solid color image
    pub fn solid_color(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = (width * height) as usize;
        let mut data = Vec::with_capacity(pixel_count * 4);

        for _ in 0..pixel_count {
            data.extend_from_slice(&color);
        }

        Self {
            data,
            width,
            height,
            channels: 4,
        }
    }

    /// Number of bytes the pixel buffer must hold
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Check the pixel buffer against the declared dimensions
    pub fn validate(&self) -> Result<(), AssetError> {
        if self.width == 0 || self.height == 0 {
            return Err(AssetError::InvalidData(format!(
                "image has zero size {}x{}",
                self.width, self.height
            )));
        }

        if !matches!(self.channels, 3 | 4) {
            return Err(AssetError::UnsupportedFormat(format!("{} channels", self.channels)));
        }

        if self.data.len() != self.expected_len() {
            return Err(AssetError::InvalidData(format!(
                "expected {} bytes for {}x{}x{}, got {}",
                self.expected_len(),
                self.width,
                self.height,
                self.channels,
                self.data.len()
            )));
        }

        Ok(())
    }
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Failed to load asset
    #[error("Failed to load asset: {0}")]
    LoadFailed(String),

    /// Invalid asset data
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unsupported asset format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Source of model meshes and texture images
pub trait AssetProvider {
    /// Load a model file as a triangle mesh
    fn load_model(&mut self, path: &str) -> Result<Mesh, AssetError>;

    /// Load and decode a texture image
    fn load_texture(&mut self, path: &str) -> Result<ImageData, AssetError>;
}

/// Asset provider backed by maps of pre-decoded assets
///
/// Useful for tests and for scenes built entirely from procedural meshes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAssets {
    models: HashMap<String, Mesh>,
    textures: HashMap<String, ImageData>,
}

impl InMemoryAssets {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model under a path
    pub fn with_model(mut self, path: impl Into<String>, mesh: Mesh) -> Self {
        self.models.insert(path.into(), mesh);
        self
    }

    /// Register a texture under a path
    pub fn with_texture(mut self, path: impl Into<String>, image: ImageData) -> Self {
        self.textures.insert(path.into(), image);
        self
    }
}

impl AssetProvider for InMemoryAssets {
    fn load_model(&mut self, path: &str) -> Result<Mesh, AssetError> {
        self.models
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn load_texture(&mut self, path: &str) -> Result<ImageData, AssetError> {
        self.textures
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }
}
