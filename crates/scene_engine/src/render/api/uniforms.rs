//! Fixed uniform layout shared with the scene and post-process shaders

use super::UniformLocation;

/// Model-view-projection matrix
pub const MVP: UniformLocation = UniformLocation(3);
/// Model (world) matrix
pub const MODEL: UniformLocation = UniformLocation(4);
/// Normal matrix (inverse-transpose of the model's upper 3x3)
pub const NORMAL_MATRIX: UniformLocation = UniformLocation(5);
/// Camera world position
pub const CAMERA_POSITION: UniformLocation = UniformLocation(6);
/// World position of the shadow occluder
pub const OCCLUDER_POSITION: UniformLocation = UniformLocation(7);
/// Radius of the shadow occluder
pub const OCCLUDER_RADIUS: UniformLocation = UniformLocation(8);
/// Sample the base texture
pub const USE_TEXTURE: UniformLocation = UniformLocation(9);
/// Sample the normal map
pub const USE_NORMAL_MAP: UniformLocation = UniformLocation(10);

/// Texture unit of a node's base texture
pub const BASE_TEXTURE_UNIT: u32 = 0;
/// Texture unit of a node's normal map
pub const NORMAL_MAP_UNIT: u32 = 1;

/// Post-process sampler names and the units they read, in attachment order
pub const POST_PROCESS_SAMPLERS: [(&str, u32); 3] = [
    ("screenTexture", 0),
    ("normalTexture", 1),
    ("depthTexture", 2),
];

/// Name of a point light's position uniform
pub fn light_position_name(light_id: u32) -> String {
    format!("light_source[{light_id}].position")
}

/// Name of a point light's color uniform
pub fn light_color_name(light_id: u32) -> String {
    format!("light_source[{light_id}].color")
}
