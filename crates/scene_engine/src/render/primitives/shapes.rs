//! Procedural mesh generators
//!
//! Built-in half of the mesh provider: boxes, spheres and text strips. Model
//! files come from an [`AssetProvider`](crate::assets::AssetProvider).

use crate::foundation::math::{constants, utils, Vec2, Vec3};
use super::mesh::{Mesh, Vertex};

/// Corner indices of each cube face (bottom, top, right, left, back, front)
const CUBE_FACES: [[usize; 4]; 6] = [
    [2, 3, 0, 1],
    [4, 5, 6, 7],
    [7, 5, 3, 1],
    [4, 6, 0, 2],
    [5, 4, 1, 0],
    [6, 7, 2, 3],
];

const CUBE_NORMALS: [[f32; 3]; 6] = [
    [0.0, -1.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0],
    [0.0, 0.0, -1.0],
    [0.0, 0.0, 1.0],
];

const QUAD_UVS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];

/// Number of glyphs in the horizontal font atlas used by [`text_geometry`]
pub const GLYPH_ATLAS_SIZE: u32 = 128;

/// Axis-aligned box centered on the origin
///
/// `inverted` flips winding and normals so the box is seen from inside (a
/// room). With `tiling` the UVs repeat every `texture_scale` world units,
/// where the face extents are first multiplied by `texture_scale_3d`.
/// Every face is two triangles with their own vertices: 36 vertices and 36
/// indices, with a per-triangle tangent frame.
pub fn cube(dimensions: Vec3, texture_scale: Vec2, tiling: bool, inverted: bool, texture_scale_3d: Vec3) -> Mesh {
    let mut points = [Vec3::zeros(); 8];
    for y in 0..=1_i32 {
        for z in 0..=1_i32 {
            for x in 0..=1_i32 {
                let corner = Vec3::new((x * 2 - 1) as f32, (y * 2 - 1) as f32, (z * 2 - 1) as f32);
                points[(x + y * 4 + z * 2) as usize] = corner.component_mul(&dimensions) * 0.5;
            }
        }
    }

    let scaled = dimensions.component_mul(&texture_scale_3d);
    let face_scale = [
        Vec2::new(-scaled.x, -scaled.z),
        Vec2::new(-scaled.x, -scaled.z),
        Vec2::new(scaled.z, scaled.y),
        Vec2::new(scaled.z, scaled.y),
        Vec2::new(scaled.x, scaled.y),
        Vec2::new(scaled.x, scaled.y),
    ];

    let normal_sign = if inverted { -1.0 } else { 1.0 };
    let mut vertices = Vec::with_capacity(36);
    let mut indices = Vec::with_capacity(36);

    for (face, corners) in CUBE_FACES.iter().enumerate() {
        let [a, b, c, d] = *corners;
        let (corner_order, uv_order) = if inverted {
            ([a, b, d, a, d, c], [3, 1, 0, 3, 0, 2])
        } else {
            ([a, d, b, a, c, d], [1, 2, 3, 1, 0, 2])
        };

        let uv_factor = if tiling {
            face_scale[face].component_div(&texture_scale)
        } else {
            Vec2::new(1.0, 1.0)
        };

        let normal = CUBE_NORMALS[face].map(|n| n * normal_sign);
        for (corner, uv) in corner_order.iter().zip(uv_order) {
            let p = points[*corner];
            let [u, v] = QUAD_UVS[uv];
            indices.push(vertices.len() as u32);
            vertices.push(Vertex::new(
                [p.x, p.y, p.z],
                normal,
                [u * uv_factor.x, v * uv_factor.y],
            ));
        }
    }

    compute_tangent_basis(&mut vertices);
    Mesh::new(vertices, indices)
}

/// UV sphere centered on the origin
///
/// Built layer by layer from the -Z pole; every (layer, slice) cell holds
/// two triangles with their own six vertices and a per-triangle tangent
/// frame. Triangles collapsed at the poles get a zero frame.
pub fn sphere(radius: f32, slices: u32, layers: u32) -> Mesh {
    if slices == 0 || layers == 0 {
        return Mesh::default();
    }

    let degrees_per_layer = 180.0 / layers as f32;
    let degrees_per_slice = 360.0 / slices as f32;
    let cell_count = (slices * layers) as usize;
    let mut vertices = Vec::with_capacity(cell_count * 6);
    let mut indices = Vec::with_capacity(cell_count * 6);

    for layer in 0..layers {
        let current_angle = utils::deg_to_rad(degrees_per_layer * layer as f32);
        let next_angle = utils::deg_to_rad(degrees_per_layer * (layer + 1) as f32);

        let current_z = -current_angle.cos();
        let next_z = -next_angle.cos();
        let current_radius = current_angle.sin();
        let next_radius = next_angle.sin();

        for slice in 0..slices {
            let current_slice = utils::deg_to_rad(degrees_per_slice * slice as f32);
            let next_slice = utils::deg_to_rad(degrees_per_slice * (slice + 1) as f32);
            let (current_y, current_x) = current_slice.sin_cos();
            let (next_y, next_x) = next_slice.sin_cos();

            let bottom_start = Vec3::new(current_radius * current_x, current_radius * current_y, current_z);
            let bottom_end = Vec3::new(current_radius * next_x, current_radius * next_y, current_z);
            let top_end = Vec3::new(next_radius * next_x, next_radius * next_y, next_z);
            let top_start = Vec3::new(next_radius * current_x, next_radius * current_y, next_z);

            for unit in [bottom_start, bottom_end, top_end, bottom_start, top_end, top_start] {
                let position = unit * radius;
                let uv = [
                    0.5 + unit.z.atan2(-unit.x) / constants::TAU,
                    0.5 + unit.y.clamp(-1.0, 1.0).asin() / constants::PI,
                ];
                indices.push(vertices.len() as u32);
                vertices.push(Vertex::new([position.x, position.y, position.z], [unit.x, unit.y, unit.z], uv));
            }
        }
    }

    compute_tangent_basis(&mut vertices);
    Mesh::new(vertices, indices)
}

/// Flat strip of character quads in the XY plane
///
/// Each character is `total_width / len` wide and `height_over_width` times
/// as tall, sampling its cell of a one-row atlas of [`GLYPH_ATLAS_SIZE`]
/// glyphs indexed by character code. Codes past the atlas use the last cell.
pub fn text_geometry(text: &str, height_over_width: f32, total_width: f32) -> Mesh {
    let glyphs: Vec<u32> = text.chars().map(|c| (c as u32).min(GLYPH_ATLAS_SIZE - 1)).collect();
    if glyphs.is_empty() {
        return Mesh::default();
    }

    let character_width = total_width / glyphs.len() as f32;
    let character_height = height_over_width * character_width;
    let glyph_width = 1.0 / GLYPH_ATLAS_SIZE as f32;
    let normal = [0.0, 0.0, 1.0];

    let mut vertices = Vec::with_capacity(glyphs.len() * 4);
    let mut indices = Vec::with_capacity(glyphs.len() * 6);

    for (i, glyph) in glyphs.iter().enumerate() {
        let x = i as f32 * character_width;
        let u = *glyph as f32 * glyph_width;
        let base = vertices.len() as u32;

        vertices.push(Vertex::new([x, 0.0, 0.0], normal, [u, 0.0]));
        vertices.push(Vertex::new([x + character_width, 0.0, 0.0], normal, [u + glyph_width, 0.0]));
        vertices.push(Vertex::new([x + character_width, character_height, 0.0], normal, [u + glyph_width, 1.0]));
        vertices.push(Vertex::new([x, character_height, 0.0], normal, [u, 1.0]));

        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(vertices, indices)
}

/// Fill tangent and bitangent of an unindexed triangle list
///
/// Every run of three vertices is treated as one triangle and all three get
/// the same frame. Triangles with degenerate UVs get a zero frame. A trailing
/// partial triangle is left untouched.
pub fn compute_tangent_basis(vertices: &mut [Vertex]) {
    for triangle in vertices.chunks_exact_mut(3) {
        let p0 = Vec3::from(triangle[0].position);
        let p1 = Vec3::from(triangle[1].position);
        let p2 = Vec3::from(triangle[2].position);
        let uv0 = Vec2::from(triangle[0].tex_coord);
        let uv1 = Vec2::from(triangle[1].tex_coord);
        let uv2 = Vec2::from(triangle[2].tex_coord);

        let delta_pos1 = p1 - p0;
        let delta_pos2 = p2 - p0;
        let delta_uv1 = uv1 - uv0;
        let delta_uv2 = uv2 - uv0;

        let determinant = delta_uv1.x * delta_uv2.y - delta_uv1.y * delta_uv2.x;
        let (tangent, bitangent) = if determinant.abs() <= f32::EPSILON {
            (Vec3::zeros(), Vec3::zeros())
        } else {
            let r = 1.0 / determinant;
            (
                (delta_pos1 * delta_uv2.y - delta_pos2 * delta_uv1.y) * r,
                (delta_pos2 * delta_uv1.x - delta_pos1 * delta_uv2.x) * r,
            )
        };

        for vertex in triangle.iter_mut() {
            vertex.tangent = [tangent.x, tangent.y, tangent.z];
            vertex.bitangent = [bitangent.x, bitangent.y, bitangent.z];
        }
    }
}
