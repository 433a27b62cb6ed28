//! File-backed asset provider: OBJ models and PNG textures

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use scene_engine::assets::{AssetError, AssetProvider, ImageData};
use scene_engine::render::primitives::compute_tangent_basis;
use scene_engine::render::{Mesh, Vertex};

/// Loads assets relative to a root directory
#[derive(Debug, Clone)]
pub struct FileAssets {
    root: PathBuf,
}

impl FileAssets {
    /// Provider resolving paths under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AssetError> {
        let full = self.root.join(path);
        if full.is_file() {
            Ok(full)
        } else {
            Err(AssetError::NotFound(full.display().to_string()))
        }
    }
}

impl AssetProvider for FileAssets {
    fn load_model(&mut self, path: &str) -> Result<Mesh, AssetError> {
        let full = self.resolve(path)?;
        let mesh = parse_obj(BufReader::new(File::open(&full)?))?;
        log::info!(
            "Loaded model {:?}: {} vertices, {} indices",
            full,
            mesh.vertex_count(),
            mesh.index_count()
        );
        Ok(mesh)
    }

    fn load_texture(&mut self, path: &str) -> Result<ImageData, AssetError> {
        let full = self.resolve(path)?;
        load_png(&full)
    }
}

/// Decode an image file into RGBA8
pub fn load_png(path: &Path) -> Result<ImageData, AssetError> {
    log::debug!("Loading image from: {:?}", path);

    let img = image::open(path)
        .map_err(|e| AssetError::LoadFailed(format!("Failed to load image {}: {}", path.display(), e)))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();

    log::info!("Loaded image {}x{} from {:?}", width, height, path);
    ImageData::from_rgba(width, height, rgba.into_raw())
}

/// Parse Wavefront OBJ text into a triangle mesh
///
/// Faces with more than three corners are fan-triangulated. Missing texture
/// coordinates default to zero, missing normals to +Y. Negative indices
/// count back from the most recent element. Every triangle gets its own
/// three vertices so it can carry its own tangent frame.
pub fn parse_obj(reader: impl BufRead) -> Result<Mesh, AssetError> {
    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut vertices = Vec::new();
    let mut corners = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let fields: Vec<&str> = parts.collect();
        let at = line_number + 1;

        match keyword {
            "v" => positions.push(parse_floats(&fields, at)?),
            "vn" => normals.push(parse_floats(&fields, at)?),
            "vt" => tex_coords.push(parse_floats(&fields, at)?),
            "f" => {
                if fields.len() < 3 {
                    return Err(AssetError::InvalidData(format!(
                        "line {}: face needs at least three corners",
                        at
                    )));
                }

                corners.clear();
                for corner in &fields {
                    let mut refs = corner.split('/');
                    let position = lookup(&positions, refs.next(), at)?
                        .ok_or_else(|| AssetError::InvalidData(format!("line {}: face corner without position", at)))?;
                    let tex_coord = lookup(&tex_coords, refs.next(), at)?.unwrap_or([0.0, 0.0]);
                    let normal = lookup(&normals, refs.next(), at)?.unwrap_or([0.0, 1.0, 0.0]);
                    corners.push(Vertex::new(position, normal, tex_coord));
                }

                for i in 1..corners.len() - 1 {
                    vertices.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    if vertices.is_empty() {
        return Err(AssetError::InvalidData("No vertices found in OBJ file".to_string()));
    }

    compute_tangent_basis(&mut vertices);
    let vertex_count = u32::try_from(vertices.len())
        .map_err(|_| AssetError::InvalidData("too many vertices in OBJ file".to_string()))?;
    Ok(Mesh::new(vertices, (0..vertex_count).collect()))
}

fn parse_floats<const N: usize>(fields: &[&str], at: usize) -> Result<[f32; N], AssetError> {
    let mut values = [0.0; N];
    if fields.len() < N {
        return Err(AssetError::InvalidData(format!(
            "line {}: expected {} values, found {}",
            at,
            N,
            fields.len()
        )));
    }
    for (value, field) in values.iter_mut().zip(fields) {
        *value = field
            .parse()
            .map_err(|_| AssetError::InvalidData(format!("line {}: '{}' is not a number", at, field)))?;
    }
    Ok(values)
}

fn lookup<T: Copy>(items: &[T], reference: Option<&str>, at: usize) -> Result<Option<T>, AssetError> {
    let Some(reference) = reference.filter(|r| !r.is_empty()) else {
        return Ok(None);
    };
    let index: i64 = reference
        .parse()
        .map_err(|_| AssetError::InvalidData(format!("line {}: bad index '{}'", at, reference)))?;

    let resolved = match index {
        0 => None,
        i if i > 0 => usize::try_from(i - 1).ok(),
        i => usize::try_from(items.len() as i64 + i).ok(),
    };
    resolved
        .and_then(|i| items.get(i).copied())
        .map(Some)
        .ok_or_else(|| AssetError::InvalidData(format!("line {}: index {} out of bounds", at, index)))
}
