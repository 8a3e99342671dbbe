use crate::mesh::{BUNDLED_SPHERE_BANDS, FALLBACK_SPHERE_BANDS, MeshData, MeshVertex, uv_sphere};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Edge length of the solid texture generated for bodies without an image.
pub const SOLID_TEXTURE_SIZE: u32 = 64;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset `{0}` not found")]
    NotFound(String),
    #[error("failed to read asset `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("model `{name}` is unusable: {reason}")]
    Model { name: String, reason: String },
    #[error("texture `{name}` could not be decoded: {source}")]
    Texture {
        name: String,
        #[source]
        source: image::ImageError,
    },
}

/// Where model and texture bytes come from. Paths are relative, e.g.
/// `models/earth.glb` or `textures/earth.png`.
pub trait AssetSource {
    fn read(&self, relative: &str) -> Result<Vec<u8>, AssetError>;
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirAssetSource {
    root: PathBuf,
}

impl DirAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssetSource {
    fn read(&self, relative: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.root.join(relative);
        std::fs::read(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(relative.to_string())
            } else {
                AssetError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })
    }
}

/// Source with no assets at all; every body gets the procedural fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn read(&self, relative: &str) -> Result<Vec<u8>, AssetError> {
        Err(AssetError::NotFound(relative.to_string()))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    pub fn solid(color: [u8; 4], size: u32) -> Self {
        let size = size.max(1);
        let rgba = color.repeat((size * size) as usize);
        Self {
            width: size,
            height: size,
            rgba,
        }
    }
}

/// Everything the GPU needs to draw one kind of body.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyAsset {
    pub name: String,
    pub mesh: MeshData,
    pub texture: TextureData,
}

/// Fallback RGBA color for a lowercased body name.
pub fn default_color_for(name: &str) -> [u8; 4] {
    let rgb: u32 = match name {
        "sun" => 0xFFD700,
        "mercury" => 0x8C7853,
        "venus" => 0xFFC649,
        "earth" => 0x4169E1,
        "mars" => 0xCD5C5C,
        "jupiter" => 0xC88B3A,
        "saturn" => 0xFAD5A5,
        "uranus" => 0x4FD0E7,
        "neptune" => 0x4166F5,
        "moon" => 0xE0E0E0,
        _ => 0xFFFFFF,
    };
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xFF]
}

/// Resolves the mesh and texture for `name`. Never fails: a missing model gives
/// the fallback sphere, an unreadable one the bundled sphere, and a missing
/// texture a solid texture in the body's default color.
pub fn load_body_asset(assets: &dyn AssetSource, name: &str) -> BodyAsset {
    let key = name.trim().to_lowercase();

    let mesh = match load_model(assets, &key) {
        Ok(mesh) => mesh,
        Err(AssetError::NotFound(path)) => {
            log::warn!("no model at `{path}`, using fallback sphere for `{key}`");
            uv_sphere(FALLBACK_SPHERE_BANDS, FALLBACK_SPHERE_BANDS)
        }
        Err(err) => {
            log::warn!("{err}; using sphere for `{key}`");
            uv_sphere(BUNDLED_SPHERE_BANDS, BUNDLED_SPHERE_BANDS)
        }
    };

    let texture = match load_texture(assets, &key) {
        Ok(texture) => texture,
        Err(err) => {
            log::warn!("{err}; using solid color for `{key}`");
            TextureData::solid(default_color_for(&key), SOLID_TEXTURE_SIZE)
        }
    };

    BodyAsset {
        name: key,
        mesh,
        texture,
    }
}

fn load_model(assets: &dyn AssetSource, key: &str) -> Result<MeshData, AssetError> {
    let bytes = assets.read(&format!("models/{key}.glb"))?;
    mesh_from_glb(&bytes).map_err(|reason| AssetError::Model {
        name: key.to_string(),
        reason,
    })
}

fn load_texture(assets: &dyn AssetSource, key: &str) -> Result<TextureData, AssetError> {
    let bytes = assets.read(&format!("textures/{key}.png"))?;
    let image = image::load_from_memory(&bytes).map_err(|source| AssetError::Texture {
        name: key.to_string(),
        source,
    })?;
    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureData {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

/// First primitive of the first mesh in a binary glTF. Missing normals fall
/// back to the normalized position, missing UVs to zero, missing indices to a
/// plain triangle list.
pub fn mesh_from_glb(bytes: &[u8]) -> Result<MeshData, String> {
    let gltf = gltf::Gltf::from_slice(bytes).map_err(|err| err.to_string())?;
    let blob = gltf
        .blob
        .as_deref()
        .ok_or_else(|| "no embedded binary chunk".to_string())?;
    let mesh = gltf
        .meshes()
        .next()
        .ok_or_else(|| "no meshes".to_string())?;
    let primitive = mesh
        .primitives()
        .next()
        .ok_or_else(|| "mesh has no primitives".to_string())?;
    let reader = primitive.reader(|_| Some(blob));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()
        .ok_or_else(|| "primitive has no positions".to_string())?
        .collect();
    if positions.is_empty() {
        return Err("primitive has no positions".to_string());
    }
    let normals: Vec<[f32; 3]> = reader
        .read_normals()
        .map(|n| n.collect())
        .unwrap_or_default();
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(0)
        .map(|t| t.into_f32().collect())
        .unwrap_or_default();

    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &pos)| MeshVertex {
            pos,
            normal: normals
                .get(i)
                .copied()
                .unwrap_or_else(|| glam::Vec3::from(pos).normalize_or_zero().to_array()),
            uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
        })
        .collect::<Vec<_>>();
    let indices = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..vertices.len() as u32).collect(),
    };

    let mesh = MeshData { vertices, indices };
    if mesh.is_empty() || !mesh.indices_in_bounds() {
        return Err("primitive indices out of range".to_string());
    }
    Ok(mesh)
}
