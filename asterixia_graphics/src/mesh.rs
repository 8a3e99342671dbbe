use bytemuck::{Pod, Zeroable};
use std::f32::consts::PI;

/// Bands used when a body has no usable model.
pub const FALLBACK_SPHERE_BANDS: u32 = 20;
/// Bands used for a bundled model file that carries no readable geometry.
pub const BUNDLED_SPHERE_BANDS: u32 = 30;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// True when every index refers to an existing vertex.
    pub fn indices_in_bounds(&self) -> bool {
        let count = self.vertices.len() as u32;
        self.indices.iter().all(|&i| i < count)
    }
}

/// Unit UV sphere. Rows run from the north pole (theta = 0) to the south pole,
/// columns sweep phi over a full turn with a duplicated seam column.
pub fn uv_sphere(lat_bands: u32, long_bands: u32) -> MeshData {
    let lat_bands = lat_bands.max(2);
    let long_bands = long_bands.max(3);
    let mut vertices = Vec::with_capacity(((lat_bands + 1) * (long_bands + 1)) as usize);

    for lat in 0..=lat_bands {
        let theta = lat as f32 * PI / lat_bands as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for long in 0..=long_bands {
            let phi = long as f32 * 2.0 * PI / long_bands as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let n = [cos_phi * sin_theta, cos_theta, sin_phi * sin_theta];
            vertices.push(MeshVertex {
                pos: n,
                normal: n,
                uv: [
                    long as f32 / long_bands as f32,
                    lat as f32 / lat_bands as f32,
                ],
            });
        }
    }

    let mut indices = Vec::with_capacity((lat_bands * long_bands * 6) as usize);
    for lat in 0..lat_bands {
        for long in 0..long_bands {
            let first = lat * (long_bands + 1) + long;
            let second = first + long_bands + 1;
            indices.extend_from_slice(&[first, second, first + 1]);
            indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    MeshData { vertices, indices }
}
