use asterixia_render_bridge::BackgroundState;
use bytemuck::{Pod, Zeroable};

/// Clip-space corners of the camera feed quad, drawn as a triangle strip.
pub const QUAD_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BackgroundVertex {
    pub pos: [f32; 2],
    pub uv: [f32; 2],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BackgroundUniform {
    pub brightness: f32,
    pub night_mode: u32,
    pub _pad: [f32; 2],
}

pub fn quad_vertices(uv: &[[f32; 2]; 4]) -> [BackgroundVertex; 4] {
    std::array::from_fn(|i| BackgroundVertex {
        pos: QUAD_CORNERS[i],
        uv: uv[i],
    })
}

impl From<&BackgroundState> for BackgroundUniform {
    fn from(state: &BackgroundState) -> Self {
        let brightness = if state.night_mode {
            state.brightness.clamp(0.1, 1.0)
        } else {
            1.0
        };
        Self {
            brightness,
            night_mode: state.night_mode as u32,
            _pad: [0.0; 2],
        }
    }
}

/// Latest camera image waiting for upload.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraImageUpload {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl CameraImageUpload {
    /// Accepts only tightly packed RGBA8 of a non-empty size.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, crate::GraphicsError> {
        let expected = width as usize * height as usize * 4;
        if width == 0 || height == 0 || rgba.len() != expected {
            return Err(crate::GraphicsError::CameraImageSize {
                width,
                height,
                len: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asterixia_render_bridge::DEFAULT_BACKGROUND_UV;

    #[test]
    fn quad_pairs_corners_with_uvs() {
        let quad = quad_vertices(&DEFAULT_BACKGROUND_UV);
        assert_eq!(quad[0].pos, [-1.0, -1.0]);
        assert_eq!(quad[0].uv, [1.0, 1.0]);
        assert_eq!(quad[3].pos, [1.0, 1.0]);
        assert_eq!(quad[3].uv, [0.0, 0.0]);
    }

    #[test]
    fn brightness_only_applies_at_night() {
        let day = BackgroundUniform::from(&BackgroundState {
            brightness: 0.3,
            ..Default::default()
        });
        assert_eq!(day.brightness, 1.0);
        assert_eq!(day.night_mode, 0);

        let night = BackgroundUniform::from(&BackgroundState {
            brightness: 0.01,
            night_mode: true,
            ..Default::default()
        });
        assert_eq!(night.brightness, 0.1);
        assert_eq!(night.night_mode, 1);
    }

    #[test]
    fn camera_image_must_be_packed_rgba() {
        assert!(CameraImageUpload::new(2, 2, vec![0; 16]).is_ok());
        assert!(CameraImageUpload::new(2, 2, vec![0; 12]).is_err());
        assert!(CameraImageUpload::new(0, 2, Vec::new()).is_err());
    }
}
