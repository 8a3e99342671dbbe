use asterixia_ids::mix64;
use asterixia_runtime::{
    ArFrame, ArSession, CameraImage, CameraPose, SessionError, SessionOptions, TrackingState,
};
use glam::{Quat, Vec3};
use std::time::Instant;

const SWAY_DEGREES: f32 = 15.0;
const SWAY_RATE: f32 = 0.2;
const MAX_IMAGE_SIDE: u32 = 1024;
const STAR_SEED: u64 = 0x5EED_0F_57A2;
/// Stars per thousand pixels.
const STAR_DENSITY: u64 = 2;

/// Upright mapping for the generated sky image, in quad corner order
/// (bottom-left, bottom-right, top-left, top-right).
pub const UPRIGHT_UV: [[f32; 2]; 4] = [[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]];

/// Stand-in AR session for desktop preview. The camera sits at the origin and
/// sways slowly left and right; the camera feed is a generated starfield.
pub struct DesktopSession {
    vertical_fov_deg: f32,
    resumed: bool,
    configured: bool,
    started: Instant,
    paused_at: Option<Instant>,
    rotation: u32,
    size: (u32, u32),
    geometry_dirty: bool,
    image_dirty: bool,
}

impl DesktopSession {
    pub fn new(vertical_fov_deg: f32) -> Self {
        let now = Instant::now();
        Self {
            vertical_fov_deg,
            resumed: false,
            configured: false,
            started: now,
            paused_at: None,
            rotation: 0,
            size: (1, 1),
            geometry_dirty: true,
            image_dirty: true,
        }
    }

    /// Pose `seconds` into the session.
    pub fn pose_at(seconds: f32) -> CameraPose {
        let yaw = (seconds * SWAY_RATE).sin() * SWAY_DEGREES.to_radians();
        CameraPose {
            position: Vec3::ZERO,
            rotation: Quat::from_rotation_y(yaw),
        }
    }

    fn elapsed_seconds(&self) -> f32 {
        self.started.elapsed().as_secs_f32()
    }
}

impl ArSession for DesktopSession {
    fn configure(&mut self, options: &SessionOptions) -> Result<(), SessionError> {
        log::debug!("desktop session ignores {options:?}");
        self.configured = true;
        Ok(())
    }

    fn resume(&mut self) -> Result<(), SessionError> {
        if !self.configured {
            return Err(SessionError::NotInitialized);
        }
        // Shift the start so the sway continues where it stopped.
        if let Some(paused_at) = self.paused_at.take() {
            self.started += paused_at.elapsed();
        }
        self.resumed = true;
        self.image_dirty = true;
        Ok(())
    }

    fn pause(&mut self) {
        if self.resumed {
            self.paused_at = Some(Instant::now());
        }
        self.resumed = false;
    }

    fn set_display_geometry(&mut self, rotation: u32, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if rotation % 4 != self.rotation || size != self.size {
            self.rotation = rotation % 4;
            self.geometry_dirty = true;
            if size != self.size {
                self.size = size;
                self.image_dirty = true;
            }
        }
    }

    fn update(&mut self) -> Result<ArFrame, SessionError> {
        if !self.resumed {
            return Err(SessionError::FrameUnavailable(
                "desktop session is not running".into(),
            ));
        }

        let display_uv = if std::mem::take(&mut self.geometry_dirty) {
            Some(rotate_uv(UPRIGHT_UV, self.rotation))
        } else {
            None
        };
        let image = if std::mem::take(&mut self.image_dirty) {
            Some(starfield(self.size.0, self.size.1))
        } else {
            None
        };

        Ok(ArFrame {
            tracking: TrackingState::Tracking,
            pose: Self::pose_at(self.elapsed_seconds()),
            vertical_fov_deg: self.vertical_fov_deg,
            display_uv,
            image,
        })
    }
}

/// Rotates texture coordinates by whole quarter turns.
pub fn rotate_uv(uv: [[f32; 2]; 4], quarter_turns: u32) -> [[f32; 2]; 4] {
    let mut out = uv;
    for _ in 0..quarter_turns % 4 {
        for corner in &mut out {
            *corner = [corner[1], 1.0 - corner[0]];
        }
    }
    out
}

/// Night sky image: a dark vertical gradient with hashed stars. Sides are
/// capped so large windows do not upload huge textures.
pub fn starfield(width: u32, height: u32) -> CameraImage {
    let width = width.clamp(1, MAX_IMAGE_SIDE);
    let height = height.clamp(1, MAX_IMAGE_SIDE);
    let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        let t = y as f32 / height.max(2).saturating_sub(1) as f32;
        let sky = [
            (6.0 + 10.0 * (1.0 - t)) as u8,
            (8.0 + 14.0 * (1.0 - t)) as u8,
            (18.0 + 30.0 * (1.0 - t)) as u8,
        ];
        for x in 0..width {
            let hash = mix64(STAR_SEED ^ (((y as u64) << 32) | x as u64));
            if hash % 1000 < STAR_DENSITY {
                let level = 160 + ((hash >> 20) % 96) as u8;
                rgba.extend_from_slice(&[level, level, level.saturating_add(8), 255]);
            } else {
                rgba.extend_from_slice(&[sky[0], sky[1], sky[2], 255]);
            }
        }
    }
    CameraImage {
        width,
        height,
        rgba,
    }
}
