use glam::{Mat4, Quat, Vec3};

use crate::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackingState {
    Tracking,
    Paused,
    Stopped,
}

/// Options the host passes when starting a session. The core does not act on
/// them; they are forwarded to the session implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub plane_detection: bool,
    pub light_estimation: bool,
    pub auto_focus: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            plane_detection: true,
            light_estimation: true,
            auto_focus: true,
        }
    }
}

/// Camera pose in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for CameraPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl CameraPose {
    /// Camera to world.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rotation, self.position)
    }

    /// Pose at `position` looking at `target`, up = +Y.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let view = Mat4::look_at_rh(position, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        Self { position, rotation }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CameraImage {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA8.
    pub rgba: Vec<u8>,
}

/// Everything the core reads from the session for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ArFrame {
    pub tracking: TrackingState,
    pub pose: CameraPose,
    pub vertical_fov_deg: f32,
    /// New background UVs when display geometry changed since the last frame.
    pub display_uv: Option<[[f32; 2]; 4]>,
    pub image: Option<CameraImage>,
}

/// Platform AR session: pose tracking and camera frames.
pub trait ArSession {
    fn configure(&mut self, options: &SessionOptions) -> Result<(), SessionError>;

    fn resume(&mut self) -> Result<(), SessionError>;

    fn pause(&mut self);

    /// Surface rotation in quarter turns plus the viewport size in pixels.
    fn set_display_geometry(&mut self, rotation: u32, width: u32, height: u32);

    fn update(&mut self) -> Result<ArFrame, SessionError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn looking_at_faces_target() {
        let pose = CameraPose::looking_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let forward = pose.rotation * Vec3::NEG_Z;
        assert!((forward - Vec3::NEG_Z).length() < 1e-5);
        let m = pose.to_mat4();
        assert!((m.transform_point3(Vec3::ZERO) - pose.position).length() < 1e-5);
    }
}
