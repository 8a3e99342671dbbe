use asterixia_math::{Ray, invert, screen_to_ndc, unproject_ray};
use asterixia_render_bridge::CameraState;
use glam::{Mat4, Vec2, Vec3};

use crate::CameraPose;

pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// View/projection for the current frame plus the inverses picking needs.
///
/// Written once per frame before picking and drawing. When either matrix is
/// singular (or the viewport is empty) the camera is invalid for the frame.
#[derive(Debug, Clone)]
pub struct CameraPipeline {
    viewport: Vec2,
    view: Mat4,
    projection: Mat4,
    inv_view: Mat4,
    inv_projection: Mat4,
    position: Vec3,
    valid: bool,
}

impl Default for CameraPipeline {
    fn default() -> Self {
        Self {
            viewport: Vec2::ZERO,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            inv_view: Mat4::IDENTITY,
            inv_projection: Mat4::IDENTITY,
            position: Vec3::ZERO,
            valid: false,
        }
    }
}

impl CameraPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn update(&mut self, pose: &CameraPose, vertical_fov_deg: f32) {
        self.valid = false;
        if self.viewport.x <= 0.0 || self.viewport.y <= 0.0 {
            log::trace!("camera skipped: empty viewport");
            return;
        }

        let Some(view) = invert(pose.to_mat4()) else {
            log::debug!("camera pose is not invertible");
            return;
        };
        let aspect = self.viewport.x / self.viewport.y;
        let fov = vertical_fov_deg.clamp(1.0, 179.0).to_radians();
        let projection = Mat4::perspective_rh_gl(fov, aspect, NEAR_PLANE, FAR_PLANE);

        self.view = view;
        self.projection = projection;
        let (Some(inv_view), Some(inv_projection)) = (invert(view), invert(projection)) else {
            log::debug!("camera matrices are not invertible this frame");
            return;
        };
        self.inv_view = inv_view;
        self.inv_projection = inv_projection;
        self.position = inv_view.w_axis.truncate();
        self.valid = true;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// World-space camera position, taken from the inverse view.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn state(&self) -> CameraState {
        CameraState {
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            position: self.position.to_array(),
        }
    }

    /// World ray under a viewport pixel. `None` while the camera is invalid.
    pub fn screen_ray(&self, screen: Vec2) -> Option<Ray> {
        if !self.valid {
            return None;
        }
        let ndc = screen_to_ndc(screen, self.viewport);
        unproject_ray(ndc, self.inv_projection, self.inv_view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn empty_viewport_is_invalid() {
        let mut camera = CameraPipeline::new();
        camera.update(&CameraPose::default(), 60.0);
        assert!(!camera.is_valid());
        assert!(camera.screen_ray(Vec2::ZERO).is_none());
    }

    #[test]
    fn view_is_inverse_of_pose() {
        let mut camera = CameraPipeline::new();
        camera.set_viewport(800, 600);
        let pose = CameraPose {
            position: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_y(0.3),
        };
        camera.update(&pose, 60.0);
        assert!(camera.is_valid());
        let world = camera.view().inverse().transform_point3(Vec3::ZERO);
        assert!((world - pose.position).length() < 1e-4);
        assert!((camera.position() - pose.position).length() < 1e-4);
    }

    #[test]
    fn projection_uses_viewport_aspect() {
        let mut camera = CameraPipeline::new();
        camera.set_viewport(1600, 800);
        camera.update(&CameraPose::default(), 90.0);
        let p = camera.projection();
        // x scale = y scale / aspect
        assert!((p.x_axis.x * 2.0 - p.y_axis.y).abs() < 1e-5);
    }

    #[test]
    fn centre_pixel_ray_points_forward() {
        let mut camera = CameraPipeline::new();
        camera.set_viewport(400, 400);
        camera.update(&CameraPose::default(), 60.0);
        let ray = camera.screen_ray(Vec2::new(200.0, 200.0)).expect("valid camera");
        let dir = ray.direction.normalize();
        assert!((dir - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn state_carries_position() {
        let mut camera = CameraPipeline::new();
        camera.set_viewport(10, 10);
        camera.update(
            &CameraPose {
                position: Vec3::new(0.0, 1.5, 0.0),
                rotation: Quat::IDENTITY,
            },
            60.0,
        );
        assert_eq!(camera.state().position, [0.0, 1.5, 0.0]);
    }
}
