use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::Ray;

const SINGULAR_EPSILON: f32 = 1.0e-12;

/// General 4x4 inverse, `None` when the determinant is (near) zero.
pub fn invert(m: Mat4) -> Option<Mat4> {
    let det = m.determinant();
    if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
        return None;
    }
    Some(m.inverse())
}

/// Multiplies a homogeneous point and divides by w. `None` if w collapses.
pub fn transform_point(m: Mat4, p: Vec4) -> Option<Vec3> {
    let out = m * p;
    if out.w.abs() <= f32::EPSILON {
        return None;
    }
    Some(out.truncate() / out.w)
}

/// Viewport pixels to normalised device coordinates (Y up).
pub fn screen_to_ndc(screen: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(
        (screen.x / viewport.x) * 2.0 - 1.0,
        -((screen.y / viewport.y) * 2.0 - 1.0),
    )
}

/// Casts a world-space ray through an NDC point using GL clip conventions
/// (near plane at z = -1, far plane at z = +1).
///
/// Each clip point goes through the inverse projection, is divided by w, then
/// through the inverse view. The direction is far minus near, left unnormalised.
pub fn unproject_ray(ndc: Vec2, inv_projection: Mat4, inv_view: Mat4) -> Option<Ray> {
    let near_eye = transform_point(inv_projection, Vec4::new(ndc.x, ndc.y, -1.0, 1.0))?;
    let far_eye = transform_point(inv_projection, Vec4::new(ndc.x, ndc.y, 1.0, 1.0))?;
    let near = inv_view.transform_point3(near_eye);
    let far = inv_view.transform_point3(far_eye);
    Some(Ray::new(near, far - near))
}

/// Folds an angle that has just crossed 360 back by one turn.
/// Only a single turn is removed, so values above 720 stay above 360.
#[inline]
pub fn wrap_degrees_once(angle: f32) -> f32 {
    if angle > 360.0 { angle - 360.0 } else { angle }
}
