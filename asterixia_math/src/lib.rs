//! Small geometry helpers shared by the camera, picking and compositor code.
//! Everything works on glam value types so callers keep matrices in locals.

pub mod ray;
pub mod transform;

pub use ray::{Ray, ray_sphere_intersection};
pub use transform::{
    invert, screen_to_ndc, transform_point, unproject_ray, wrap_degrees_once,
};

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
