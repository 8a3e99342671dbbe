use glam::Vec3;

/// A ray in world space. `direction` is not required to be unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub const fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Nearest-root intersection of `ray` with a sphere.
///
/// Solves |o + t·d - c|² = r² and returns t = (-b - √disc) / 2a when it is
/// strictly positive. An origin inside the sphere yields a negative near root
/// and therefore no hit. `t` is in units of `ray.direction`.
pub fn ray_sphere_intersection(ray: &Ray, center: Vec3, radius: f32) -> Option<f32> {
    let oc = ray.origin - center;
    let a = ray.direction.dot(ray.direction);
    if a <= f32::EPSILON {
        return None;
    }
    let b = 2.0 * oc.dot(ray.direction);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let t = (-b - disc.sqrt()) / (2.0 * a);
    (t > 0.0).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_unit_sphere_head_on() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let t = ray_sphere_intersection(&ray, Vec3::ZERO, 1.0).expect("should hit");
        assert!((t - 4.0).abs() < 1e-5);
        assert!((ray.at(t) - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn sphere_behind_origin_is_not_hit() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::NEG_Z);
        assert_eq!(ray_sphere_intersection(&ray, Vec3::ZERO, 1.0), None);
    }

    #[test]
    fn offset_ray_misses() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, -5.0), Vec3::Z);
        assert_eq!(ray_sphere_intersection(&ray, Vec3::ZERO, 1.0), None);
    }

    #[test]
    fn t_scales_with_unnormalised_direction() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::new(0.0, 0.0, 2.0));
        let t = ray_sphere_intersection(&ray, Vec3::ZERO, 1.0).expect("should hit");
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn origin_inside_sphere_reports_no_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(ray_sphere_intersection(&ray, Vec3::ZERO, 1.0), None);
    }

    #[test]
    fn degenerate_direction_is_ignored() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO);
        assert_eq!(ray_sphere_intersection(&ray, Vec3::ZERO, 1.0), None);
    }
}
