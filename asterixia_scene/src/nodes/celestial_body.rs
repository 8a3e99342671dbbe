use glam::Vec3;

use crate::{BodyKind, Color};

/// Input for [`crate::SceneGraph::add_celestial_body`]. Defaults match what a
/// host gets when it leaves a field out.
#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBodyDesc {
    pub name: String,
    pub position: Vec3,
    pub base_scale: f32,
    pub color: Color,
    pub kind: BodyKind,
    pub glow_intensity: f32,
    /// AU from the observer; 0 disables distance scaling.
    pub real_distance: f64,
}

impl Default for CelestialBodyDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            position: Vec3::ZERO,
            base_scale: 1.0,
            color: Color::WHITE,
            kind: BodyKind::Planet,
            glow_intensity: 0.5,
            real_distance: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CelestialBody {
    pub name: String,
    pub position: Vec3,
    pub base_scale: f32,
    /// Fixed at creation from `base_scale`, `kind` and `real_distance`.
    pub effective_scale: f32,
    pub color: Color,
    pub glow_intensity: f32,
    pub kind: BodyKind,
    pub real_distance: f64,
}

impl CelestialBody {
    pub fn from_desc(desc: CelestialBodyDesc) -> Self {
        let base_scale = finite_or(desc.base_scale, 1.0).max(0.0);
        let real_distance = if desc.real_distance.is_finite() {
            desc.real_distance.max(0.0)
        } else {
            0.0
        };
        Self {
            effective_scale: desc.kind.scale_for(base_scale, real_distance),
            name: desc.name,
            position: sanitize_vec3(desc.position),
            base_scale,
            color: desc.color,
            glow_intensity: finite_or(desc.glow_intensity, 0.0).max(0.0),
            kind: desc.kind,
            real_distance,
        }
    }

    /// Radius used when testing taps against this body.
    #[inline]
    pub fn pick_radius(&self) -> f32 {
        self.effective_scale * 1.5
    }

    /// Asset key for the body's mesh and texture.
    pub fn mesh_key(&self) -> String {
        self.name.trim().to_lowercase()
    }
}

pub(crate) fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() { v } else { fallback }
}

pub(crate) fn sanitize_vec3(v: Vec3) -> Vec3 {
    Vec3::new(finite_or(v.x, 0.0), finite_or(v.y, 0.0), finite_or(v.z, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_scale_is_computed_once_from_kind() {
        let body = CelestialBody::from_desc(CelestialBodyDesc {
            name: "Sirius".into(),
            base_scale: 0.2,
            kind: BodyKind::Star,
            real_distance: 543_000.0,
            ..Default::default()
        });
        assert_eq!(body.effective_scale, 0.4);
        assert!((body.pick_radius() - 0.6).abs() < 1e-6);
    }

    #[test]
    fn non_finite_inputs_are_sanitised() {
        let body = CelestialBody::from_desc(CelestialBodyDesc {
            position: Vec3::new(f32::NAN, 1.0, f32::INFINITY),
            glow_intensity: -3.0,
            real_distance: f64::NAN,
            ..Default::default()
        });
        assert_eq!(body.position, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(body.glow_intensity, 0.0);
        assert_eq!(body.real_distance, 0.0);
        assert_eq!(body.effective_scale, 1.0);
    }

    #[test]
    fn mesh_key_is_lowercased_name() {
        let body = CelestialBody::from_desc(CelestialBodyDesc {
            name: " Earth".into(),
            ..Default::default()
        });
        assert_eq!(body.mesh_key(), "earth");
    }
}
