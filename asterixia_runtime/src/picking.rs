use asterixia_ids::NodeID;
use asterixia_math::{Ray, ray_sphere_intersection};
use asterixia_scene::SceneGraph;

pub const TAP_DEBOUNCE_MS: u64 = 300;

/// Drops any tap that arrives within the debounce window of the last
/// processed tap. A processed tap resets the window whether it hits or not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapDebouncer {
    window_ms: u64,
    last_ms: Option<u64>,
}

impl Default for TapDebouncer {
    fn default() -> Self {
        Self::new(TAP_DEBOUNCE_MS)
    }
}

impl TapDebouncer {
    pub const fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_ms: None,
        }
    }

    /// `true` if the tap at `now_ms` should be processed; records it if so.
    pub fn accept(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_ms {
            if now_ms.saturating_sub(last) < self.window_ms {
                return false;
            }
        }
        self.last_ms = Some(now_ms);
        true
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PickHit {
    pub id: NodeID,
    pub name: String,
    /// Ray parameter in units of the (unnormalised) ray direction.
    pub t: f32,
}

/// Nearest celestial body hit by `ray`, testing each body as a sphere of
/// radius `effective_scale * 1.5`.
pub fn pick_body(scene: &SceneGraph, ray: &Ray) -> Option<PickHit> {
    let mut best: Option<(NodeID, f32)> = None;
    for (id, body) in scene.celestial_bodies() {
        let Some(t) = ray_sphere_intersection(ray, body.position, body.pick_radius()) else {
            continue;
        };
        if best.is_none_or(|(_, best_t)| t < best_t) {
            best = Some((id, t));
        }
    }
    let (id, t) = best?;
    let name = scene.celestial_body(id)?.name.clone();
    Some(PickHit { id, name, t })
}

#[cfg(test)]
mod tests {
    use super::*;
    use asterixia_scene::{BodyKind, CelestialBodyDesc};
    use glam::Vec3;

    fn add(scene: &mut SceneGraph, name: &str, position: Vec3, scale: f32) -> NodeID {
        scene.add_celestial_body(CelestialBodyDesc {
            name: name.into(),
            position,
            base_scale: scale,
            kind: BodyKind::Planet,
            ..Default::default()
        })
    }

    #[test]
    fn debounce_window() {
        let mut debounce = TapDebouncer::default();
        assert!(debounce.accept(0));
        assert!(!debounce.accept(100));
        assert!(debounce.accept(400));
        assert!(!debounce.accept(699));
        assert!(debounce.accept(700));
    }

    #[test]
    fn first_tap_is_always_accepted() {
        let mut debounce = TapDebouncer::default();
        assert!(debounce.accept(5));
    }

    #[test]
    fn nearest_body_wins() {
        let mut scene = SceneGraph::new();
        add(&mut scene, "Far", Vec3::new(0.0, 0.0, -10.0), 1.0);
        let near = add(&mut scene, "Near", Vec3::new(0.0, 0.0, -4.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        let hit = pick_body(&scene, &ray).expect("hit");
        assert_eq!(hit.id, near);
        assert_eq!(hit.name, "Near");
        // radius 1.5 => front surface at z = -2.5
        assert!((hit.t - 2.5).abs() < 1e-4);
    }

    #[test]
    fn tolerance_extends_past_visual_radius() {
        let mut scene = SceneGraph::new();
        add(&mut scene, "Mars", Vec3::new(1.3, 0.0, -5.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(pick_body(&scene, &ray).is_some());
    }

    #[test]
    fn bodies_behind_camera_are_ignored() {
        let mut scene = SceneGraph::new();
        add(&mut scene, "Behind", Vec3::new(0.0, 0.0, 5.0), 1.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(pick_body(&scene, &ray).is_none());
    }

    #[test]
    fn empty_scene_has_no_hit() {
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!(pick_body(&SceneGraph::new(), &ray).is_none());
    }
}
