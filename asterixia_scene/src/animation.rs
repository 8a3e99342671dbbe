use asterixia_math::wrap_degrees_once;

use crate::SceneGraph;

/// Degrees the shared body spin advances per frame, independent of frame time.
pub const GLOBAL_SPIN_STEP_DEG: f32 = 0.5;

/// Per-frame animation state that is not stored on individual nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnimationClock {
    spin_deg: f32,
    frames: u64,
    elapsed: f32,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current global spin applied to every non-star body, degrees.
    pub fn spin_deg(&self) -> f32 {
        self.spin_deg
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advances axis rotations by `delta` seconds and the global spin by one
    /// fixed step.
    pub fn advance(&mut self, scene: &mut SceneGraph, delta: f32) {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        for (_, axis) in scene.axis_lines_mut() {
            if !axis.show_rotation {
                continue;
            }
            axis.rotation_angle_deg = wrap_degrees_once(
                axis.rotation_angle_deg + delta * axis.rotation_speed_deg_per_sec,
            );
        }
        self.spin_deg = wrap_degrees_once(self.spin_deg + GLOBAL_SPIN_STEP_DEG);
        self.frames += 1;
        self.elapsed += delta;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AxisLineDesc;

    #[test]
    fn axis_rotation_wraps_once() {
        let mut scene = SceneGraph::new();
        let id = scene.add_axis_line(AxisLineDesc::default());
        for (_, axis) in scene.axis_lines_mut() {
            axis.rotation_angle_deg = 350.0;
        }
        let mut clock = AnimationClock::new();
        clock.advance(&mut scene, 2.0);
        let angle = scene
            .axis_lines()
            .find(|(aid, _)| *aid == id)
            .map(|(_, a)| a.rotation_angle_deg)
            .expect("axis");
        assert!((angle - 10.0).abs() < 1e-4);
    }

    #[test]
    fn hidden_rotation_does_not_advance() {
        let mut scene = SceneGraph::new();
        scene.add_axis_line(AxisLineDesc {
            show_rotation: false,
            ..Default::default()
        });
        let mut clock = AnimationClock::new();
        clock.advance(&mut scene, 1.0);
        assert!(scene.axis_lines().all(|(_, a)| a.rotation_angle_deg == 0.0));
    }

    #[test]
    fn spin_ignores_delta_time() {
        let mut scene = SceneGraph::new();
        let mut clock = AnimationClock::new();
        clock.advance(&mut scene, 0.001);
        clock.advance(&mut scene, 3.0);
        assert_eq!(clock.spin_deg(), 1.0);
        assert_eq!(clock.frames(), 2);
    }

    #[test]
    fn spin_wraps_after_full_turn() {
        let mut scene = SceneGraph::new();
        let mut clock = AnimationClock::new();
        for _ in 0..721 {
            clock.advance(&mut scene, 0.016);
        }
        // 720 steps reach 360 exactly (not > 360), the next one wraps
        assert!((clock.spin_deg() - 0.5).abs() < 1e-3);
    }
}
