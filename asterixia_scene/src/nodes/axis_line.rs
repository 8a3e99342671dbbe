use crate::Color;
use crate::nodes::celestial_body::finite_or;

pub const DEFAULT_AXIS_ROTATION_SPEED_DEG: f32 = 10.0;
const MIN_AXIS_LENGTH: f32 = 1.0e-4;

#[derive(Clone, Debug, PartialEq)]
pub struct AxisLineDesc {
    pub name: String,
    /// Name of the body this axis follows. Resolved every frame.
    pub attached_body: String,
    pub length: f32,
    pub tilt_deg: f32,
    pub color: Color,
    pub show_rotation: bool,
}

impl Default for AxisLineDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            attached_body: String::new(),
            length: 1.0,
            tilt_deg: 0.0,
            color: Color::CYAN,
            show_rotation: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AxisLine {
    pub name: String,
    pub attached_body: String,
    pub length: f32,
    pub tilt_deg: f32,
    pub color: Color,
    pub show_rotation: bool,
    /// Accumulated spin in degrees, kept in [0, 360) by the animation clock.
    pub rotation_angle_deg: f32,
    pub rotation_speed_deg_per_sec: f32,
}

impl AxisLine {
    pub fn from_desc(desc: AxisLineDesc) -> Self {
        Self {
            name: desc.name,
            attached_body: desc.attached_body,
            length: finite_or(desc.length, 1.0).max(MIN_AXIS_LENGTH),
            tilt_deg: finite_or(desc.tilt_deg, 0.0),
            color: desc.color,
            show_rotation: desc.show_rotation,
            rotation_angle_deg: 0.0,
            rotation_speed_deg_per_sec: DEFAULT_AXIS_ROTATION_SPEED_DEG,
        }
    }

    /// Local-space endpoints, centred on the attached body.
    pub fn endpoints(&self) -> ([f32; 3], [f32; 3]) {
        let half = self.length * 0.5;
        ([0.0, -half, 0.0], [0.0, half, 0.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_is_clamped_positive() {
        let axis = AxisLine::from_desc(AxisLineDesc {
            length: 0.0,
            ..Default::default()
        });
        assert!(axis.length > 0.0);
    }

    #[test]
    fn endpoints_straddle_origin() {
        let axis = AxisLine::from_desc(AxisLineDesc {
            length: 2.0,
            ..Default::default()
        });
        assert_eq!(axis.endpoints(), ([0.0, -1.0, 0.0], [0.0, 1.0, 0.0]));
        assert_eq!(axis.rotation_speed_deg_per_sec, 10.0);
        assert_eq!(axis.color, Color::CYAN);
    }
}
