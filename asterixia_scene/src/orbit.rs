use asterixia_ids::NodeID;
use glam::{Mat3, Vec3};

use crate::nodes::guide_line::DEFAULT_LINE_WIDTH;
use crate::{Color, GuideLineDesc, SceneGraph};

pub const ORBIT_SEGMENTS: usize = 360;

#[derive(Clone, Debug, PartialEq)]
pub struct OrbitalPathDesc {
    pub planet_name: String,
    pub center: Vec3,
    pub semi_major_axis: f32,
    pub semi_minor_axis: f32,
    pub inclination_deg: f32,
    pub color: Color,
}

impl Default for OrbitalPathDesc {
    fn default() -> Self {
        Self {
            planet_name: String::new(),
            center: Vec3::ZERO,
            semi_major_axis: 1.0,
            semi_minor_axis: 1.0,
            inclination_deg: 0.0,
            color: Color::WHITE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GuideCircleDesc {
    pub name: String,
    pub radius: f32,
    pub color: Color,
    pub thickness: f32,
    /// Tilt about the world X axis, degrees, same sense as orbit inclination.
    pub tilt_deg: f32,
    /// Rotation about the world Y axis, degrees.
    pub rotation_deg: f32,
}

impl Default for GuideCircleDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            radius: 1.0,
            color: Color::YELLOW,
            thickness: 0.01,
            tilt_deg: 0.0,
            rotation_deg: 0.0,
        }
    }
}

/// Closed ellipse in the XZ plane, tilted about X by `inclination_deg`.
///
/// Emits one point per degree and repeats the first point at the end, so the
/// result always has `ORBIT_SEGMENTS + 1` entries.
pub fn orbital_path_points(
    center: Vec3,
    semi_major_axis: f32,
    semi_minor_axis: f32,
    inclination_deg: f32,
) -> Vec<Vec3> {
    let (sin_inc, cos_inc) = inclination_deg.to_radians().sin_cos();
    let mut points = Vec::with_capacity(ORBIT_SEGMENTS + 1);
    for i in 0..ORBIT_SEGMENTS {
        let angle = (i as f32 * 360.0 / ORBIT_SEGMENTS as f32).to_radians();
        let x = semi_major_axis * angle.cos();
        let z = semi_minor_axis * angle.sin();
        points.push(center + Vec3::new(x, z * sin_inc, z * cos_inc));
    }
    points.push(points[0]);
    points
}

impl SceneGraph {
    /// Adds the orbit of `planet_name` as a guide line named `"{planet}_orbit"`.
    pub fn add_orbital_path(&mut self, desc: OrbitalPathDesc) -> NodeID {
        let points = orbital_path_points(
            desc.center,
            desc.semi_major_axis,
            desc.semi_minor_axis,
            desc.inclination_deg,
        );
        self.add_guide_line(GuideLineDesc {
            name: format!("{}_orbit", desc.planet_name),
            points,
            color: desc.color,
            width: DEFAULT_LINE_WIDTH,
            dashed: false,
        })
    }

    /// Reference circle around the origin, e.g. an equator or ecliptic ring.
    pub fn add_guide_circle(&mut self, desc: GuideCircleDesc) -> NodeID {
        let spin = Mat3::from_rotation_y(desc.rotation_deg.to_radians());
        let points = orbital_path_points(Vec3::ZERO, desc.radius, desc.radius, desc.tilt_deg)
            .into_iter()
            .map(|p| spin * p)
            .collect();
        self.add_guide_line(GuideLineDesc {
            name: desc.name,
            points,
            color: desc.color,
            width: desc.thickness,
            dashed: false,
        })
    }

    /// Open polyline between stars of a constellation.
    pub fn add_constellation_line(
        &mut self,
        name: impl Into<String>,
        points: Vec<Vec3>,
        color: Color,
        width: f32,
    ) -> NodeID {
        self.add_guide_line(GuideLineDesc {
            name: name.into(),
            points,
            color,
            width,
            dashed: false,
        })
    }
}
