//! Screen-facing ribbons for axis and guide lines. Each segment becomes a quad
//! of two triangles whose width is measured in world units.

use asterixia_render_bridge::LineDrawCommand;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

const EPS: f32 = 1.0e-6;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

/// Appends the ribbon triangles for `lines` and returns how many vertices were
/// written. Zero-length segments and non-positive widths produce nothing.
pub fn expand_ribbon(lines: &LineDrawCommand, eye: Vec3, out: &mut Vec<LineVertex>) -> u32 {
    if !lines.width.is_finite() || lines.width <= 0.0 {
        return 0;
    }
    let model = Mat4::from_cols_array_2d(&lines.model);
    let half = lines.width * 0.5;
    let color = lines.color;
    let start = out.len();

    for [a, b] in &lines.segments {
        let a = model.transform_point3(Vec3::from(*a));
        let b = model.transform_point3(Vec3::from(*b));
        let dir = b - a;
        let len = dir.length();
        if !len.is_finite() || len <= EPS {
            continue;
        }
        let tangent = dir / len;
        let offset = side_direction(tangent, eye - (a + b) * 0.5) * half;

        let corners = [a + offset, a - offset, b + offset, b + offset, a - offset, b - offset];
        out.extend(corners.iter().map(|p| LineVertex {
            pos: p.to_array(),
            color,
        }));
    }

    (out.len() - start) as u32
}

fn side_direction(tangent: Vec3, to_eye: Vec3) -> Vec3 {
    let to_eye = to_eye.try_normalize().unwrap_or(Vec3::Z);
    if let Some(side) = tangent.cross(to_eye).try_normalize() {
        return side;
    }
    tangent
        .cross(Vec3::Y)
        .try_normalize()
        .or_else(|| tangent.cross(Vec3::Z).try_normalize())
        .unwrap_or(Vec3::X)
}
