use glam::Vec3;

use crate::Color;
use crate::nodes::celestial_body::{finite_or, sanitize_vec3};

pub const DEFAULT_LINE_WIDTH: f32 = 0.005;

#[derive(Clone, Debug, PartialEq)]
pub struct GuideLineDesc {
    pub name: String,
    pub points: Vec<Vec3>,
    pub color: Color,
    pub width: f32,
    /// Advisory only; lines are always drawn solid.
    pub dashed: bool,
}

impl Default for GuideLineDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            points: Vec::new(),
            color: Color::WHITE,
            width: DEFAULT_LINE_WIDTH,
            dashed: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GuideLine {
    pub name: String,
    pub points: Vec<Vec3>,
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
}

impl GuideLine {
    pub fn from_desc(desc: GuideLineDesc) -> Self {
        Self {
            name: desc.name,
            points: desc.points.into_iter().map(sanitize_vec3).collect(),
            color: desc.color,
            width: finite_or(desc.width, DEFAULT_LINE_WIDTH).max(0.0),
            dashed: desc.dashed,
        }
    }

    #[inline]
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }

    /// Consecutive point pairs; `points.len() - 1` of them.
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.points.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn is_closed(&self) -> bool {
        self.points.len() > 2 && self.points.first() == self.points.last()
    }
}
