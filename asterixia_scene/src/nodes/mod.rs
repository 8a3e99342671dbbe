pub mod axis_line;
pub mod celestial_body;
pub mod guide_line;
pub mod text_label;

pub use axis_line::*;
pub use celestial_body::*;
pub use guide_line::*;
pub use text_label::*;

/// Every node kind the scene graph stores. One arena holds all of them so
/// IDs are unique across kinds.
#[derive(Clone, Debug)]
pub enum SceneNode {
    CelestialBody(CelestialBody),
    AxisLine(AxisLine),
    GuideLine(GuideLine),
    TextLabel(TextLabel),
}

impl SceneNode {
    pub const fn kind_name(&self) -> &'static str {
        match self {
            SceneNode::CelestialBody(_) => "CelestialBody",
            SceneNode::AxisLine(_) => "AxisLine",
            SceneNode::GuideLine(_) => "GuideLine",
            SceneNode::TextLabel(_) => "TextLabel",
        }
    }

    pub fn as_celestial_body(&self) -> Option<&CelestialBody> {
        match self {
            SceneNode::CelestialBody(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_celestial_body_mut(&mut self) -> Option<&mut CelestialBody> {
        match self {
            SceneNode::CelestialBody(body) => Some(body),
            _ => None,
        }
    }

    pub fn as_axis_line(&self) -> Option<&AxisLine> {
        match self {
            SceneNode::AxisLine(axis) => Some(axis),
            _ => None,
        }
    }

    pub fn as_axis_line_mut(&mut self) -> Option<&mut AxisLine> {
        match self {
            SceneNode::AxisLine(axis) => Some(axis),
            _ => None,
        }
    }

    pub fn as_guide_line(&self) -> Option<&GuideLine> {
        match self {
            SceneNode::GuideLine(line) => Some(line),
            _ => None,
        }
    }

    pub fn as_text_label(&self) -> Option<&TextLabel> {
        match self {
            SceneNode::TextLabel(label) => Some(label),
            _ => None,
        }
    }
}
