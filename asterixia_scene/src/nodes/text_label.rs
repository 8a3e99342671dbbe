use glam::Vec3;

use crate::Color;
use crate::nodes::celestial_body::{finite_or, sanitize_vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct TextLabelDesc {
    pub text: String,
    pub position: Vec3,
    pub color: Color,
    pub font_size: f32,
    pub billboard: bool,
}

impl Default for TextLabelDesc {
    fn default() -> Self {
        Self {
            text: String::new(),
            position: Vec3::ZERO,
            color: Color::WHITE,
            font_size: 0.1,
            billboard: true,
        }
    }
}

/// Tracked for the host; the compositor does not draw text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub position: Vec3,
    pub color: Color,
    pub font_size: f32,
    pub billboard: bool,
}

impl TextLabel {
    pub fn from_desc(desc: TextLabelDesc) -> Self {
        Self {
            text: desc.text,
            position: sanitize_vec3(desc.position),
            color: desc.color,
            font_size: finite_or(desc.font_size, 0.1).max(0.0),
            billboard: desc.billboard,
        }
    }
}
