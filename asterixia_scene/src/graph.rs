use asterixia_ids::NodeID;
use glam::Vec3;

use crate::node_arena::NodeArena;
use crate::nodes::celestial_body::sanitize_vec3;
use crate::nodes::{
    AxisLine, AxisLineDesc, CelestialBody, CelestialBodyDesc, GuideLine, GuideLineDesc,
    SceneNode, TextLabel, TextLabelDesc,
};

/// Owns every node in the overlay. All mutation goes through `&mut self`, so a
/// frame that is iterating the scene can never observe a half-applied removal.
#[derive(Default)]
pub struct SceneGraph {
    nodes: NodeArena,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_celestial_body(&mut self, desc: CelestialBodyDesc) -> NodeID {
        let body = CelestialBody::from_desc(desc);
        log::debug!(
            "add body '{}' kind={} scale={} -> {}",
            body.name,
            body.kind,
            body.effective_scale,
            body.position
        );
        self.nodes.insert(SceneNode::CelestialBody(body))
    }

    pub fn add_axis_line(&mut self, desc: AxisLineDesc) -> NodeID {
        let axis = AxisLine::from_desc(desc);
        log::debug!("add axis '{}' on '{}'", axis.name, axis.attached_body);
        self.nodes.insert(SceneNode::AxisLine(axis))
    }

    pub fn add_guide_line(&mut self, desc: GuideLineDesc) -> NodeID {
        let line = GuideLine::from_desc(desc);
        log::debug!("add guide line '{}' ({} points)", line.name, line.points.len());
        self.nodes.insert(SceneNode::GuideLine(line))
    }

    pub fn add_text_label(&mut self, desc: TextLabelDesc) -> NodeID {
        self.nodes.insert(SceneNode::TextLabel(TextLabel::from_desc(desc)))
    }

    /// Moves a celestial body. Any other node kind, or an unknown ID, is left
    /// untouched and reported as `false`.
    pub fn update_node_position(&mut self, id: NodeID, position: Vec3) -> bool {
        match self
            .nodes
            .get_mut(id)
            .and_then(SceneNode::as_celestial_body_mut)
        {
            Some(body) => {
                body.position = sanitize_vec3(position);
                true
            }
            None => false,
        }
    }

    /// Removes a body, axis or guide line. Text labels only go away with
    /// [`SceneGraph::clear_all_nodes`].
    pub fn remove_node(&mut self, id: NodeID) -> bool {
        let removed = self
            .nodes
            .remove_if(id, |node| !matches!(node, SceneNode::TextLabel(_)));
        if let Some(node) = &removed {
            log::debug!("removed {} {}", node.kind_name(), id);
        }
        removed.is_some()
    }

    pub fn clear_all_nodes(&mut self) {
        log::debug!("clearing {} nodes", self.nodes.len());
        self.nodes.clear();
    }

    pub fn get(&self, id: NodeID) -> Option<&SceneNode> {
        self.nodes.get(id)
    }

    pub fn celestial_body(&self, id: NodeID) -> Option<&CelestialBody> {
        self.nodes.get(id).and_then(SceneNode::as_celestial_body)
    }

    pub fn celestial_bodies(&self) -> impl Iterator<Item = (NodeID, &CelestialBody)> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| node.as_celestial_body().map(|b| (id, b)))
    }

    pub fn axis_lines(&self) -> impl Iterator<Item = (NodeID, &AxisLine)> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| node.as_axis_line().map(|a| (id, a)))
    }

    pub fn axis_lines_mut(&mut self) -> impl Iterator<Item = (NodeID, &mut AxisLine)> {
        self.nodes
            .iter_mut()
            .filter_map(|(id, node)| node.as_axis_line_mut().map(|a| (id, a)))
    }

    pub fn guide_lines(&self) -> impl Iterator<Item = (NodeID, &GuideLine)> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| node.as_guide_line().map(|g| (id, g)))
    }

    pub fn text_labels(&self) -> impl Iterator<Item = (NodeID, &TextLabel)> {
        self.nodes
            .iter()
            .filter_map(|(id, node)| node.as_text_label().map(|t| (id, t)))
    }

    /// First body in creation-slot order with this exact name.
    pub fn find_body_by_name(&self, name: &str) -> Option<(NodeID, &CelestialBody)> {
        self.celestial_bodies().find(|(_, body)| body.name == name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
