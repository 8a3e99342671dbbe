use asterixia_ids::NodeID;

use crate::nodes::SceneNode;

/// Slot storage for scene nodes. IDs carry the slot generation, which is
/// bumped on every removal (including [`NodeArena::clear`]) so a host holding
/// an old ID can never address the node that later reuses the slot.
pub struct NodeArena {
    nodes: Vec<Option<SceneNode>>,
    generations: Vec<u32>,
    free_indices: Vec<usize>,
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArena {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        // Index 0 is the nil sentinel so the first real node is index 1.
        let mut nodes = Vec::with_capacity(capacity.saturating_add(1));
        let mut generations = Vec::with_capacity(capacity.saturating_add(1));
        nodes.push(None);
        generations.push(0);
        Self {
            nodes,
            generations,
            free_indices: Vec::new(),
        }
    }

    pub fn insert(&mut self, node: SceneNode) -> NodeID {
        if let Some(index) = self.free_indices.pop() {
            self.nodes[index] = Some(node);
            return NodeID::from_parts(index as u32, self.generations[index]);
        }

        let index = self.nodes.len();
        self.nodes.push(Some(node));
        self.generations.push(0);
        NodeID::from_parts(index as u32, 0)
    }

    #[inline]
    fn live_index(&self, id: NodeID) -> Option<usize> {
        let index = id.index() as usize;
        if id.is_nil() || index == 0 || index >= self.nodes.len() {
            return None;
        }
        (self.generations[index] == id.generation()).then_some(index)
    }

    pub fn get(&self, id: NodeID) -> Option<&SceneNode> {
        self.live_index(id)
            .and_then(|index| self.nodes[index].as_ref())
    }

    pub fn get_mut(&mut self, id: NodeID) -> Option<&mut SceneNode> {
        self.live_index(id)
            .and_then(|index| self.nodes[index].as_mut())
    }

    /// Removes the node only when `pred` accepts it. Generation is bumped on removal.
    pub fn remove_if(
        &mut self,
        id: NodeID,
        pred: impl FnOnce(&SceneNode) -> bool,
    ) -> Option<SceneNode> {
        let index = self.live_index(id)?;
        if !self.nodes[index].as_ref().is_some_and(pred) {
            return None;
        }
        self.generations[index] = self.generations[index].wrapping_add(1);
        let removed = self.nodes[index].take();
        if removed.is_some() {
            self.free_indices.push(index);
        }
        removed
    }

    pub fn remove(&mut self, id: NodeID) -> Option<SceneNode> {
        self.remove_if(id, |_| true)
    }

    pub fn contains(&self, id: NodeID) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeID, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, node)| {
                node.as_ref()
                    .map(|n| (NodeID::from_parts(index as u32, self.generations[index]), n))
            })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (NodeID, &mut SceneNode)> {
        self.nodes
            .iter_mut()
            .zip(self.generations.iter())
            .enumerate()
            .skip(1)
            .filter_map(|(index, (node, &generation))| {
                node.as_mut()
                    .map(|n| (NodeID::from_parts(index as u32, generation), n))
            })
    }

    /// Drops every node. Slots are kept and their generations bumped, so all
    /// previously issued IDs become invalid.
    pub fn clear(&mut self) {
        self.free_indices.clear();
        for index in (1..self.nodes.len()).rev() {
            if self.nodes[index].take().is_some() {
                self.generations[index] = self.generations[index].wrapping_add(1);
            }
            self.free_indices.push(index);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.iter().all(|n| n.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{TextLabel, TextLabelDesc};

    fn label(text: &str) -> SceneNode {
        SceneNode::TextLabel(TextLabel::from_desc(TextLabelDesc {
            text: text.into(),
            ..Default::default()
        }))
    }

    #[test]
    fn first_id_skips_nil_slot() {
        let mut arena = NodeArena::new();
        let id = arena.insert(label("a"));
        assert_eq!(id.index(), 1);
        assert!(!id.is_nil());
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut arena = NodeArena::new();
        let old = arena.insert(label("a"));
        assert!(arena.remove(old).is_some());
        let new = arena.insert(label("b"));
        assert_eq!(new.index(), old.index());
        assert_ne!(new, old);
        assert!(arena.get(old).is_none());
        assert!(arena.get(new).is_some());
    }

    #[test]
    fn remove_succeeds_once() {
        let mut arena = NodeArena::new();
        let id = arena.insert(label("a"));
        assert!(arena.remove(id).is_some());
        assert!(arena.remove(id).is_none());
    }

    #[test]
    fn remove_if_leaves_rejected_node_alone() {
        let mut arena = NodeArena::new();
        let id = arena.insert(label("a"));
        assert!(arena.remove_if(id, |n| n.as_celestial_body().is_some()).is_none());
        assert!(arena.contains(id));
    }

    #[test]
    fn clear_invalidates_every_issued_id() {
        let mut arena = NodeArena::new();
        let a = arena.insert(label("a"));
        let b = arena.insert(label("b"));
        arena.clear();
        assert!(arena.is_empty());
        let c = arena.insert(label("c"));
        let d = arena.insert(label("d"));
        for stale in [a, b] {
            assert!(!arena.contains(stale));
            assert_ne!(stale, c);
            assert_ne!(stale, d);
        }
        // slots are reused lowest-first after a clear
        assert_eq!(c.index(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn iter_yields_live_nodes_in_slot_order() {
        let mut arena = NodeArena::new();
        let a = arena.insert(label("a"));
        let b = arena.insert(label("b"));
        let c = arena.insert(label("c"));
        arena.remove(b);
        let ids: Vec<_> = arena.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, c]);
    }
}
