use crate::assets::BodyAsset;
use ahash::AHashMap;
use asterixia_ids::MeshID;

#[derive(Default)]
pub struct ResourceStore {
    next_mesh_index: u32,
    meshes: AHashMap<MeshID, BodyAsset>,
    by_source: AHashMap<String, MeshID>,
}

impl ResourceStore {
    pub fn new() -> Self {
        Self {
            next_mesh_index: 1,
            meshes: AHashMap::new(),
            by_source: AHashMap::new(),
        }
    }

    /// Returns the existing mesh for `source`, or stores the asset built by
    /// `load` under a fresh id.
    pub fn mesh_for_source(
        &mut self,
        source: &str,
        load: impl FnOnce(&str) -> BodyAsset,
    ) -> MeshID {
        if let Some(&id) = self.by_source.get(source) {
            return id;
        }
        let id = MeshID::from_parts(self.next_mesh_index.max(1), 0);
        self.next_mesh_index = self.next_mesh_index.max(1).saturating_add(1);
        self.meshes.insert(id, load(source));
        self.by_source.insert(source.to_string(), id);
        id
    }

    #[inline]
    pub fn mesh(&self, id: MeshID) -> Option<&BodyAsset> {
        self.meshes.get(&id)
    }

    #[inline]
    pub fn has_mesh(&self, id: MeshID) -> bool {
        self.meshes.contains_key(&id)
    }

    #[inline]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}
