use asterixia_ids::MeshID;

#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeRenderResult {
    Mesh(MeshID),
    Failed(String),
}
