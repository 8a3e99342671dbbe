use ahash::AHashMap;
use asterixia_ids::{MeshID, NodeID, string_to_u64};
use asterixia_render_bridge::{
    BodyDrawCommand, FrameCommand, LineDrawCommand, LineKind, RenderCommand, RenderRequestID,
    ResourceCommand,
};
use glam::{Mat4, Quat, Vec3};

use super::Runtime;
use crate::RuntimeRenderResult;

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
const AXIS_LINE_WIDTH: f32 = 0.01;
/// Frames to wait before asking the backend again for a mesh it failed to build.
const MESH_RETRY_FRAMES: u64 = 120;

#[derive(Debug, Clone, Copy, PartialEq)]
enum MeshSlot {
    Inflight(RenderRequestID),
    Ready(MeshID),
    Failed { retry_at: u64 },
}

pub(super) struct Render3DState {
    traversal_ids: Vec<NodeID>,
    meshes: AHashMap<String, MeshSlot>,
    frame_index: u64,
}

impl Render3DState {
    pub(super) fn new() -> Self {
        Self {
            traversal_ids: Vec::new(),
            meshes: AHashMap::default(),
            frame_index: 0,
        }
    }
}

impl Runtime {
    fn mesh_request_id(source: &str) -> RenderRequestID {
        RenderRequestID::new(string_to_u64(source))
    }

    /// Queues one frame of drawing in the fixed compositor order: clear,
    /// background, overlay state, bodies, axes, guide lines. Without valid
    /// camera matrices only the clear and background are queued.
    pub fn extract_frame_commands(&mut self) {
        self.render_3d.frame_index += 1;

        self.queue_render_command(RenderCommand::Frame(FrameCommand::Clear {
            color: CLEAR_COLOR,
        }));
        let background = self.night.background(self.background_uv);
        self.queue_render_command(RenderCommand::Frame(FrameCommand::Background(background)));
        if !self.camera.is_valid() {
            log::trace!("camera invalid, overlay skipped");
            return;
        }
        let camera = self.camera.state();
        self.queue_render_command(RenderCommand::Frame(FrameCommand::BeginOverlay { camera }));

        self.extract_bodies();
        self.extract_axes();
        self.extract_guide_lines();
    }

    fn extract_bodies(&mut self) {
        let mut traversal_ids = std::mem::take(&mut self.render_3d.traversal_ids);
        traversal_ids.clear();
        traversal_ids.extend(self.scene.celestial_bodies().map(|(id, _)| id));

        let spin = Quat::from_rotation_y(self.animation.spin_deg().to_radians());
        let glow_boost = self.night.glow_boost();

        for node_id in traversal_ids.iter().copied() {
            let Some(body) = self.scene.celestial_body(node_id) else {
                continue;
            };
            let rotation = if body.kind.spins() { spin } else { Quat::IDENTITY };
            let model = Mat4::from_scale_rotation_translation(
                Vec3::splat(body.effective_scale),
                rotation,
                body.position,
            );
            let color = body.color.to_array();
            let glow_intensity = body.glow_intensity * glow_boost;
            let key = body.mesh_key();

            let Some(mesh) = self.resolve_body_mesh(&key) else {
                continue;
            };
            self.queue_render_command(RenderCommand::Frame(FrameCommand::DrawBody {
                node: node_id,
                body: BodyDrawCommand {
                    mesh,
                    model: model.to_cols_array_2d(),
                    color,
                    glow_intensity,
                },
            }));
        }

        traversal_ids.clear();
        self.render_3d.traversal_ids = traversal_ids;
    }

    fn extract_axes(&mut self) {
        let mut draws = Vec::new();
        for (node_id, axis) in self.scene.axis_lines() {
            let Some((_, body)) = self.scene.find_body_by_name(&axis.attached_body) else {
                log::trace!("axis '{}' has no body '{}'", axis.name, axis.attached_body);
                continue;
            };
            let mut model = Mat4::from_translation(body.position)
                * Mat4::from_rotation_x(axis.tilt_deg.to_radians());
            if axis.show_rotation {
                model *= Mat4::from_rotation_y(axis.rotation_angle_deg.to_radians());
            }
            let (start, end) = axis.endpoints();
            draws.push(FrameCommand::DrawLines {
                node: node_id,
                lines: LineDrawCommand {
                    kind: LineKind::Axis,
                    model: model.to_cols_array_2d(),
                    segments: vec![[start, end]],
                    color: axis.color.to_array(),
                    width: AXIS_LINE_WIDTH,
                },
            });
        }
        for draw in draws {
            self.queue_render_command(RenderCommand::Frame(draw));
        }
    }

    fn extract_guide_lines(&mut self) {
        let mut draws = Vec::new();
        for (node_id, line) in self.scene.guide_lines() {
            if !line.is_drawable() {
                continue;
            }
            draws.push(FrameCommand::DrawLines {
                node: node_id,
                lines: LineDrawCommand {
                    kind: LineKind::Guide,
                    model: Mat4::IDENTITY.to_cols_array_2d(),
                    segments: line
                        .segments()
                        .map(|(a, b)| [a.to_array(), b.to_array()])
                        .collect(),
                    color: line.color.to_array(),
                    width: line.width,
                },
            });
        }
        for draw in draws {
            self.queue_render_command(RenderCommand::Frame(draw));
        }
    }

    /// Mesh for an asset key, requesting it from the backend the first time.
    /// Bodies are skipped until the backend has answered.
    fn resolve_body_mesh(&mut self, key: &str) -> Option<MeshID> {
        let frame = self.render_3d.frame_index;
        let request = Self::mesh_request_id(key);
        let slot = self.render_3d.meshes.get(key).copied();

        let next = match slot {
            Some(MeshSlot::Ready(id)) => return Some(id),
            Some(MeshSlot::Inflight(request)) => match self.take_render_result(request) {
                Some(RuntimeRenderResult::Mesh(id)) => MeshSlot::Ready(id),
                Some(RuntimeRenderResult::Failed(reason)) => {
                    log::warn!("mesh '{key}' failed: {reason}");
                    MeshSlot::Failed {
                        retry_at: frame + MESH_RETRY_FRAMES,
                    }
                }
                None => return None,
            },
            Some(MeshSlot::Failed { retry_at }) if frame < retry_at => return None,
            Some(MeshSlot::Failed { .. }) | None => {
                self.queue_render_command(RenderCommand::Resource(ResourceCommand::CreateMesh {
                    request,
                    source: key.to_string(),
                }));
                MeshSlot::Inflight(request)
            }
        };
        self.render_3d.meshes.insert(key.to_string(), next);
        match next {
            MeshSlot::Ready(id) => Some(id),
            MeshSlot::Inflight(_) | MeshSlot::Failed { .. } => None,
        }
    }
}
