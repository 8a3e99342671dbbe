use crate::{
    lines::{LineVertex, expand_ribbon},
    resources::ResourceStore,
};
use asterixia_ids::MeshID;
use asterixia_render_bridge::{BackgroundState, CameraState, FrameCommand};
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BodyInstance {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
    /// x holds the glow intensity; the rest pads to 16 bytes.
    pub glow: [f32; 4],
}

/// One GPU draw, kept in the order the commands arrived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawStep {
    Background,
    Body { mesh: MeshID, instance: u32 },
    Lines { first_vertex: u32, vertex_count: u32 },
}

#[derive(Clone, Debug, Default)]
pub struct PreparedFrame {
    pub cleared: bool,
    pub clear_color: [f32; 4],
    pub background: Option<BackgroundState>,
    pub camera: Option<CameraState>,
    pub instances: Vec<BodyInstance>,
    pub line_vertices: Vec<LineVertex>,
    pub steps: Vec<DrawStep>,
}

impl PreparedFrame {
    /// Nothing was submitted this frame; the last presented image stays.
    #[inline]
    pub fn is_idle(&self) -> bool {
        !self.cleared
    }
}

#[derive(Default)]
pub struct FrameRenderer {
    frame: PreparedFrame,
    skipped: u32,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) {
        self.frame.cleared = false;
        self.frame.clear_color = [0.0, 0.0, 0.0, 1.0];
        self.frame.background = None;
        self.frame.camera = None;
        self.reset_draws();
        self.skipped = 0;
    }

    pub fn push(&mut self, command: FrameCommand, resources: &ResourceStore) {
        match command {
            FrameCommand::Clear { color } => {
                self.frame.cleared = true;
                self.frame.clear_color = color;
                self.frame.background = None;
                self.frame.camera = None;
                self.reset_draws();
            }
            FrameCommand::Background(state) => {
                self.frame.background = Some(state);
                self.frame.steps.push(DrawStep::Background);
            }
            FrameCommand::BeginOverlay { camera } => {
                self.frame.camera = Some(camera);
            }
            FrameCommand::DrawBody { node, body } => {
                if self.frame.camera.is_none() || !resources.has_mesh(body.mesh) {
                    log::trace!("skipping body {node}: overlay not begun or mesh unknown");
                    self.skipped += 1;
                    return;
                }
                let instance = self.frame.instances.len() as u32;
                self.frame.instances.push(BodyInstance {
                    model_0: body.model[0],
                    model_1: body.model[1],
                    model_2: body.model[2],
                    model_3: body.model[3],
                    color: body.color,
                    glow: [body.glow_intensity, 0.0, 0.0, 0.0],
                });
                self.frame.steps.push(DrawStep::Body {
                    mesh: body.mesh,
                    instance,
                });
            }
            FrameCommand::DrawLines { node, lines } => {
                let Some(camera) = self.frame.camera else {
                    log::trace!("skipping lines {node}: overlay not begun");
                    self.skipped += 1;
                    return;
                };
                let first_vertex = self.frame.line_vertices.len() as u32;
                let vertex_count = expand_ribbon(
                    &lines,
                    Vec3::from(camera.position),
                    &mut self.frame.line_vertices,
                );
                if vertex_count > 0 {
                    self.frame.steps.push(DrawStep::Lines {
                        first_vertex,
                        vertex_count,
                    });
                }
            }
        }
    }

    #[inline]
    pub fn frame(&self) -> &PreparedFrame {
        &self.frame
    }

    /// Draw commands dropped since `begin`.
    #[inline]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    fn reset_draws(&mut self) {
        self.frame.instances.clear();
        self.frame.line_vertices.clear();
        self.frame.steps.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{NoAssets, load_body_asset};
    use asterixia_ids::NodeID;
    use asterixia_render_bridge::{BodyDrawCommand, LineDrawCommand, LineKind};
    use glam::Mat4;

    fn store_with_earth() -> (ResourceStore, MeshID) {
        let mut store = ResourceStore::new();
        let id = store.mesh_for_source("earth", |s| load_body_asset(&NoAssets, s));
        (store, id)
    }

    fn body(mesh: MeshID) -> FrameCommand {
        FrameCommand::DrawBody {
            node: NodeID::from_parts(1, 0),
            body: BodyDrawCommand {
                mesh,
                model: Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)).to_cols_array_2d(),
                color: [1.0; 4],
                glow_intensity: 0.75,
            },
        }
    }

    fn axis() -> FrameCommand {
        FrameCommand::DrawLines {
            node: NodeID::from_parts(2, 0),
            lines: LineDrawCommand {
                kind: LineKind::Axis,
                model: Mat4::IDENTITY.to_cols_array_2d(),
                segments: vec![[[0.0, -0.5, -2.0], [0.0, 0.5, -2.0]]],
                color: [0.0, 1.0, 1.0, 1.0],
                width: 0.01,
            },
        }
    }

    fn overlay() -> FrameCommand {
        FrameCommand::BeginOverlay {
            camera: CameraState::default(),
        }
    }

    #[test]
    fn steps_follow_command_order() {
        let (store, mesh) = store_with_earth();
        let mut r = FrameRenderer::new();
        r.begin();
        for cmd in [
            FrameCommand::Clear {
                color: [0.0, 0.0, 0.0, 1.0],
            },
            FrameCommand::Background(BackgroundState::default()),
            overlay(),
            body(mesh),
            axis(),
        ] {
            r.push(cmd, &store);
        }
        let f = r.frame();
        assert!(f.cleared);
        assert_eq!(f.steps.len(), 3);
        assert_eq!(f.steps[0], DrawStep::Background);
        assert_eq!(f.steps[1], DrawStep::Body { mesh, instance: 0 });
        assert_eq!(
            f.steps[2],
            DrawStep::Lines {
                first_vertex: 0,
                vertex_count: 6
            }
        );
        assert_eq!(f.instances[0].glow[0], 0.75);
        assert_eq!(f.instances[0].model_3, [0.0, 0.0, -2.0, 1.0]);
    }

    #[test]
    fn draws_before_overlay_are_dropped() {
        let (store, mesh) = store_with_earth();
        let mut r = FrameRenderer::new();
        r.begin();
        r.push(FrameCommand::Clear { color: [0.0; 4] }, &store);
        r.push(body(mesh), &store);
        r.push(axis(), &store);
        assert!(r.frame().steps.is_empty());
        assert_eq!(r.skipped(), 2);
    }

    #[test]
    fn unknown_mesh_is_skipped() {
        let (store, _) = store_with_earth();
        let mut r = FrameRenderer::new();
        r.begin();
        r.push(overlay(), &store);
        r.push(body(MeshID::from_parts(99, 0)), &store);
        assert!(r.frame().instances.is_empty());
        assert_eq!(r.skipped(), 1);
    }

    #[test]
    fn begin_without_commands_is_idle() {
        let (store, mesh) = store_with_earth();
        let mut r = FrameRenderer::new();
        r.begin();
        r.push(FrameCommand::Clear { color: [0.0; 4] }, &store);
        r.push(overlay(), &store);
        r.push(body(mesh), &store);
        r.begin();
        assert!(r.frame().is_idle());
        assert!(r.frame().steps.is_empty());
        assert!(r.frame().camera.is_none());
    }

    #[test]
    fn clear_discards_earlier_draws() {
        let (store, mesh) = store_with_earth();
        let mut r = FrameRenderer::new();
        r.begin();
        r.push(overlay(), &store);
        r.push(body(mesh), &store);
        r.push(
            FrameCommand::Clear {
                color: [0.1, 0.2, 0.3, 1.0],
            },
            &store,
        );
        assert!(r.frame().steps.is_empty());
        assert_eq!(r.frame().clear_color, [0.1, 0.2, 0.3, 1.0]);
    }
}
