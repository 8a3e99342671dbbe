use crate::{
    GraphicsBackend,
    assets::{AssetSource, load_body_asset},
    background::CameraImageUpload,
    gpu::Gpu,
    renderer::FrameRenderer,
    resources::ResourceStore,
};
use asterixia_render_bridge::{RenderBridge, RenderCommand, RenderEvent, ResourceCommand};
use std::sync::Arc;
use winit::window::Window;

#[derive(Default)]
struct FrameState {
    pending_commands: Vec<RenderCommand>,
}

impl FrameState {
    fn queue(&mut self, command: RenderCommand) {
        self.pending_commands.push(command);
    }

    fn take_pending(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.pending_commands)
    }
}

pub struct AsterixiaGraphics {
    frame: FrameState,
    assets: Box<dyn AssetSource>,
    resources: ResourceStore,
    renderer: FrameRenderer,
    camera_image: Option<CameraImageUpload>,
    gpu: Option<Gpu>,
    events: Vec<RenderEvent>,
    viewport: (u32, u32),
}

impl AsterixiaGraphics {
    pub fn new(assets: impl AssetSource + 'static) -> Self {
        Self {
            frame: FrameState::default(),
            assets: Box::new(assets),
            resources: ResourceStore::new(),
            renderer: FrameRenderer::new(),
            camera_image: None,
            gpu: None,
            events: Vec::new(),
            viewport: (0, 0),
        }
    }

    pub fn has_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn resources(&self) -> &ResourceStore {
        &self.resources
    }

    pub fn renderer(&self) -> &FrameRenderer {
        &self.renderer
    }

    fn process_commands(&mut self, commands: Vec<RenderCommand>) {
        for command in commands {
            match command {
                RenderCommand::Resource(resource_cmd) => match resource_cmd {
                    ResourceCommand::CreateMesh { request, source } => {
                        if source.trim().is_empty() {
                            self.events.push(RenderEvent::Failed {
                                request,
                                reason: "empty mesh source".to_string(),
                            });
                            continue;
                        }
                        let assets = self.assets.as_ref();
                        let id = self
                            .resources
                            .mesh_for_source(&source, |s| load_body_asset(assets, s));
                        self.events.push(RenderEvent::MeshCreated { request, id });
                    }
                    ResourceCommand::UploadCameraImage {
                        width,
                        height,
                        rgba,
                    } => match CameraImageUpload::new(width, height, rgba) {
                        Ok(image) => self.camera_image = Some(image),
                        Err(err) => log::warn!("dropping camera image: {err}"),
                    },
                },
                RenderCommand::Frame(frame_cmd) => {
                    self.renderer.push(frame_cmd, &self.resources);
                }
            }
        }
    }
}

impl RenderBridge for AsterixiaGraphics {
    fn submit(&mut self, command: RenderCommand) {
        self.frame.queue(command);
    }

    fn submit_many<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = RenderCommand>,
    {
        self.frame.pending_commands.extend(commands);
    }

    fn drain_events(&mut self, out: &mut Vec<RenderEvent>) {
        out.append(&mut self.events);
    }
}

impl GraphicsBackend for AsterixiaGraphics {
    fn attach_window(&mut self, window: Arc<Window>) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(window) {
            Ok(mut gpu) => {
                gpu.resize(self.viewport.0.max(1), self.viewport.1.max(1));
                log::info!("graphics device ready");
                self.gpu = Some(gpu);
            }
            Err(err) => log::error!("graphics unavailable: {err}"),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        if let Some(gpu) = &mut self.gpu {
            gpu.resize(width.max(1), height.max(1));
        }
    }

    fn draw_frame(&mut self) {
        let commands = self.frame.take_pending();
        self.renderer.begin();
        self.process_commands(commands);

        if let Some(gpu) = &mut self.gpu {
            if let Some(image) = self.camera_image.take() {
                gpu.upload_camera_image(&image);
            }
            gpu.render(&self.resources, self.renderer.frame());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assets::NoAssets, renderer::DrawStep};
    use asterixia_ids::NodeID;
    use asterixia_render_bridge::{
        BodyDrawCommand, CameraState, FrameCommand, RenderRequestID,
    };

    fn create(request: u64, source: &str) -> RenderCommand {
        RenderCommand::Resource(ResourceCommand::CreateMesh {
            request: RenderRequestID::new(request),
            source: source.to_string(),
        })
    }

    #[test]
    fn mesh_requests_resolve_on_draw() {
        let mut g = AsterixiaGraphics::new(NoAssets);
        g.submit_many([create(1, "earth"), create(2, "earth"), create(3, "  ")]);
        let mut events = Vec::new();
        g.drain_events(&mut events);
        assert!(events.is_empty());

        g.draw_frame();
        g.drain_events(&mut events);
        assert_eq!(events.len(), 3);
        let ids: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                RenderEvent::MeshCreated { id, .. } => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], ids[1]);
        assert!(matches!(
            events[2],
            RenderEvent::Failed { request, .. } if request.0 == 3
        ));
        assert_eq!(g.resources().mesh_count(), 1);
        assert!(!g.has_gpu());
    }

    #[test]
    fn frame_commands_reach_renderer_after_mesh_exists() {
        let mut g = AsterixiaGraphics::new(NoAssets);
        g.submit(create(1, "moon"));
        g.draw_frame();
        let mut events = Vec::new();
        g.drain_events(&mut events);
        let RenderEvent::MeshCreated { id, .. } = events[0] else {
            panic!("expected mesh");
        };

        g.submit_many([
            RenderCommand::Frame(FrameCommand::Clear { color: [0.0; 4] }),
            RenderCommand::Frame(FrameCommand::BeginOverlay {
                camera: CameraState::default(),
            }),
            RenderCommand::Frame(FrameCommand::DrawBody {
                node: NodeID::from_parts(1, 0),
                body: BodyDrawCommand {
                    mesh: id,
                    model: glam::Mat4::IDENTITY.to_cols_array_2d(),
                    color: [1.0; 4],
                    glow_intensity: 0.5,
                },
            }),
        ]);
        g.draw_frame();
        assert_eq!(
            g.renderer().frame().steps,
            vec![DrawStep::Body {
                mesh: id,
                instance: 0
            }]
        );
    }

    #[test]
    fn malformed_camera_image_is_dropped() {
        let mut g = AsterixiaGraphics::new(NoAssets);
        g.submit(RenderCommand::Resource(ResourceCommand::UploadCameraImage {
            width: 4,
            height: 4,
            rgba: vec![0; 10],
        }));
        g.draw_frame();
        assert!(g.camera_image.is_none());

        g.submit(RenderCommand::Resource(ResourceCommand::UploadCameraImage {
            width: 1,
            height: 1,
            rgba: vec![1, 2, 3, 4],
        }));
        g.draw_frame();
        // Without a device the image waits for the next attach.
        assert!(g.camera_image.is_some());
    }
}
