pub mod assets;
pub mod backend;
pub mod background;
pub mod gpu;
pub mod lines;
pub mod mesh;
pub mod renderer;
pub mod resources;
pub mod shaders;

pub use assets::{AssetError, AssetSource, BodyAsset, DirAssetSource, NoAssets, default_color_for};
pub use backend::AsterixiaGraphics;
pub use renderer::{DrawStep, FrameRenderer, PreparedFrame};

use asterixia_ids::MeshID;
use asterixia_render_bridge::{
    FrameCommand, RenderBridge, RenderCommand, RenderEvent, ResourceCommand,
};
use std::sync::Arc;
use thiserror::Error;
use winit::window::Window;

#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no usable format")]
    NoSurfaceFormat,
    #[error("camera image {width}x{height} with {len} bytes is not packed RGBA8")]
    CameraImageSize { width: u32, height: u32, len: usize },
}

pub trait GraphicsBackend: RenderBridge {
    fn attach_window(&mut self, window: Arc<Window>);
    fn resize(&mut self, width: u32, height: u32);

    fn draw_frame(&mut self);
}

/// Backend without a GPU. Answers every mesh request at once and keeps the
/// frame commands of the last drawn frame.
#[derive(Default)]
pub struct NullGraphics {
    next_mesh_index: u32,
    events: Vec<RenderEvent>,
    pending: Vec<FrameCommand>,
    last_frame: Vec<FrameCommand>,
    frames_drawn: u64,
    camera_images: u64,
}

impl NullGraphics {
    pub fn new() -> Self {
        Self {
            next_mesh_index: 1,
            ..Default::default()
        }
    }

    fn alloc_mesh(&mut self) -> MeshID {
        let id = MeshID::from_parts(self.next_mesh_index.max(1), 0);
        self.next_mesh_index = self.next_mesh_index.max(1).saturating_add(1);
        id
    }

    pub fn last_frame(&self) -> &[FrameCommand] {
        &self.last_frame
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn camera_images(&self) -> u64 {
        self.camera_images
    }
}

impl RenderBridge for NullGraphics {
    fn submit(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::Resource(ResourceCommand::CreateMesh { request, .. }) => {
                let id = self.alloc_mesh();
                self.events.push(RenderEvent::MeshCreated { request, id });
            }
            RenderCommand::Resource(ResourceCommand::UploadCameraImage { .. }) => {
                self.camera_images += 1;
            }
            RenderCommand::Frame(command) => self.pending.push(command),
        }
    }

    fn drain_events(&mut self, out: &mut Vec<RenderEvent>) {
        out.append(&mut self.events);
    }
}

impl GraphicsBackend for NullGraphics {
    fn attach_window(&mut self, _window: Arc<Window>) {}

    fn resize(&mut self, _width: u32, _height: u32) {}

    fn draw_frame(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames_drawn += 1;
    }
}
