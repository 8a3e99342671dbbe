//! Command and event vocabulary between the overlay runtime and a graphics
//! backend. Payloads are plain arrays so backends need no math crate.

use asterixia_ids::{MeshID, NodeID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderRequestID(pub u64);

impl RenderRequestID {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// View and projection for one frame. Projection follows GL clip conventions
/// (depth in [-1, 1]); backends convert to their own clip space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub position: [f32; 3],
}

impl Default for CameraState {
    fn default() -> Self {
        const IDENTITY: [[f32; 4]; 4] = [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        Self {
            view: IDENTITY,
            projection: IDENTITY,
            position: [0.0; 3],
        }
    }
}

/// Full-screen camera feed quad. `uv` holds the texture coordinates for the
/// corners (-1,-1), (1,-1), (-1,1), (1,1) in that order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundState {
    pub uv: [[f32; 2]; 4],
    /// RGB multiplier, already clamped to [0.1, 1] when night mode is on.
    pub brightness: f32,
    pub night_mode: bool,
}

pub const DEFAULT_BACKGROUND_UV: [[f32; 2]; 4] = [[1.0, 1.0], [1.0, 0.0], [0.0, 1.0], [0.0, 0.0]];

impl Default for BackgroundState {
    fn default() -> Self {
        Self {
            uv: DEFAULT_BACKGROUND_UV,
            brightness: 1.0,
            night_mode: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDrawCommand {
    pub mesh: MeshID,
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
    /// Glow after any night-mode boost.
    pub glow_intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Axis,
    Guide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineDrawCommand {
    pub kind: LineKind,
    pub model: [[f32; 4]; 4],
    /// Local-space segment endpoints.
    pub segments: Vec<[[f32; 3]; 2]>,
    pub color: [f32; 4],
    /// World-space ribbon width.
    pub width: f32,
}

#[derive(Debug, Clone)]
pub enum ResourceCommand {
    CreateMesh {
        request: RenderRequestID,
        source: String,
    },
    /// Latest camera frame for the background, tightly packed RGBA8.
    UploadCameraImage {
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    },
}

/// Per-frame drawing, emitted in submission order.
#[derive(Debug, Clone)]
pub enum FrameCommand {
    Clear { color: [f32; 4] },
    Background(BackgroundState),
    /// Enables depth testing and alpha blending for the 3D overlay.
    BeginOverlay { camera: CameraState },
    DrawBody { node: NodeID, body: BodyDrawCommand },
    DrawLines { node: NodeID, lines: LineDrawCommand },
}

#[derive(Debug, Clone)]
pub enum RenderCommand {
    Resource(ResourceCommand),
    Frame(FrameCommand),
}

#[derive(Debug, Clone)]
pub enum RenderEvent {
    MeshCreated {
        request: RenderRequestID,
        id: MeshID,
    },
    Failed {
        request: RenderRequestID,
        reason: String,
    },
}

pub trait RenderBridge {
    fn submit(&mut self, command: RenderCommand);

    fn submit_many<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = RenderCommand>,
    {
        for command in commands {
            self.submit(command);
        }
    }

    fn drain_events(&mut self, out: &mut Vec<RenderEvent>);
}
