//! Typed boundary between the host UI and the runtime. Commands are queued on
//! a channel from any thread and applied at the start of the next frame.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use asterixia_ids::NodeID;
use asterixia_scene::{
    AxisLineDesc, CelestialBodyDesc, Color, GuideCircleDesc, GuideLineDesc, OrbitalPathDesc,
    TextLabelDesc,
};
use glam::Vec3;

use crate::{ControlError, SessionOptions};

#[derive(Debug, Clone)]
pub enum HostCommand {
    InitializeSession(SessionOptions),
    AddCelestialBody(CelestialBodyDesc),
    AddAxisLine(AxisLineDesc),
    AddGuideLine(GuideLineDesc),
    AddOrbitalPath(OrbitalPathDesc),
    AddConstellationLine {
        name: String,
        points: Vec<Vec3>,
        color: Color,
        width: f32,
    },
    AddGuideCircle(GuideCircleDesc),
    AddTextLabel(TextLabelDesc),
    UpdateNodePosition {
        id: NodeID,
        position: Vec3,
    },
    RemoveNode(NodeID),
    ClearAllNodes,
    PauseSession,
    ResumeSession,
    SetNightMode {
        enabled: bool,
        intensity: f32,
    },
    Tap {
        x: f32,
        y: f32,
        timestamp_ms: u64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandReply {
    Node(NodeID),
    Bool(bool),
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    SessionInitialized,
    NodeTapped { id: NodeID, name: String },
    CameraTransform { position: [f32; 3] },
    Error { message: String },
}

pub(crate) struct Envelope {
    pub command: HostCommand,
    pub reply: Option<Sender<CommandReply>>,
}

/// Cloneable sender side handed to the host.
#[derive(Clone)]
pub struct HostHandle {
    tx: Sender<Envelope>,
}

impl HostHandle {
    /// Queues a command without waiting for its result.
    pub fn send(&self, command: HostCommand) -> Result<(), ControlError> {
        self.tx
            .send(Envelope {
                command,
                reply: None,
            })
            .map_err(|_| ControlError::Disconnected)
    }

    /// Queues a command and returns a handle to its reply, filled in when the
    /// runtime processes it on its next frame.
    pub fn request(&self, command: HostCommand) -> Result<PendingReply, ControlError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.tx
            .send(Envelope {
                command,
                reply: Some(reply_tx),
            })
            .map_err(|_| ControlError::Disconnected)?;
        Ok(PendingReply { rx: reply_rx })
    }
}

pub struct PendingReply {
    rx: Receiver<CommandReply>,
}

impl PendingReply {
    /// Blocks until the runtime answers. Never call this from the frame thread.
    pub fn wait(self) -> Result<CommandReply, ControlError> {
        self.rx.recv().map_err(|_| ControlError::NoReply)
    }

    /// Non-blocking poll; `Ok(None)` while the command is still queued.
    pub fn try_take(&self) -> Result<Option<CommandReply>, ControlError> {
        match self.rx.try_recv() {
            Ok(reply) => Ok(Some(reply)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(ControlError::NoReply),
        }
    }
}

/// Runtime-owned receiving side.
pub(crate) struct ControlQueue {
    tx: Sender<Envelope>,
    rx: Receiver<Envelope>,
}

impl ControlQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    pub fn handle(&self) -> HostHandle {
        HostHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn try_next(&self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }
}
