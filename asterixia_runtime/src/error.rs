use thiserror::Error;

/// Failures reported by the AR session collaborator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("AR session unavailable: {0}")]
    Unavailable(String),

    #[error("AR session has not been initialized")]
    NotInitialized,

    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera frame not available: {0}")]
    FrameUnavailable(String),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ControlError {
    #[error("runtime is no longer accepting commands")]
    Disconnected,

    #[error("runtime dropped the command without replying")]
    NoReply,
}
