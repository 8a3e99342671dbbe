pub mod camera;
pub mod control;
pub mod error;
pub mod night;
pub mod picking;
mod render_result;
mod runtime;
pub mod session;

pub use camera::CameraPipeline;
pub use control::{CommandReply, HostCommand, HostEvent, HostHandle, PendingReply};
pub use error::{ControlError, SessionError};
pub use night::NightMode;
pub use picking::{PickHit, TAP_DEBOUNCE_MS, TapDebouncer, pick_body};
pub use render_result::RuntimeRenderResult;
pub use runtime::{Lifecycle, Runtime, TapCallback};
pub use session::{ArFrame, ArSession, CameraImage, CameraPose, SessionOptions, TrackingState};
