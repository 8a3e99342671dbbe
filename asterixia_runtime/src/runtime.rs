use ahash::AHashMap;
use asterixia_ids::NodeID;
use asterixia_render_bridge::{
    DEFAULT_BACKGROUND_UV, RenderCommand, RenderEvent, RenderRequestID, ResourceCommand,
};
use asterixia_scene::{AnimationClock, SceneGraph};
use glam::Vec2;

use crate::control::ControlQueue;
use crate::{
    ArSession, CameraPipeline, HostEvent, HostHandle, NightMode, RuntimeRenderResult,
    SessionError, SessionOptions, TapDebouncer, TrackingState, pick_body,
};

mod host_commands;
mod render_3d;

pub type TapCallback = Box<dyn FnMut(NodeID, &str)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// No session yet, or the last initialization failed.
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy)]
struct TapRequest {
    screen: Vec2,
    timestamp_ms: u64,
}

/// Outgoing render commands and resolved request results.
struct RenderState {
    pending_commands: Vec<RenderCommand>,
    resolved_requests: AHashMap<RenderRequestID, RuntimeRenderResult>,
}

impl RenderState {
    fn new() -> Self {
        Self {
            pending_commands: Vec::new(),
            resolved_requests: AHashMap::default(),
        }
    }

    fn queue_command(&mut self, command: RenderCommand) {
        self.pending_commands.push(command);
    }

    fn drain_commands(&mut self, out: &mut Vec<RenderCommand>) {
        out.append(&mut self.pending_commands);
    }

    fn apply_event(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::MeshCreated { request, id } => {
                self.resolved_requests
                    .insert(request, RuntimeRenderResult::Mesh(id));
            }
            RenderEvent::Failed { request, reason } => {
                self.resolved_requests
                    .insert(request, RuntimeRenderResult::Failed(reason));
            }
        }
    }

    fn take_result(&mut self, request: RenderRequestID) -> Option<RuntimeRenderResult> {
        self.resolved_requests.remove(&request)
    }
}

/// The overlay context: scene, camera, animation and the session it drives.
/// Hosts own one of these per view; nothing in here is global.
pub struct Runtime {
    pub scene: SceneGraph,
    lifecycle: Lifecycle,
    session: Option<Box<dyn ArSession>>,
    camera: CameraPipeline,
    animation: AnimationClock,
    night: NightMode,
    background_uv: [[f32; 2]; 4],
    debounce: TapDebouncer,
    pending_taps: Vec<TapRequest>,
    tap_callback: Option<TapCallback>,
    host_events: Vec<HostEvent>,
    control: ControlQueue,
    render: RenderState,
    render_3d: render_3d::Render3DState,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            scene: SceneGraph::new(),
            lifecycle: Lifecycle::Idle,
            session: None,
            camera: CameraPipeline::new(),
            animation: AnimationClock::new(),
            night: NightMode::default(),
            background_uv: DEFAULT_BACKGROUND_UV,
            debounce: TapDebouncer::default(),
            pending_taps: Vec::new(),
            tap_callback: None,
            host_events: Vec::new(),
            control: ControlQueue::new(),
            render: RenderState::new(),
            render_3d: render_3d::Render3DState::new(),
        }
    }

    pub fn with_session(session: Box<dyn ArSession>) -> Self {
        let mut runtime = Self::new();
        runtime.session = Some(session);
        runtime
    }

    pub fn attach_session(&mut self, session: Box<dyn ArSession>) {
        if let Some(mut old) = self.session.replace(session) {
            old.pause();
        }
        self.lifecycle = Lifecycle::Idle;
    }

    pub fn set_debounce_window(&mut self, window_ms: u64) {
        self.debounce = TapDebouncer::new(window_ms);
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn camera(&self) -> &CameraPipeline {
        &self.camera
    }

    pub fn animation(&self) -> &AnimationClock {
        &self.animation
    }

    pub fn night_mode(&self) -> NightMode {
        self.night
    }

    pub fn host_handle(&self) -> HostHandle {
        self.control.handle()
    }

    pub fn set_tap_callback(&mut self, callback: impl FnMut(NodeID, &str) + 'static) {
        self.tap_callback = Some(Box::new(callback));
    }

    pub fn initialize_session(&mut self, options: SessionOptions) -> Result<(), SessionError> {
        let result = match self.session.as_mut() {
            None => Err(SessionError::Unavailable("no AR session attached".into())),
            Some(session) => session
                .configure(&options)
                .and_then(|()| session.resume()),
        };
        match result {
            Ok(()) => {
                log::info!("AR session initialized ({options:?})");
                self.lifecycle = Lifecycle::Running;
                self.host_events.push(HostEvent::SessionInitialized);
                Ok(())
            }
            Err(err) => {
                self.lifecycle = Lifecycle::Idle;
                self.report_error(&err);
                Err(err)
            }
        }
    }

    pub fn pause(&mut self) {
        if self.lifecycle != Lifecycle::Running {
            return;
        }
        if let Some(session) = self.session.as_mut() {
            session.pause();
        }
        self.pending_taps.clear();
        self.lifecycle = Lifecycle::Paused;
        log::info!("AR session paused");
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        match self.lifecycle {
            Lifecycle::Running => return Ok(()),
            Lifecycle::Idle => {
                let err = SessionError::NotInitialized;
                self.report_error(&err);
                return Err(err);
            }
            Lifecycle::Paused => {}
        }
        let result = match self.session.as_mut() {
            Some(session) => session.resume(),
            None => Err(SessionError::NotInitialized),
        };
        match result {
            Ok(()) => {
                self.lifecycle = Lifecycle::Running;
                log::info!("AR session resumed");
                Ok(())
            }
            Err(err) => {
                self.report_error(&err);
                Err(err)
            }
        }
    }

    pub fn set_night_mode(&mut self, enabled: bool, intensity: f32) {
        self.night.set(enabled, intensity);
        log::debug!(
            "night mode {} (brightness {})",
            if enabled { "on" } else { "off" },
            self.night.brightness()
        );
    }

    /// Viewport size in pixels plus the surface rotation in quarter turns.
    pub fn set_viewport(&mut self, width: u32, height: u32, rotation: u32) {
        self.camera.set_viewport(width, height);
        if let Some(session) = self.session.as_mut() {
            session.set_display_geometry(rotation, width, height);
        }
    }

    /// Queues a tap in viewport pixels. It is resolved during the next frame,
    /// after the camera has been updated.
    pub fn handle_tap(&mut self, x: f32, y: f32, timestamp_ms: u64) {
        if self.lifecycle != Lifecycle::Running {
            log::trace!("tap dropped: runtime not running");
            return;
        }
        self.pending_taps.push(TapRequest {
            screen: Vec2::new(x, y),
            timestamp_ms,
        });
    }

    /// One tick: host commands, session update, camera, picking, animation,
    /// then render extraction. Does nothing beyond host commands unless running.
    pub fn frame(&mut self, delta_time: f32) {
        self.pump_host_commands();

        if self.lifecycle != Lifecycle::Running {
            self.pending_taps.clear();
            return;
        }

        let Some(session) = self.session.as_mut() else {
            self.pending_taps.clear();
            return;
        };
        let frame = match session.update() {
            Ok(frame) => frame,
            Err(err) => {
                self.pending_taps.clear();
                self.report_error(&err);
                return;
            }
        };
        if frame.tracking != TrackingState::Tracking {
            log::trace!("tracking {:?}, frame skipped", frame.tracking);
            self.pending_taps.clear();
            return;
        }

        if let Some(uv) = frame.display_uv {
            self.background_uv = uv;
        }
        if let Some(image) = frame.image {
            self.queue_render_command(RenderCommand::Resource(
                ResourceCommand::UploadCameraImage {
                    width: image.width,
                    height: image.height,
                    rgba: image.rgba,
                },
            ));
        }

        self.camera.update(&frame.pose, frame.vertical_fov_deg);
        if self.camera.is_valid() {
            self.host_events.push(HostEvent::CameraTransform {
                position: self.camera.position().to_array(),
            });
        }

        self.resolve_pending_taps();
        self.animation.advance(&mut self.scene, delta_time);
        self.extract_frame_commands();
    }

    fn resolve_pending_taps(&mut self) {
        let mut taps = std::mem::take(&mut self.pending_taps);
        for tap in &taps {
            let Some(ray) = self.camera.screen_ray(tap.screen) else {
                log::trace!("tap dropped: camera invalid");
                continue;
            };
            if !self.debounce.accept(tap.timestamp_ms) {
                log::trace!("tap at {}ms debounced", tap.timestamp_ms);
                continue;
            }
            let Some(hit) = pick_body(&self.scene, &ray) else {
                continue;
            };
            log::debug!("tapped '{}' ({})", hit.name, hit.id);
            if let Some(callback) = self.tap_callback.as_mut() {
                callback(hit.id, &hit.name);
            }
            self.host_events.push(HostEvent::NodeTapped {
                id: hit.id,
                name: hit.name,
            });
        }
        taps.clear();
        self.pending_taps = taps;
    }

    fn report_error(&mut self, err: &SessionError) {
        log::error!("{err}");
        self.host_events.push(HostEvent::Error {
            message: err.to_string(),
        });
    }

    pub fn drain_host_events(&mut self, out: &mut Vec<HostEvent>) {
        out.append(&mut self.host_events);
    }

    pub fn queue_render_command(&mut self, command: RenderCommand) {
        self.render.queue_command(command);
    }

    pub fn drain_render_commands(&mut self, out: &mut Vec<RenderCommand>) {
        self.render.drain_commands(out);
    }

    pub fn apply_render_event(&mut self, event: RenderEvent) {
        self.render.apply_event(event);
    }

    pub fn apply_render_events<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = RenderEvent>,
    {
        for event in events {
            self.apply_render_event(event);
        }
    }

    pub fn take_render_result(&mut self, request: RenderRequestID) -> Option<RuntimeRenderResult> {
        self.render.take_result(request)
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::scripted::ScriptedSession;
    use crate::{ArFrame, CameraPose};
    use asterixia_scene::CelestialBodyDesc;
    use glam::Vec3;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn running_runtime() -> Runtime {
        let session = ScriptedSession::new(CameraPose::default());
        let mut runtime = Runtime::with_session(Box::new(session));
        runtime.set_viewport(400, 400, 0);
        runtime
            .initialize_session(SessionOptions::default())
            .expect("scripted session starts");
        runtime
    }

    fn tap_log(runtime: &mut Runtime) -> Rc<RefCell<Vec<(NodeID, String)>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        runtime.set_tap_callback(move |id, name| sink.borrow_mut().push((id, name.to_string())));
        log
    }

    fn add_target(runtime: &mut Runtime) -> NodeID {
        runtime.scene.add_celestial_body(CelestialBodyDesc {
            name: "Jupiter".into(),
            position: Vec3::new(0.0, 0.0, -5.0),
            base_scale: 0.5,
            ..Default::default()
        })
    }

    #[test]
    fn initialize_without_session_reports_error() {
        let mut runtime = Runtime::new();
        let result = runtime.initialize_session(SessionOptions::default());
        assert!(matches!(result, Err(SessionError::Unavailable(_))));
        let mut events = Vec::new();
        runtime.drain_host_events(&mut events);
        assert!(matches!(events.as_slice(), [HostEvent::Error { .. }]));
        assert_eq!(runtime.lifecycle(), Lifecycle::Idle);
    }

    #[test]
    fn initialize_emits_session_initialized() {
        let mut runtime = running_runtime();
        let mut events = Vec::new();
        runtime.drain_host_events(&mut events);
        assert_eq!(events, vec![HostEvent::SessionInitialized]);
        assert_eq!(runtime.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn centre_tap_hits_body_in_front() {
        let mut runtime = running_runtime();
        let taps = tap_log(&mut runtime);
        let target = add_target(&mut runtime);

        runtime.handle_tap(200.0, 200.0, 1_000);
        runtime.frame(0.016);

        assert_eq!(taps.borrow().as_slice(), &[(target, "Jupiter".to_string())]);
        let mut events = Vec::new();
        runtime.drain_host_events(&mut events);
        assert!(events.contains(&HostEvent::NodeTapped {
            id: target,
            name: "Jupiter".into()
        }));
    }

    #[test]
    fn debounced_taps_fire_once_then_again_after_window() {
        let mut runtime = running_runtime();
        let taps = tap_log(&mut runtime);
        add_target(&mut runtime);

        runtime.handle_tap(200.0, 200.0, 0);
        runtime.frame(0.016);
        runtime.handle_tap(200.0, 200.0, 100);
        runtime.frame(0.016);
        assert_eq!(taps.borrow().len(), 1);

        runtime.handle_tap(200.0, 200.0, 400);
        runtime.frame(0.016);
        assert_eq!(taps.borrow().len(), 2);
    }

    #[test]
    fn resolved_taps_are_not_replayed() {
        let mut runtime = running_runtime();
        let taps = tap_log(&mut runtime);
        add_target(&mut runtime);
        runtime.set_debounce_window(0);

        runtime.handle_tap(200.0, 200.0, 0);
        runtime.frame(0.016);
        runtime.frame(0.016);
        runtime.frame(0.016);
        assert_eq!(taps.borrow().len(), 1);
        assert!((runtime.animation().elapsed() - 0.048).abs() < 1e-6);
    }

    #[test]
    fn missed_tap_still_starts_debounce_window() {
        let mut runtime = running_runtime();
        let taps = tap_log(&mut runtime);
        add_target(&mut runtime);

        runtime.handle_tap(0.0, 0.0, 0);
        runtime.handle_tap(200.0, 200.0, 200);
        runtime.frame(0.016);
        assert!(taps.borrow().is_empty());
    }

    #[test]
    fn paused_runtime_ignores_frames_and_taps() {
        let mut runtime = running_runtime();
        let taps = tap_log(&mut runtime);
        add_target(&mut runtime);
        runtime.pause();
        assert_eq!(runtime.lifecycle(), Lifecycle::Paused);

        runtime.handle_tap(200.0, 200.0, 0);
        runtime.frame(0.016);
        let mut commands = Vec::new();
        runtime.drain_render_commands(&mut commands);
        assert!(commands.is_empty());
        assert!(taps.borrow().is_empty());
        assert_eq!(runtime.animation().frames(), 0);

        runtime.resume().expect("resume");
        runtime.handle_tap(200.0, 200.0, 10);
        runtime.frame(0.016);
        assert_eq!(taps.borrow().len(), 1);
    }

    #[test]
    fn session_error_becomes_event_and_loop_continues() {
        let mut session = ScriptedSession::new(CameraPose::default());
        session
            .frames
            .push_back(Err(SessionError::FrameUnavailable("camera busy".into())));
        let mut runtime = Runtime::with_session(Box::new(session));
        runtime.set_viewport(100, 100, 0);
        runtime.initialize_session(SessionOptions::default()).expect("init");

        runtime.frame(0.016);
        let mut events = Vec::new();
        runtime.drain_host_events(&mut events);
        assert!(events.iter().any(|e| matches!(
            e,
            HostEvent::Error { message } if message.contains("camera busy")
        )));

        runtime.frame(0.016);
        assert_eq!(runtime.animation().frames(), 1);
        assert_eq!(runtime.lifecycle(), Lifecycle::Running);
    }

    #[test]
    fn lost_tracking_skips_frame() {
        let mut session = ScriptedSession::new(CameraPose::default());
        session.frames.push_back(Ok(ArFrame {
            tracking: TrackingState::Paused,
            pose: CameraPose::default(),
            vertical_fov_deg: 60.0,
            display_uv: None,
            image: None,
        }));
        let mut runtime = Runtime::with_session(Box::new(session));
        runtime.set_viewport(100, 100, 0);
        runtime.initialize_session(SessionOptions::default()).expect("init");
        runtime.frame(0.016);
        let mut commands = Vec::new();
        runtime.drain_render_commands(&mut commands);
        assert!(commands.is_empty());
        assert_eq!(runtime.animation().frames(), 0);
    }

    #[test]
    fn camera_transform_is_published_each_frame() {
        let pose = CameraPose {
            position: Vec3::new(0.0, 1.6, 0.0),
            ..Default::default()
        };
        let mut runtime = Runtime::with_session(Box::new(ScriptedSession::new(pose)));
        runtime.set_viewport(100, 100, 0);
        runtime.initialize_session(SessionOptions::default()).expect("init");
        runtime.frame(0.016);
        let mut events = Vec::new();
        runtime.drain_host_events(&mut events);
        assert!(events.contains(&HostEvent::CameraTransform {
            position: [0.0, 1.6, 0.0]
        }));
    }

    #[test]
    fn resume_failure_keeps_runtime_paused() {
        let mut session = ScriptedSession::new(CameraPose::default());
        session.resume_error_after = Some((1, SessionError::PermissionDenied));
        let mut runtime = Runtime::with_session(Box::new(session));
        runtime.initialize_session(SessionOptions::default()).expect("init");
        runtime.pause();

        assert_eq!(runtime.resume(), Err(SessionError::PermissionDenied));
        assert_eq!(runtime.lifecycle(), Lifecycle::Paused);
        let mut events = Vec::new();
        runtime.drain_host_events(&mut events);
        assert!(matches!(events.last(), Some(HostEvent::Error { .. })));
    }

    #[test]
    fn resume_before_initialize_is_an_error() {
        let mut runtime = Runtime::with_session(Box::new(ScriptedSession::new(
            CameraPose::default(),
        )));
        assert_eq!(runtime.resume(), Err(SessionError::NotInitialized));
    }
}
