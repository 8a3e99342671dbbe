use crate::App;
use asterixia_graphics::GraphicsBackend;
use asterixia_runtime::HostEvent;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use winit::{
    dpi::{PhysicalPosition, PhysicalSize},
    error::EventLoopError,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes},
};

const DEFAULT_FPS_CAP: f32 = 60.0;
const LOG_INTERVAL_SECONDS: f32 = 2.5;
const FPS_CAP_COMPENSATION: f32 = 1.03;
const SPIN_TAIL_THRESHOLD: Duration = Duration::from_micros(500);

pub struct WinitRunner;

impl WinitRunner {
    pub fn new() -> Self {
        Self
    }

    pub fn run<B: GraphicsBackend>(
        self,
        app: App<B>,
        title: &str,
        size: (u32, u32),
    ) -> Result<(), EventLoopError> {
        self.run_with_fps_cap(app, title, size, DEFAULT_FPS_CAP)
    }

    pub fn run_with_fps_cap<B: GraphicsBackend>(
        self,
        app: App<B>,
        title: &str,
        size: (u32, u32),
        fps_cap: f32,
    ) -> Result<(), EventLoopError> {
        let event_loop = EventLoop::new()?;
        let mut state = RunnerState::new(app, title, size, fps_cap);
        event_loop.run_app(&mut state)
    }
}

impl Default for WinitRunner {
    fn default() -> Self {
        Self::new()
    }
}

struct RunnerState<B: GraphicsBackend> {
    app: App<B>,
    title: String,
    size: (u32, u32),
    window: Option<Arc<Window>>,
    fps_cap: f32,
    started: Instant,
    cursor: PhysicalPosition<f64>,
    host_events: Vec<HostEvent>,
    last_frame_end: Instant,
    batch_frames: u32,
    batch_start: Instant,
    batch_work: Duration,
}

impl<B: GraphicsBackend> RunnerState<B> {
    fn new(app: App<B>, title: &str, size: (u32, u32), fps_cap: f32) -> Self {
        let now = Instant::now();
        Self {
            app,
            title: title.to_owned(),
            size,
            window: None,
            fps_cap: fps_cap.max(1.0),
            started: now,
            cursor: PhysicalPosition::new(0.0, 0.0),
            host_events: Vec::new(),
            last_frame_end: now,
            batch_frames: 0,
            batch_start: now,
            batch_work: Duration::ZERO,
        }
    }

    fn redraw(&mut self) {
        let target = Duration::from_secs_f32(1.0 / (self.fps_cap * FPS_CAP_COMPENSATION));
        let frame_start = Instant::now();
        let delta = frame_start.duration_since(self.last_frame_end);

        let work_start = Instant::now();
        self.app.frame(delta.as_secs_f32());
        self.report_host_events();
        let work_duration = work_start.elapsed();

        let elapsed = frame_start.elapsed();
        if elapsed < target {
            let remaining = target - elapsed;
            if remaining > SPIN_TAIL_THRESHOLD {
                std::thread::sleep(remaining - SPIN_TAIL_THRESHOLD);
            }
            let deadline = frame_start + target;
            while Instant::now() < deadline {
                std::hint::spin_loop();
            }
        }

        let frame_end = Instant::now();
        self.last_frame_end = frame_end;

        self.batch_frames = self.batch_frames.saturating_add(1);
        self.batch_work += work_duration;

        let batch_elapsed = frame_end.duration_since(self.batch_start);
        if batch_elapsed.as_secs_f32() >= LOG_INTERVAL_SECONDS && self.batch_frames > 0 {
            let capped_fps = self.batch_frames as f32 / batch_elapsed.as_secs_f32();
            let avg_work_us =
                self.batch_work.as_secs_f64() * 1_000_000.0 / self.batch_frames as f64;
            log::debug!(
                "delta: {:.3}ms | fps: {:.2} | {} frames, {:.1}us avg work",
                delta.as_secs_f64() * 1000.0,
                capped_fps,
                self.batch_frames,
                avg_work_us,
            );

            self.batch_frames = 0;
            self.batch_work = Duration::ZERO;
            self.batch_start = frame_end;
        }
    }

    fn report_host_events(&mut self) {
        self.app.drain_host_events(&mut self.host_events);
        for event in self.host_events.drain(..) {
            match event {
                HostEvent::NodeTapped { id, name } => {
                    log::info!("tapped {name} ({})", id.to_hex())
                }
                HostEvent::Error { message } => log::error!("{message}"),
                HostEvent::SessionInitialized => log::info!("session initialized"),
                HostEvent::CameraTransform { position } => {
                    log::trace!("camera at {position:?}")
                }
            }
        }
    }

    fn timestamp_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: &Key) {
        match key {
            Key::Named(NamedKey::Escape) => event_loop.exit(),
            Key::Named(NamedKey::Space) => match self.app.toggle_pause() {
                Ok(state) => log::info!("session {state:?}"),
                Err(err) => log::error!("cannot resume: {err}"),
            },
            Key::Character(c) if c.eq_ignore_ascii_case("n") => {
                let on = self.app.toggle_night();
                log::info!("night mode {}", if on { "on" } else { "off" });
            }
            _ => {}
        }
    }
}

impl<B: GraphicsBackend> winit::application::ApplicationHandler for RunnerState<B> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(self.size.0, self.size.1));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        let size = window.inner_size();
        self.app.resize_surface(size.width, size.height);
        self.app.attach_window(window.clone());
        self.window = Some(window);

        let now = Instant::now();
        self.last_frame_end = now;
        self.batch_start = now;
        self.batch_frames = 0;
        self.batch_work = Duration::ZERO;
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::RedrawRequested => self.redraw(),
            WindowEvent::Resized(size) => self.app.resize_surface(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => self.cursor = position,
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                let ts = self.timestamp_ms();
                self.app
                    .tap(self.cursor.x as f32, self.cursor.y as f32, ts);
            }
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                if !event.repeat {
                    self.handle_key(event_loop, &event.logical_key);
                }
            }
            WindowEvent::CloseRequested => event_loop.exit(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
