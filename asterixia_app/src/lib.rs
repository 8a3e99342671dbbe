use asterixia_graphics::GraphicsBackend;
use asterixia_render_bridge::{RenderCommand, RenderEvent};
use asterixia_runtime::{HostEvent, Lifecycle, Runtime, SessionError};
use std::sync::Arc;
use winit::window::Window;

pub mod session;
pub mod winit_runner;

pub use session::DesktopSession;

/// Ties the overlay runtime to a graphics backend and moves commands and
/// events between them once per frame.
pub struct App<B: GraphicsBackend> {
    pub runtime: Runtime,
    pub graphics: B,
    night_intensity: f32,
    command_buffer: Vec<RenderCommand>,
    event_buffer: Vec<RenderEvent>,
}

impl<B: GraphicsBackend> App<B> {
    pub fn new(runtime: Runtime, graphics: B) -> Self {
        let night_intensity = runtime.night_mode().intensity;
        Self {
            runtime,
            graphics,
            night_intensity,
            command_buffer: Vec::new(),
            event_buffer: Vec::new(),
        }
    }

    #[inline]
    pub fn attach_window(&mut self, window: Arc<Window>) {
        self.graphics.attach_window(window);
    }

    #[inline]
    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.graphics.resize(width, height);
        self.runtime.set_viewport(width, height, 0);
    }

    #[inline]
    pub fn present(&mut self) {
        self.runtime.drain_render_commands(&mut self.command_buffer);
        self.graphics.submit_many(self.command_buffer.drain(..));

        self.graphics.draw_frame();

        self.graphics.drain_events(&mut self.event_buffer);
        self.runtime.apply_render_events(self.event_buffer.drain(..));
    }

    pub fn frame(&mut self, delta_time: f32) {
        self.runtime.frame(delta_time);
        self.present();
    }

    #[inline]
    pub fn tap(&mut self, x: f32, y: f32, timestamp_ms: u64) {
        self.runtime.handle_tap(x, y, timestamp_ms);
    }

    /// Flips night mode, keeping the configured intensity.
    pub fn toggle_night(&mut self) -> bool {
        let enabled = !self.runtime.night_mode().enabled;
        self.runtime.set_night_mode(enabled, self.night_intensity);
        enabled
    }

    /// Pauses a running session or resumes a paused one.
    pub fn toggle_pause(&mut self) -> Result<Lifecycle, SessionError> {
        match self.runtime.lifecycle() {
            Lifecycle::Running => self.runtime.pause(),
            Lifecycle::Paused | Lifecycle::Idle => self.runtime.resume()?,
        }
        Ok(self.runtime.lifecycle())
    }

    #[inline]
    pub fn drain_host_events(&mut self, out: &mut Vec<HostEvent>) {
        self.runtime.drain_host_events(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asterixia_graphics::NullGraphics;
    use asterixia_render_bridge::FrameCommand;
    use asterixia_runtime::SessionOptions;
    use asterixia_scene::{BodyKind, CelestialBodyDesc};
    use glam::Vec3;

    fn running_app() -> App<NullGraphics> {
        let mut runtime = Runtime::with_session(Box::new(DesktopSession::new(60.0)));
        runtime.set_night_mode(false, 0.4);
        runtime
            .initialize_session(SessionOptions::default())
            .unwrap();
        let mut app = App::new(runtime, NullGraphics::new());
        app.resize_surface(800, 600);
        app
    }

    fn earth() -> CelestialBodyDesc {
        CelestialBodyDesc {
            name: "Earth".to_string(),
            kind: BodyKind::Planet,
            position: Vec3::new(0.0, 0.0, -3.0),
            ..CelestialBodyDesc::default()
        }
    }

    #[test]
    fn frames_reach_the_backend() {
        let mut app = running_app();
        app.runtime.scene.add_celestial_body(earth());
        app.frame(1.0 / 60.0);
        app.frame(1.0 / 60.0);

        assert!(app.graphics.frames_drawn() >= 1);
        assert_eq!(app.graphics.camera_images(), 1);
        let frame = app.graphics.last_frame();
        assert!(matches!(frame.first(), Some(FrameCommand::Clear { .. })));
        assert!(
            frame
                .iter()
                .any(|c| matches!(c, FrameCommand::DrawBody { .. }))
        );
    }

    #[test]
    fn night_toggle_keeps_intensity() {
        let mut app = running_app();
        assert!(app.toggle_night());
        assert!(app.runtime.night_mode().enabled);
        assert_eq!(app.runtime.night_mode().intensity, 0.4);
        assert!(!app.toggle_night());
        assert!(!app.runtime.night_mode().enabled);
    }

    #[test]
    fn pause_toggle_round_trips() {
        let mut app = running_app();
        assert_eq!(app.toggle_pause(), Ok(Lifecycle::Paused));
        assert_eq!(app.toggle_pause(), Ok(Lifecycle::Running));
    }

    #[test]
    fn tap_on_body_is_reported() {
        let mut app = running_app();
        let id = app.runtime.scene.add_celestial_body(earth());
        app.frame(0.0);
        app.tap(400.0, 300.0, 1_000);
        app.frame(0.0);

        let mut events = Vec::new();
        app.drain_host_events(&mut events);
        assert!(events.iter().any(
            |e| matches!(e, HostEvent::NodeTapped { id: hit, name } if *hit == id && name == "Earth")
        ));
    }
}
