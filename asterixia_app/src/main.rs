use anyhow::Context;
use asterixia_app::{App, DesktopSession, winit_runner::WinitRunner};
use asterixia_graphics::{AsterixiaGraphics, DirAssetSource};
use asterixia_project::bootstrap_viewer;
use asterixia_runtime::{Runtime, SessionOptions};
use std::path::PathBuf;

fn project_root() -> anyhow::Result<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    match args.iter().position(|a| a == "--path") {
        Some(i) => args
            .get(i + 1)
            .map(PathBuf::from)
            .context("--path needs a directory"),
        None => Ok(std::env::current_dir()?),
    }
}

fn main() -> anyhow::Result<()> {
    let root = project_root()?;
    let project = bootstrap_viewer(&root, "Asterixia")
        .with_context(|| format!("loading viewer config in {}", root.display()))?;
    let config = project.config;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    let mut runtime = Runtime::with_session(Box::new(DesktopSession::new(config.vertical_fov_deg)));
    runtime.set_debounce_window(config.tap_debounce_ms);
    runtime.set_night_mode(config.night_mode, config.night_intensity);
    let added = project.scene.populate(&mut runtime.scene);
    log::info!("{}: {added} scene nodes from config", config.name);
    runtime.initialize_session(SessionOptions::default())?;

    let graphics = AsterixiaGraphics::new(DirAssetSource::new(config.assets_dir(&root)));
    let app = App::new(runtime, graphics);
    WinitRunner::new().run_with_fps_cap(
        app,
        &config.name,
        (config.window_width, config.window_height),
        config.fps_cap as f32,
    )?;
    Ok(())
}
