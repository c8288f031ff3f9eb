use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use engine::app::{AppConfig, run_app};
use engine::graphics::Renderer2d;
use engine::snapshot::rgba_sha256_hex;
use engine::surface::{RgbaBufferSurface, Surface, SurfaceSize};
use rhythm::{SettingsStore, Sketch, SketchSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;

/// Falling notes over a piano keyboard.
#[derive(Parser, Debug)]
#[command(name = "rhythm")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Settings JSON file; overrides RHYTHM_SETTINGS_PATH
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Render without a window and print the final frame hash
    #[arg(long)]
    headless: bool,

    /// Frames to render in headless mode
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Simulated frame rate in headless mode
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let store = match &cli.settings {
        Some(path) => SettingsStore::at(path),
        None => SettingsStore::from_env(),
    };
    let mut settings = store.load().with_env_overrides();
    if let Some(width) = cli.width {
        settings.window.width = width;
    }
    if let Some(height) = cli.height {
        settings.window.height = height;
    }
    let settings = settings.sanitized();
    let sketch = Sketch::from_settings(&settings)?;

    if cli.headless {
        let hash = run_headless(sketch, &settings, cli.frames, cli.fps);
        println!("{hash}");
        return Ok(());
    }

    let config = AppConfig {
        title: settings.window.title.clone(),
        desired_size: PhysicalSize::new(settings.window.width, settings.window.height),
        clamp_to_monitor: settings.window.clamp_to_monitor,
        vsync: settings.window.vsync,
    };
    run_app(config, sketch)
}

/// Renders `frames` frames at a fixed step and returns the hash of the last one.
fn run_headless(mut sketch: Sketch, settings: &SketchSettings, frames: u32, fps: f64) -> String {
    let size = SurfaceSize::new(settings.window.width, settings.window.height);
    let mut surface = RgbaBufferSurface::new(size);
    let step_ms = 1000.0 / fps.clamp(1.0, 1000.0);

    for i in 0..frames {
        let mut gfx = surface.renderer();
        gfx.begin_frame(size);
        let report = sketch.run_frame(i as f64 * step_ms, &mut gfx);
        if !report.is_clean() {
            info!(frame = i, failed = report.failed.len(), "frame had failing layers");
        }
    }

    let hash = rgba_sha256_hex(surface.frame());
    info!(frames, %hash, "headless run finished");
    hash
}
