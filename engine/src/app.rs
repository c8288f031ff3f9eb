use std::error::Error;
use std::time::Instant;

use pixels::{Pixels, PixelsBuilder, SurfaceTexture};
use tracing::{error, info};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseButton, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::graphics::Renderer2d;
use crate::pixels_renderer::PixelsRenderer2d;
use crate::surface::SurfaceSize;
use crate::ui::Point;

pub struct AppConfig {
    pub title: String,
    pub desired_size: PhysicalSize<u32>,
    pub clamp_to_monitor: bool,
    pub vsync: Option<bool>,
}

/// Host events, already translated into canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved(Point),
    Click(Point),
    Key(VirtualKeyCode),
    Resized(SurfaceSize),
}

/// Something that renders once per host frame and reacts to input between frames.
pub trait FrameApp {
    /// Called between frames, never while a frame is being drawn.
    fn input(&mut self, event: InputEvent);

    /// Draws one frame. `now_ms` is a monotonic timestamp in milliseconds.
    fn frame(&mut self, now_ms: f64, gfx: &mut dyn Renderer2d);
}

/// Opens a window and drives `app` until the window closes.
///
/// Every iteration requests the next redraw; closing the window (or pressing Escape) is the
/// only way the loop stops.
pub fn run_app<A: FrameApp + 'static>(config: AppConfig, mut app: A) -> Result<(), Box<dyn Error>> {
    let event_loop = EventLoop::new();
    let monitor_size = if config.clamp_to_monitor {
        event_loop.primary_monitor().map(|m| m.size())
    } else {
        None
    };
    let initial_size = if let Some(monitor) = monitor_size {
        PhysicalSize::new(
            config.desired_size.width.min(monitor.width),
            config.desired_size.height.min(monitor.height),
        )
    } else {
        config.desired_size
    };
    let window = WindowBuilder::new()
        .with_title(config.title)
        .with_inner_size(initial_size)
        .build(&event_loop)?;

    let window_size = window.inner_size();
    let surface_size = SurfaceSize::new(window_size.width, window_size.height);

    let surface_texture = SurfaceTexture::new(surface_size.width, surface_size.height, &window);
    let mut pixels_builder =
        PixelsBuilder::new(surface_size.width, surface_size.height, surface_texture);
    if let Some(vsync) = config.vsync {
        pixels_builder = pixels_builder.enable_vsync(vsync);
    }
    let pixels: Pixels = pixels_builder.build()?;
    let mut renderer = PixelsRenderer2d::new(pixels, surface_size)?;
    app.input(InputEvent::Resized(surface_size));
    info!(width = surface_size.width, height = surface_size.height, "window ready");

    let started = Instant::now();
    let mut pointer = Point::ZERO;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match &event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    let size = SurfaceSize::new(size.width, size.height);
                    if let Err(err) = renderer.resize(size) {
                        error!(%err, "resize failed");
                    }
                    app.input(InputEvent::Resized(renderer.size()));
                    window.request_redraw();
                }
                WindowEvent::CursorMoved { position, .. } => {
                    pointer = Point::new(position.x as f32, position.y as f32);
                    app.input(InputEvent::PointerMoved(pointer));
                }
                WindowEvent::MouseInput {
                    state: ElementState::Pressed,
                    button: MouseButton::Left,
                    ..
                } => {
                    app.input(InputEvent::Click(pointer));
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state: ElementState::Pressed,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    if *key == VirtualKeyCode::Escape {
                        *control_flow = ControlFlow::Exit;
                    } else {
                        app.input(InputEvent::Key(*key));
                    }
                }
                _ => {}
            },
            Event::RedrawRequested(_) => {
                let now_ms = started.elapsed().as_secs_f64() * 1000.0;
                renderer.draw_frame(|gfx| app.frame(now_ms, gfx));
                if let Err(err) = renderer.present() {
                    error!(%err, "present failed");
                }
            }
            Event::MainEventsCleared => {
                window.request_redraw();
            }
            _ => {}
        }
    });
}
