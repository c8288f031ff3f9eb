//! Wires the transport, layers, click regions and shared state into one frame-driven app.

use engine::app::{FrameApp, InputEvent};
use engine::graphics::Renderer2d;
use engine::hit_test::{HitRouter, PhysicalObject};
use engine::layers::{FrameReport, LayerHandle, LayerPipeline};
use engine::surface::SurfaceSize;
use engine::transport::Transport;
use engine::ui::Point;
use engine::DrawError;
use tracing::{info, warn};
use winit::event::VirtualKeyCode;

use crate::keyboard::KeyboardLayout;
use crate::layers::mascot::face_rect;
use crate::layers::notes::note_rect;
use crate::layers::panel::PAUSE_BUTTON;
use crate::layers::{BackgroundLayer, DebugLayer, KeyboardLayer, MascotLayer, NotesLayer, PanelLayer};
use crate::notes::{Note, NoteScheduler};
use crate::score::startup_score;
use crate::settings::SketchSettings;
use crate::state::{SketchRequest, SketchState};

#[derive(Debug, Clone, Copy)]
struct Handles {
    notes: LayerHandle,
    keyboard: LayerHandle,
    mascot: LayerHandle,
    panel: LayerHandle,
    debug: LayerHandle,
}

pub struct Sketch {
    transport: Transport,
    pipeline: LayerPipeline<SketchState>,
    router: HitRouter<SketchState>,
    state: SketchState,
    handles: Handles,
    canvas: SurfaceSize,
}

impl Sketch {
    /// The sketch with its startup score.
    pub fn from_settings(settings: &SketchSettings) -> Result<Self, DrawError> {
        Self::new(settings, startup_score())
    }

    pub fn new(settings: &SketchSettings, notes: Vec<Note>) -> Result<Self, DrawError> {
        let keyboard = settings.keyboard;
        let scheduler = NoteScheduler::new(notes, settings.tempo, &keyboard);
        info!(
            notes = scheduler.len(),
            bpm = settings.tempo.bpm,
            pixels_per_second = settings.tempo.pixels_per_second,
            "sketch ready"
        );

        let mut pipeline = LayerPipeline::new();
        pipeline.push(Box::new(BackgroundLayer))?;
        let handles = Handles {
            notes: pipeline.push(Box::new(NotesLayer))?,
            keyboard: pipeline.push(Box::new(KeyboardLayer))?,
            mascot: pipeline.push(Box::new(MascotLayer))?,
            panel: pipeline.push(Box::new(PanelLayer))?,
            debug: pipeline.push(Box::new(DebugLayer))?,
        };
        pipeline.set_visible(handles.debug, settings.show_debug)?;
        pipeline.set_visible(handles.keyboard, settings.show_keyboard)?;

        let mut router = HitRouter::new();
        register_regions(&mut router, &handles, &scheduler, &keyboard);

        Ok(Self {
            transport: Transport::with_lead_in(settings.lead_in),
            pipeline,
            router,
            state: SketchState::new(scheduler, keyboard),
            handles,
            canvas: SurfaceSize::default(),
        })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn state(&self) -> &SketchState {
        &self.state
    }

    pub fn pipeline(&self) -> &LayerPipeline<SketchState> {
        &self.pipeline
    }

    pub fn router(&self) -> &HitRouter<SketchState> {
        &self.router
    }

    pub fn canvas(&self) -> SurfaceSize {
        self.canvas
    }

    /// Advances the clock and draws every visible layer onto `gfx`.
    pub fn run_frame(&mut self, now_ms: f64, gfx: &mut dyn Renderer2d) -> FrameReport {
        let frame = self.transport.advance(now_ms);
        self.state.wall_clock_ms = now_ms;
        self.state.paused = self.transport.is_paused();
        self.canvas = gfx.size();

        let report = self.pipeline.run_frame(gfx, frame, self.canvas, &mut self.state);
        // Messages expire on the wall clock even while the overlay is hidden.
        self.state.log.tick(frame.delta);
        for err in &report.failed {
            self.state.log.push(format!("ERROR {err}"));
        }
        report
    }

    /// Routes a click and carries out whatever the hit region asked for.
    pub fn handle_click(&mut self, point: Point) -> Option<String> {
        let hit = self
            .router
            .handle_click(point, &self.pipeline, &mut self.state)
            .map(str::to_string);
        for request in self.state.take_requests() {
            self.apply(request);
        }
        hit
    }

    pub fn pointer_moved(&mut self, point: Point) {
        self.state.pointer = point;
    }

    pub fn key_pressed(&mut self, key: VirtualKeyCode) {
        let request = match key {
            VirtualKeyCode::Space => SketchRequest::TogglePause,
            VirtualKeyCode::R => SketchRequest::ResetTransport,
            VirtualKeyCode::D => SketchRequest::ToggleDebug,
            VirtualKeyCode::K => SketchRequest::ToggleKeyboard,
            _ => return,
        };
        self.apply(request);
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        if size != self.canvas {
            self.canvas = size;
            self.state
                .log
                .push(format!("RESIZE {}X{}", size.width, size.height));
        }
    }

    pub fn apply(&mut self, request: SketchRequest) {
        match request {
            SketchRequest::TogglePause => {
                let paused = self.transport.toggle_pause();
                self.state.paused = paused;
                self.state.log.push(if paused { "PAUSED" } else { "RESUMED" });
            }
            SketchRequest::ResetTransport => {
                self.transport.reset();
                self.state.log.push("RESET");
            }
            SketchRequest::ToggleDebug => self.toggle_layer(self.handles.debug, "DEBUG"),
            SketchRequest::ToggleKeyboard => self.toggle_layer(self.handles.keyboard, "KEYBOARD"),
        }
    }

    fn toggle_layer(&mut self, handle: LayerHandle, name: &str) {
        match self.pipeline.toggle_visible(handle) {
            Ok(visible) => {
                let state = if visible { "ON" } else { "OFF" };
                self.state.log.push(format!("{name} {state}"));
            }
            Err(err) => warn!(error = %err, "cannot toggle layer"),
        }
    }
}

/// Registration order is priority order and mirrors paint order from the top: controls,
/// then keys (black ahead of the white keys they overlap), then the notes painted under
/// the keyboard.
fn register_regions(
    router: &mut HitRouter<SketchState>,
    handles: &Handles,
    scheduler: &NoteScheduler,
    keyboard: &KeyboardLayout,
) {
    router.register(
        PhysicalObject::new("pause-button", PAUSE_BUTTON, handles.panel)
            .on_click(|_, state: &mut SketchState| state.request(SketchRequest::TogglePause)),
    );
    router.register(
        PhysicalObject::new("mascot", face_rect(), handles.mascot)
            .on_click(|_, state: &mut SketchState| state.log.push("HI THERE")),
    );

    for (pitch, rect) in keyboard.key_regions() {
        router.register(
            PhysicalObject::new(format!("key-{pitch}"), rect, handles.keyboard).on_click(
                move |_, state: &mut SketchState| state.log.push(format!("KEY {pitch}")),
            ),
        );
    }

    let tempo = scheduler.tempo();
    for (i, note) in scheduler.notes().iter().enumerate() {
        let Ok(rect) = note_rect(note, &tempo, keyboard) else {
            continue;
        };
        let (pitch, start) = (note.pitch, note.start);
        router.register(
            PhysicalObject::new(format!("note-{i}"), rect, handles.notes).on_click(
                move |_, state: &mut SketchState| {
                    state.log.push(format!("NOTE {pitch} AT BEAT {start}"));
                },
            ),
        );
    }
}

impl FrameApp for Sketch {
    fn input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMoved(p) => self.pointer_moved(p),
            InputEvent::Click(p) => {
                self.handle_click(p);
            }
            InputEvent::Key(key) => self.key_pressed(key),
            InputEvent::Resized(size) => self.resize(size),
        }
    }

    fn frame(&mut self, now_ms: f64, gfx: &mut dyn Renderer2d) {
        self.run_frame(now_ms, gfx);
    }
}
