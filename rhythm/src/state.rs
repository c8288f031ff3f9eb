use engine::ui::Point;

use crate::debug::{DebugLog, OverlayHeader};
use crate::keyboard::KeyboardLayout;
use crate::notes::NoteScheduler;

/// Distance of the hit line above the bottom of the canvas.
pub const HIT_LINE_FROM_BOTTOM: f32 = 100.0;

pub fn hit_line(canvas_height: f32) -> f32 {
    canvas_height - HIT_LINE_FROM_BOTTOM
}

/// Things click handlers want done to parts of the sketch they cannot reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SketchRequest {
    TogglePause,
    ResetTransport,
    ToggleDebug,
    ToggleKeyboard,
}

/// Shared state handed to every layer and click handler.
#[derive(Debug, Default)]
pub struct SketchState {
    pub scheduler: NoteScheduler,
    pub keyboard: KeyboardLayout,
    pub log: DebugLog,
    pub pointer: Point,
    /// Host timestamp of the frame being drawn.
    pub wall_clock_ms: f64,
    pub paused: bool,
    requests: Vec<SketchRequest>,
}

impl SketchState {
    pub fn new(scheduler: NoteScheduler, keyboard: KeyboardLayout) -> Self {
        Self {
            scheduler,
            keyboard,
            ..Self::default()
        }
    }

    pub fn request(&mut self, request: SketchRequest) {
        self.requests.push(request);
    }

    pub fn take_requests(&mut self) -> Vec<SketchRequest> {
        std::mem::take(&mut self.requests)
    }

    pub fn overlay_header(&self, time: f64) -> OverlayHeader {
        OverlayHeader {
            time,
            wall_clock_ms: self.wall_clock_ms,
            pointer: self.pointer,
            paused: self.paused,
        }
    }
}
