use engine::graphics::{Color, SavedState};
use engine::layers::{DrawContext, Layer};
use engine::surface::SurfaceSize;
use engine::ui::{Point, Rect};
use engine::DrawError;

use crate::keyboard::{KeyboardError, KeyboardLayout};
use crate::notes::{Note, Tempo};
use crate::state::{SketchState, hit_line};

pub const NOTES_LAYER_ID: &str = "notes";

/// Segments per note bar; alpha steps down toward the tail.
pub const NOTE_FADE_SEGMENTS: usize = 4;

const NOTE_COLOR: Color = [69, 129, 94, 255];
const NOTE_HIT_COLOR: Color = [120, 220, 170, 255];
const NOTE_OUTLINE: Color = [255, 255, 255, 255];

/// Layer origin: the hit line at beat zero, scrolled down by the baseline.
pub fn note_anchor(canvas: SurfaceSize, keyboard: &KeyboardLayout, tempo: &Tempo, t: f64) -> Point {
    Point::new(
        keyboard.origin_x(canvas.width_f()),
        hit_line(canvas.height_f()) + tempo.baseline(t) as f32,
    )
}

/// A note's bar in notes-layer space. The head (start) is the bottom edge.
pub fn note_rect(note: &Note, tempo: &Tempo, keyboard: &KeyboardLayout) -> Result<Rect, KeyboardError> {
    let key = keyboard.key_position(note.pitch)?;
    let start = tempo.position_start(note) as f32;
    let end = tempo.position_end(note) as f32;
    Ok(Rect::new(key.x, -end, key.width, end - start))
}

pub struct NotesLayer;

impl Layer<SketchState> for NotesLayer {
    fn id(&self) -> &str {
        NOTES_LAYER_ID
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, state: &mut SketchState) -> Result<(), DrawError> {
        let tempo = state.scheduler.tempo();
        let anchor = note_anchor(ctx.canvas, &state.keyboard, &tempo, ctx.time);
        ctx.set_layer_offset(anchor);
        let canvas_h = ctx.canvas.height_f();

        for note in state.scheduler.notes() {
            // A note the current keyboard cannot show is skipped, not fatal to the layer.
            let Ok(rect) = note_rect(note, &tempo, &state.keyboard) else {
                continue;
            };
            let top = rect.y + anchor.y;
            if top > canvas_h || top + rect.h < 0.0 {
                continue;
            }

            let color = if state.scheduler.state_of(note, ctx.time).is_hit() {
                NOTE_HIT_COLOR
            } else {
                NOTE_COLOR
            };
            let segment_h = rect.h / NOTE_FADE_SEGMENTS as f32;
            let mut gfx = SavedState::new(&mut *ctx.gfx);
            for i in 0..NOTE_FADE_SEGMENTS {
                gfx.set_alpha(1.0 - i as f32 / NOTE_FADE_SEGMENTS as f32);
                let y = rect.bottom() - (i + 1) as f32 * segment_h;
                gfx.fill_rect(Rect::new(rect.x, y, rect.w, segment_h), color);
            }
            gfx.set_alpha(1.0);
            gfx.stroke_rect(rect, NOTE_OUTLINE);
        }
        Ok(())
    }
}
