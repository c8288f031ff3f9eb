use engine::graphics::Color;
use engine::layers::{DrawContext, Layer};
use engine::ui::Point;
use engine::DrawError;

use crate::state::{SketchState, hit_line};

pub const BACKGROUND: Color = [0x11, 0x11, 0x11, 255];
const HIT_LINE_COLOR: Color = [0x44, 0x44, 0x44, 255];
const GRID_COLOR: Color = [0x49, 0x49, 0x49, 0xc0];
const GRID_STEP: usize = 20;
const TRAIL_COLOR: Color = [255, 255, 255, 255];
pub const TRAIL_DOTS: usize = 40;

/// Vertical wobble of trail dot `i` at time `t`, in `[-1, 1]`.
pub fn trail_wobble(t: f64, i: usize) -> f32 {
    ((t - i as f64 * 0.016) * 3.0).sin() as f32
}

pub struct BackgroundLayer;

impl Layer<SketchState> for BackgroundLayer {
    fn id(&self) -> &str {
        "background"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, _: &mut SketchState) -> Result<(), DrawError> {
        let w = ctx.canvas.width_f();
        let h = ctx.canvas.height_f();
        let gfx = &mut *ctx.gfx;

        gfx.clear(BACKGROUND);
        let y = hit_line(h);
        gfx.stroke_line(Point::new(0.0, y), Point::new(w, y), HIT_LINE_COLOR);

        for x in (0..ctx.canvas.width).step_by(GRID_STEP) {
            let x = x as f32;
            gfx.stroke_line(Point::new(x, 0.0), Point::new(x, h), GRID_COLOR);
        }
        for y in (0..ctx.canvas.height).step_by(GRID_STEP) {
            let y = y as f32;
            gfx.stroke_line(Point::new(0.0, y), Point::new(w, y), GRID_COLOR);
        }

        for i in 0..TRAIL_DOTS {
            gfx.set_alpha(1.0 - i as f32 / TRAIL_DOTS as f32);
            let wob = trail_wobble(ctx.time, i);
            gfx.fill_rect_centered(w - 50.0 + i as f32, 40.0 + wob * 20.0, 2.0, 2.0, TRAIL_COLOR);
        }
        Ok(())
    }
}
