use engine::layers::{DrawContext, Layer};
use engine::ui::Point;
use engine::DrawError;

use crate::state::SketchState;

pub const KEYBOARD_LAYER_ID: &str = "keyboard";

/// The keyboard along the bottom edge, lighting the keys of sounding notes.
pub struct KeyboardLayer;

impl Layer<SketchState> for KeyboardLayer {
    fn id(&self) -> &str {
        KEYBOARD_LAYER_ID
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, state: &mut SketchState) -> Result<(), DrawError> {
        let layout = state.keyboard;
        ctx.set_layer_offset(Point::new(
            layout.origin_x(ctx.canvas.width_f()),
            ctx.canvas.height_f() - layout.white_key_height,
        ));
        let lit = state.scheduler.sounding_pitches(ctx.time);
        layout.draw(&mut *ctx.gfx, &lit);
        Ok(())
    }
}
