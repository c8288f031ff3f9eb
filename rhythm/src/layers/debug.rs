use engine::layers::{DrawContext, Layer};
use engine::DrawError;

use crate::debug::draw_overlay;
use crate::state::SketchState;

pub const DEBUG_LAYER_ID: &str = "debug";

/// Overlay with the clock, pointer and recent log messages. The sketch ticks the log.
pub struct DebugLayer;

impl Layer<SketchState> for DebugLayer {
    fn id(&self) -> &str {
        DEBUG_LAYER_ID
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, state: &mut SketchState) -> Result<(), DrawError> {
        let header = state.overlay_header(ctx.time);
        draw_overlay(
            &mut *ctx.gfx,
            ctx.canvas.width_f(),
            ctx.canvas.height_f(),
            &header,
            &state.log,
        );
        Ok(())
    }
}
