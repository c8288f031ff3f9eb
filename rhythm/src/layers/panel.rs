use engine::graphics::{Color, TextBaseline, TextStyle};
use engine::layers::{DrawContext, Layer};
use engine::ui::Rect;
use engine::DrawError;

use crate::state::SketchState;

pub const PANEL_LAYER_ID: &str = "panel";
const PANEL_FILL: Color = [0x11, 0x11, 0x11, 0x67];
const PANEL_OUTLINE: Color = [0xdd, 0xdd, 0xdd, 0xff];
const BUTTON_FILL: Color = [40, 40, 55, 255];
const BUTTON_TEXT: Color = [235, 235, 245, 255];

pub const PAUSE_BUTTON: Rect = Rect::new(16.0, 16.0, 80.0, 28.0);

pub fn panel_rect(canvas_w: f32, canvas_h: f32) -> Rect {
    Rect::new(0.0, 0.0, canvas_w / 3.0, canvas_h)
}

/// Fixed UI over the left third of the canvas.
pub struct PanelLayer;

impl Layer<SketchState> for PanelLayer {
    fn id(&self) -> &str {
        PANEL_LAYER_ID
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, state: &mut SketchState) -> Result<(), DrawError> {
        let panel = panel_rect(ctx.canvas.width_f(), ctx.canvas.height_f());
        ctx.gfx.fill_rect(panel, PANEL_FILL);
        ctx.gfx.stroke_rect(panel, PANEL_OUTLINE);

        ctx.gfx.fill_rect(PAUSE_BUTTON, BUTTON_FILL);
        ctx.gfx.stroke_rect(PAUSE_BUTTON, PANEL_OUTLINE);
        ctx.gfx.set_text_style(TextStyle {
            scale: 2,
            baseline: TextBaseline::Middle,
        });
        let label = if state.paused { "PLAY" } else { "PAUSE" };
        ctx.gfx.fill_text(
            PAUSE_BUTTON.x + 10.0,
            PAUSE_BUTTON.y + PAUSE_BUTTON.h / 2.0,
            label,
            BUTTON_TEXT,
        );
        Ok(())
    }
}
