use engine::graphics::{Color, TextBaseline, TextStyle, line_advance_y, text_width};
use engine::layers::{DrawContext, Layer};
use engine::ui::{Point, Rect};
use engine::DrawError;

use crate::state::SketchState;

pub const MASCOT_LAYER_ID: &str = "mascot";
pub const FACE: &str = "(^O^* )";
const FACE_COLOR: Color = [0xd2, 0xff, 0xf8, 0xff];
const FACE_SCALE: u32 = 3;
const FACE_AT: Point = Point::new(20.0, 20.0);

/// Where the mascot layer sits at time `t`: shifted right, bobbing up and down.
pub fn mascot_anchor(t: f64) -> Point {
    Point::new(100.0, ((t * 3.0).sin() * 5.0).round() as f32)
}

/// The face's box in mascot-layer space.
pub fn face_rect() -> Rect {
    Rect::new(
        FACE_AT.x,
        FACE_AT.y,
        text_width(FACE, FACE_SCALE),
        line_advance_y(FACE_SCALE),
    )
}

pub struct MascotLayer;

impl Layer<SketchState> for MascotLayer {
    fn id(&self) -> &str {
        MASCOT_LAYER_ID
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, _: &mut SketchState) -> Result<(), DrawError> {
        ctx.set_layer_offset(mascot_anchor(ctx.time));
        ctx.gfx.set_image_smoothing(false);
        ctx.gfx.set_text_style(TextStyle {
            scale: FACE_SCALE,
            baseline: TextBaseline::Top,
        });
        ctx.gfx.fill_text(FACE_AT.x, FACE_AT.y, FACE, FACE_COLOR);
        Ok(())
    }
}
