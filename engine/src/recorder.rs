//! A `Renderer2d` that keeps a list of what was drawn instead of rasterizing it.
//!
//! Geometry is recorded in canvas space (after translation) together with the effective
//! alpha, so tests can assert on where layers ended up without decoding pixels.

use crate::graphics::{Color, GraphicsState, Renderer2d, TextStyle};
use crate::surface::SurfaceSize;
use crate::ui::{Point, Rect};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Color),
    Save,
    Restore,
    Translate { dx: f32, dy: f32 },
    FillRect { rect: Rect, color: Color, alpha: f32 },
    StrokeRect { rect: Rect, color: Color, alpha: f32 },
    Line { from: Point, to: Point, color: Color, alpha: f32 },
    Text { pos: Point, text: String, color: Color, style: TextStyle },
}

#[derive(Debug, Clone, Default)]
pub struct CommandRecorder {
    size: SurfaceSize,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    commands: Vec<DrawCommand>,
}

impl CommandRecorder {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn translation(&self) -> Point {
        self.state.translation
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn translate_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Translate { .. }))
            .count()
    }

    pub fn fill_rects(&self) -> impl Iterator<Item = (Rect, Color, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillRect { rect, color, alpha } => Some((*rect, *color, *alpha)),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn alpha_of(&self, color: Color) -> f32 {
        self.state.alpha * (color[3] as f32 / 255.0)
    }
}

impl Renderer2d for CommandRecorder {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
        self.state = GraphicsState::default();
        self.stack.clear();
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.state = prev;
            self.commands.push(DrawCommand::Restore);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.translation = self.state.translation + Point::new(dx, dy);
        self.commands.push(DrawCommand::Translate { dx, dy });
    }

    fn set_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_image_smoothing(&mut self, enabled: bool) {
        self.state.smoothing = enabled;
    }

    fn set_text_style(&mut self, style: TextStyle) {
        self.state.text = style;
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let cmd = DrawCommand::FillRect {
            rect: rect.translated(self.state.translation),
            color,
            alpha: self.alpha_of(color),
        };
        self.commands.push(cmd);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        let cmd = DrawCommand::StrokeRect {
            rect: rect.translated(self.state.translation),
            color,
            alpha: self.alpha_of(color),
        };
        self.commands.push(cmd);
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color) {
        let t = self.state.translation;
        let cmd = DrawCommand::Line {
            from: from + t,
            to: to + t,
            color,
            alpha: self.alpha_of(color),
        };
        self.commands.push(cmd);
    }

    fn fill_text(&mut self, x: f32, y: f32, text: &str, color: Color) {
        let cmd = DrawCommand::Text {
            pos: Point::new(x, y) + self.state.translation,
            text: text.to_string(),
            color,
            style: self.state.text,
        };
        self.commands.push(cmd);
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(DrawCommand::Clear(color));
    }
}
