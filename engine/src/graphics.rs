use std::ops::{Deref, DerefMut};

use crate::surface::SurfaceSize;
use crate::ui::{Point, Rect};

pub type Color = [u8; 4];

// Built-in 3x5 block font, scaled by whole pixels.
pub const DEFAULT_TEXT_SCALE: u32 = 2;
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

pub fn glyph_advance_x(scale: u32) -> f32 {
    ((GLYPH_W + 1) * scale.max(1)) as f32
}

pub fn line_advance_y(scale: u32) -> f32 {
    ((GLYPH_H + 1) * scale.max(1)) as f32
}

/// Width in pixels of the widest line of `text` at `scale`.
pub fn text_width(text: &str, scale: u32) -> f32 {
    let widest = text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    widest as f32 * glyph_advance_x(scale)
}

/// Where the `y` passed to `fill_text` sits relative to the glyphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextBaseline {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStyle {
    pub scale: u32,
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            scale: DEFAULT_TEXT_SCALE,
            baseline: TextBaseline::Top,
        }
    }
}

impl TextStyle {
    pub fn with_scale(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
            ..Self::default()
        }
    }

    fn glyph_height(&self) -> f32 {
        (GLYPH_H * self.scale.max(1)) as f32
    }

    fn top_of(&self, y: f32) -> f32 {
        match self.baseline {
            TextBaseline::Top => y,
            TextBaseline::Middle => y - self.glyph_height() / 2.0,
            TextBaseline::Bottom => y - self.glyph_height(),
        }
    }
}

/// Immediate-mode 2D drawing surface.
///
/// Shaped after a canvas context: drawing state (translation, global alpha, smoothing, text
/// style) lives on a stack managed by `save`/`restore`, and every primitive is placed through
/// the current translation. Layers only ever talk to this trait.
pub trait Renderer2d {
    /// Resets the state stack for a new frame of `size`.
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    fn save(&mut self);
    /// Pops the last saved state. Unbalanced restores are ignored.
    fn restore(&mut self);

    fn translate(&mut self, dx: f32, dy: f32);
    /// Global alpha in `0.0..=1.0`, multiplied into every color's own alpha.
    fn set_alpha(&mut self, alpha: f32);
    fn set_image_smoothing(&mut self, enabled: bool);
    fn set_text_style(&mut self, style: TextStyle);

    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color);
    fn stroke_line(&mut self, from: Point, to: Point, color: Color);
    fn fill_text(&mut self, x: f32, y: f32, text: &str, color: Color);

    /// Fills the whole canvas, ignoring translation and alpha.
    fn clear(&mut self, color: Color);

    fn fill_rect_centered(&mut self, cx: f32, cy: f32, w: f32, h: f32, color: Color) {
        self.fill_rect(Rect::centered(cx, cy, w, h), color);
    }
}

/// Scoped `save()`: restores the renderer when dropped, including during unwinding.
pub struct SavedState<'a, R: Renderer2d + ?Sized> {
    gfx: &'a mut R,
}

impl<'a, R: Renderer2d + ?Sized> SavedState<'a, R> {
    pub fn new(gfx: &'a mut R) -> Self {
        gfx.save();
        Self { gfx }
    }
}

impl<R: Renderer2d + ?Sized> Deref for SavedState<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &*self.gfx
    }
}

impl<R: Renderer2d + ?Sized> DerefMut for SavedState<'_, R> {
    fn deref_mut(&mut self) -> &mut R {
        &mut *self.gfx
    }
}

impl<R: Renderer2d + ?Sized> Drop for SavedState<'_, R> {
    fn drop(&mut self) {
        self.gfx.restore();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphicsState {
    pub translation: Point,
    pub alpha: f32,
    pub smoothing: bool,
    pub text: TextStyle,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            translation: Point::ZERO,
            alpha: 1.0,
            smoothing: true,
            text: TextStyle::default(),
        }
    }
}

/// CPU rasterizer drawing into an RGBA frame buffer.
///
/// With image smoothing on, rect edges that fall between pixels get fractional coverage;
/// with it off, edges snap to the nearest pixel.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self {
            frame,
            size,
            state: GraphicsState::default(),
            stack: Vec::new(),
        }
    }

    pub fn state(&self) -> GraphicsState {
        self.state
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn frame_ok(&self) -> bool {
        let expected = self.size.rgba_len();
        expected != 0 && self.frame.len() >= expected
    }

    fn blend_pixel(&mut self, x: i64, y: i64, color: Color, alpha: f32) {
        if x < 0 || y < 0 || x >= self.size.width as i64 || y >= self.size.height as i64 {
            return;
        }
        let idx = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        let Some(px) = self.frame.get_mut(idx..idx + 4) else {
            return;
        };
        if alpha >= 1.0 {
            px.copy_from_slice(&[color[0], color[1], color[2], 255]);
            return;
        }
        let a = alpha.clamp(0.0, 1.0);
        for c in 0..3 {
            let dst = px[c] as f32;
            px[c] = (dst + (color[c] as f32 - dst) * a).round() as u8;
        }
        px[3] = 255;
    }

    fn effective_alpha(&self, color: Color) -> f32 {
        self.state.alpha * (color[3] as f32 / 255.0)
    }

    /// Fills device-space pixel span `[x0, x1) x [y0, y1)`.
    fn fill_span(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color, alpha: f32) {
        let x0 = x0.max(0);
        let y0 = y0.max(0);
        let x1 = x1.min(self.size.width as i64);
        let y1 = y1.min(self.size.height as i64);
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend_pixel(x, y, color, alpha);
            }
        }
    }

    fn fill_device_rect(&mut self, r: Rect, color: Color, alpha: f32) {
        if r.w <= 0.0 || r.h <= 0.0 || alpha <= 0.0 || !self.frame_ok() {
            return;
        }
        if !self.state.smoothing {
            let x0 = r.x.round() as i64;
            let y0 = r.y.round() as i64;
            let x1 = r.right().round() as i64;
            let y1 = r.bottom().round() as i64;
            self.fill_span(x0, y0, x1, y1, color, alpha);
            return;
        }

        let px0 = (r.x.floor() as i64).max(0);
        let py0 = (r.y.floor() as i64).max(0);
        let px1 = (r.right().ceil() as i64).min(self.size.width as i64);
        let py1 = (r.bottom().ceil() as i64).min(self.size.height as i64);
        for py in py0..py1 {
            let cov_y = coverage(py as f32, r.y, r.bottom());
            if cov_y <= 0.0 {
                continue;
            }
            for px in px0..px1 {
                let cov = coverage(px as f32, r.x, r.right()) * cov_y;
                if cov > 0.0 {
                    self.blend_pixel(px, py, color, alpha * cov);
                }
            }
        }
    }

    fn draw_char(&mut self, x: i64, y: i64, ch: char, color: Color, alpha: f32, scale: u32) {
        let scale = scale.max(1) as i64;
        for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
            let py0 = y + row as i64 * scale;
            for col in 0..GLYPH_W {
                let mask = 1u8 << (GLYPH_W - 1 - col);
                if (bits & mask) == 0 {
                    continue;
                }
                let px0 = x + col as i64 * scale;
                self.fill_span(px0, py0, px0 + scale, py0 + scale, color, alpha);
            }
        }
    }
}

/// Fraction of pixel `[p, p + 1)` covered by span `[lo, hi)`.
fn coverage(p: f32, lo: f32, hi: f32) -> f32 {
    ((p + 1.0).min(hi) - p.max(lo)).clamp(0.0, 1.0)
}

impl Renderer2d for CpuRenderer<'_> {
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
    }

    fn restore(&mut self) {
        if let Some(prev) = self.stack.pop() {
            self.state = prev;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.translation = self.state.translation + Point::new(dx, dy);
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
        let alpha = self.effective_alpha(color);
        let r = rect.translated(self.state.translation);
        self.fill_device_rect(r, color, alpha);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color) {
        if rect.w <= 0.0 || rect.h <= 0.0 {
            return;
        }
        let (x, y, w, h) = (rect.x, rect.y, rect.w, rect.h);
        self.fill_rect(Rect::new(x, y, w, 1.0), color);
        if h > 1.0 {
            self.fill_rect(Rect::new(x, y + h - 1.0, w, 1.0), color);
        }
        if h > 2.0 {
            self.fill_rect(Rect::new(x, y + 1.0, 1.0, h - 2.0), color);
            if w > 1.0 {
                self.fill_rect(Rect::new(x + w - 1.0, y + 1.0, 1.0, h - 2.0), color);
            }
        }
    }

    fn stroke_line(&mut self, from: Point, to: Point, color: Color) {
        let alpha = self.effective_alpha(color);
        if alpha <= 0.0 || !self.frame_ok() {
            return;
        }
        let a = from + self.state.translation;
        let b = to + self.state.translation;
        let d = b - a;
        let steps = d.x.abs().max(d.y.abs()).ceil().max(1.0) as i64;
        let mut last = None;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let px = (a.x + d.x * t).floor() as i64;
            let py = (a.y + d.y * t).floor() as i64;
            if last == Some((px, py)) {
                continue;
            }
            last = Some((px, py));
            self.blend_pixel(px, py, color, alpha);
        }
    }

    fn fill_text(&mut self, x: f32, y: f32, text: &str, color: Color) {
        let alpha = self.effective_alpha(color);
        if alpha <= 0.0 || !self.frame_ok() {
            return;
        }
        let style = self.state.text;
        let scale = style.scale.max(1);
        let origin = Point::new(x, style.top_of(y)) + self.state.translation;
        let start_x = origin.x.round() as i64;
        let adv_x = glyph_advance_x(scale) as i64;
        let adv_y = line_advance_y(scale) as i64;

        let mut cursor_x = start_x;
        let mut cursor_y = origin.y.round() as i64;
        for ch in text.chars() {
            match ch {
                '\n' => {
                    cursor_x = start_x;
                    cursor_y += adv_y;
                    if cursor_y >= self.size.height as i64 {
                        break;
                    }
                    continue;
                }
                ' ' => {}
                _ => self.draw_char(cursor_x, cursor_y, ch, color, alpha, scale),
            }
            cursor_x += adv_x;
        }
    }

    fn clear(&mut self, color: Color) {
        if !self.frame_ok() {
            return;
        }
        let [r, g, b, _] = color;
        for px in self.frame[..self.size.rgba_len()].chunks_exact_mut(4) {
            px.copy_from_slice(&[r, g, b, 255]);
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],

        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],

        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '*' => [0b000, 0b101, 0b010, 0b101, 0b000],
        '^' => [0b010, 0b101, 0b000, 0b000, 0b000],
        '(' => [0b010, 0b100, 0b100, 0b100, 0b010],
        ')' => [0b010, 0b001, 0b001, 0b001, 0b010],
        '[' => [0b110, 0b100, 0b100, 0b100, 0b110],
        ']' => [0b011, 0b001, 0b001, 0b001, 0b011],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '#' => [0b101, 0b111, 0b101, 0b111, 0b101],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '\'' => [0b010, 0b010, 0b000, 0b000, 0b000],

        _ => [0b111, 0b001, 0b010, 0b000, 0b010], // '?'
    }
}
