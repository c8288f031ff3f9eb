//! Piano keyboard geometry: pitch numbers to pixel offsets, and the keyboard drawing that
//! note lanes line up with.

use engine::graphics::{Color, Renderer2d};
use engine::ui::{Point, Rect};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pitch classes of the white keys, C D E F G A B.
pub const WHITE_KEY_PITCH_CLASSES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Black keys sit on the boundary before these white-key indices (C#, D#, F#, G#, A#).
pub const BLACK_KEY_POSITIONS: [usize; 5] = [1, 2, 4, 5, 6];

/// Which side(s) of a white key's upper body a neighbouring black key cuts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyShape {
    LeftNotch,
    CenterNotch,
    RightNotch,
}

pub const WHITE_KEY_SHAPES: [KeyShape; 7] = [
    KeyShape::RightNotch,
    KeyShape::CenterNotch,
    KeyShape::LeftNotch,
    KeyShape::RightNotch,
    KeyShape::CenterNotch,
    KeyShape::CenterNotch,
    KeyShape::LeftNotch,
];

/// Octave bounds a sanitized layout stays within: octave -1 starts at pitch 0 and the
/// keyboard never runs past pitch 119.
const LOWEST_OCTAVE: i32 = -1;
const HIGHEST_OCTAVE: i32 = 9;

const WHITE_KEY_COLOR: Color = [236, 236, 228, 255];
const BLACK_KEY_COLOR: Color = [24, 24, 30, 255];
const KEY_OUTLINE: Color = [70, 70, 80, 255];
const LIT_WHITE_COLOR: Color = [120, 220, 170, 255];
const LIT_BLACK_COLOR: Color = [69, 129, 94, 255];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyboardError {
    #[error("pitch {pitch} is outside the keyboard range {lowest}..={highest}")]
    OutOfRange { pitch: i32, lowest: i32, highest: i32 },
}

/// MIDI-style octave number: pitch 60 is octave 4.
pub fn octave_of(pitch: i32) -> i32 {
    pitch.div_euclid(12) - 1
}

pub fn pitch_class(pitch: i32) -> i32 {
    pitch.rem_euclid(12)
}

pub fn white_key_index(pitch_class: i32) -> Option<usize> {
    WHITE_KEY_PITCH_CLASSES.iter().position(|&pc| pc == pitch_class)
}

pub fn is_black(pitch: i32) -> bool {
    white_key_index(pitch_class(pitch)).is_none()
}

/// Horizontal placement of one key, relative to the keyboard's left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPosition {
    pub x: f32,
    pub width: f32,
    pub is_black: bool,
}

impl KeyPosition {
    pub fn center(&self) -> f32 {
        self.x + self.width / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardLayout {
    pub min_octave: i32,
    pub octave_count: u32,
    pub white_key_width: f32,
    pub white_key_height: f32,
    pub black_key_height: f32,
    pub black_key_margin: f32,
}

impl Default for KeyboardLayout {
    fn default() -> Self {
        Self {
            min_octave: 3,
            octave_count: 3,
            white_key_width: 24.0,
            white_key_height: 100.0,
            black_key_height: 60.0,
            black_key_margin: 4.0,
        }
    }
}

impl KeyboardLayout {
    /// Clamps values that would make the geometry degenerate.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        // Keep every key inside MIDI 0..=127.
        self.min_octave = self.min_octave.clamp(LOWEST_OCTAVE, HIGHEST_OCTAVE - 1);
        let max_octaves = (HIGHEST_OCTAVE - self.min_octave) as u32;
        self.octave_count = self.octave_count.clamp(1, max_octaves);
        if !(self.white_key_width.is_finite() && self.white_key_width > 0.0) {
            self.white_key_width = defaults.white_key_width;
        }
        if !(self.white_key_height.is_finite() && self.white_key_height > 0.0) {
            self.white_key_height = defaults.white_key_height;
        }
        self.black_key_height = self.black_key_height.clamp(0.0, self.white_key_height);
        self.black_key_margin = self
            .black_key_margin
            .min(self.white_key_width / 2.0 - 1.0)
            .max(0.0);
        self
    }

    pub fn black_key_width(&self) -> f32 {
        self.white_key_width - 2.0 * self.black_key_margin
    }

    pub fn octave_width(&self) -> f32 {
        7.0 * self.white_key_width
    }

    pub fn total_width(&self) -> f32 {
        self.octave_count as f32 * self.octave_width()
    }

    /// Left edge that centers the keyboard on a canvas `canvas_width` wide.
    pub fn origin_x(&self, canvas_width: f32) -> f32 {
        ((canvas_width - self.total_width()) / 2.0).round()
    }

    pub fn lowest_pitch(&self) -> i32 {
        self.min_octave.saturating_add(1).saturating_mul(12)
    }

    pub fn highest_pitch(&self) -> i32 {
        let span = (self.octave_count as i32).saturating_mul(12);
        self.lowest_pitch().saturating_add(span).saturating_sub(1)
    }

    pub fn contains_pitch(&self, pitch: i32) -> bool {
        (self.lowest_pitch()..=self.highest_pitch()).contains(&pitch)
    }

    /// X offset of a white key's left edge. Black-key pitch classes have no white key and
    /// yield `None`; see `key_position` for those.
    pub fn pitch_to_offset(&self, pitch: i32) -> Option<f32> {
        let index = white_key_index(pitch_class(pitch))?;
        let octave = octave_of(pitch) as i64 - self.min_octave as i64;
        Some((octave * 7 + index as i64) as f32 * self.white_key_width)
    }

    /// Where the key for `pitch` is drawn. Black keys hang off the white key below them,
    /// shifted by half a white key plus the margin.
    pub fn key_position(&self, pitch: i32) -> Result<KeyPosition, KeyboardError> {
        if !self.contains_pitch(pitch) {
            return Err(KeyboardError::OutOfRange {
                pitch,
                lowest: self.lowest_pitch(),
                highest: self.highest_pitch(),
            });
        }
        if let Some(x) = self.pitch_to_offset(pitch) {
            return Ok(KeyPosition {
                x,
                width: self.white_key_width,
                is_black: false,
            });
        }
        // Every black pitch class has a white key one semitone below, in the same octave.
        let below = self.pitch_to_offset(pitch - 1).unwrap_or_default();
        Ok(KeyPosition {
            x: below + self.white_key_width / 2.0 + self.black_key_margin,
            width: self.black_key_width(),
            is_black: true,
        })
    }

    /// Black key rects of one octave starting at `octave_x`, in drawing order.
    fn black_key_rects(&self, octave_x: f32) -> [Rect; 5] {
        let w = self.white_key_width;
        BLACK_KEY_POSITIONS.map(|pos| {
            Rect::new(
                octave_x + (pos - 1) as f32 * w + w / 2.0 + self.black_key_margin,
                0.0,
                self.black_key_width(),
                self.black_key_height,
            )
        })
    }

    /// Every key's box in keyboard space as `(pitch, rect)`. Black keys come first since
    /// they sit on top of the white keys they overlap.
    pub fn key_regions(&self) -> Vec<(i32, Rect)> {
        let w = self.white_key_width;
        let mut black = Vec::new();
        let mut white = Vec::new();
        for octave in 0..self.octave_count {
            let octave_x = octave as f32 * self.octave_width();
            let base_pitch = self.lowest_pitch() + 12 * octave as i32;
            for (rect, pos) in self.black_key_rects(octave_x).into_iter().zip(BLACK_KEY_POSITIONS) {
                black.push((base_pitch + WHITE_KEY_PITCH_CLASSES[pos - 1] + 1, rect));
            }
            for (index, pc) in WHITE_KEY_PITCH_CLASSES.iter().enumerate() {
                let rect = Rect::new(octave_x + index as f32 * w, 0.0, w, self.white_key_height);
                white.push((base_pitch + pc, rect));
            }
        }
        black.extend(white);
        black
    }

    /// Outline polygon of a white key with its notch(es), clockwise from the top-left.
    fn white_key_outline(&self, shape: KeyShape, x: f32) -> Vec<Point> {
        let w = self.white_key_width;
        let h = self.white_key_height;
        let hb = self.black_key_height;
        let notch = w / 2.0 - self.black_key_margin;
        let (left, right) = match shape {
            KeyShape::LeftNotch => (x + notch, x + w),
            KeyShape::CenterNotch => (x + notch, x + w - notch),
            KeyShape::RightNotch => (x, x + w - notch),
        };
        let mut points = vec![Point::new(left, 0.0), Point::new(right, 0.0)];
        if right < x + w {
            points.push(Point::new(right, hb));
            points.push(Point::new(x + w, hb));
        }
        points.push(Point::new(x + w, h));
        points.push(Point::new(x, h));
        if left > x {
            points.push(Point::new(x, hb));
            points.push(Point::new(left, hb));
        }
        points
    }

    /// Draws every octave with its top-left corner at the current origin. Keys whose pitch
    /// is in `lit` are highlighted.
    pub fn draw(&self, gfx: &mut dyn Renderer2d, lit: &[i32]) {
        let w = self.white_key_width;
        let notch = w / 2.0 - self.black_key_margin;
        for octave in 0..self.octave_count {
            let octave_x = octave as f32 * self.octave_width();
            let base_pitch = self.lowest_pitch() + 12 * octave as i32;

            for (index, shape) in WHITE_KEY_SHAPES.iter().enumerate() {
                let x = octave_x + index as f32 * w;
                let pitch = base_pitch + WHITE_KEY_PITCH_CLASSES[index];
                let color = if lit.contains(&pitch) {
                    LIT_WHITE_COLOR
                } else {
                    WHITE_KEY_COLOR
                };
                let (top_x, top_w) = match shape {
                    KeyShape::LeftNotch => (x + notch, w - notch),
                    KeyShape::CenterNotch => (x + notch, w - 2.0 * notch),
                    KeyShape::RightNotch => (x, w - notch),
                };
                gfx.fill_rect(Rect::new(top_x, 0.0, top_w, self.black_key_height), color);
                gfx.fill_rect(
                    Rect::new(
                        x,
                        self.black_key_height,
                        w,
                        self.white_key_height - self.black_key_height,
                    ),
                    color,
                );
                stroke_polygon(gfx, &self.white_key_outline(*shape, x), KEY_OUTLINE);
            }

            for (rect, pos) in self.black_key_rects(octave_x).into_iter().zip(BLACK_KEY_POSITIONS) {
                let pitch = base_pitch + WHITE_KEY_PITCH_CLASSES[pos - 1] + 1;
                let color = if lit.contains(&pitch) {
                    LIT_BLACK_COLOR
                } else {
                    BLACK_KEY_COLOR
                };
                gfx.fill_rect(rect, color);
                gfx.stroke_rect(rect, KEY_OUTLINE);
            }
        }
    }
}

fn stroke_polygon(gfx: &mut dyn Renderer2d, points: &[Point], color: Color) {
    for (i, &from) in points.iter().enumerate() {
        let to = points[(i + 1) % points.len()];
        gfx.stroke_line(from, to, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use engine::recorder::{CommandRecorder, DrawCommand};
    use engine::surface::SurfaceSize;

    fn layout() -> KeyboardLayout {
        KeyboardLayout::default()
    }

    #[test]
    fn middle_c_is_octave_four() {
        assert_eq!(octave_of(60), 4);
        assert_eq!(octave_of(0), -1);
        assert_eq!(pitch_class(61), 1);
        assert!(is_black(61));
        assert!(!is_black(64));
    }

    #[test]
    fn white_key_offsets_follow_the_formula() {
        let k = layout();
        // C4 is one octave above min_octave 3.
        assert_relative_eq!(k.pitch_to_offset(60).unwrap(), 7.0 * 24.0);
        assert_relative_eq!(k.pitch_to_offset(62).unwrap(), 8.0 * 24.0);
        assert_relative_eq!(k.pitch_to_offset(48).unwrap(), 0.0);
        assert_eq!(k.pitch_to_offset(61), None);
    }

    #[test]
    fn white_key_offsets_are_monotonic_within_an_octave() {
        let k = layout();
        for octave_base in [48, 60, 72] {
            let offsets: Vec<f32> = (octave_base..octave_base + 12)
                .filter_map(|p| k.pitch_to_offset(p))
                .collect();
            assert_eq!(offsets.len(), 7);
            assert!(offsets.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    #[test]
    fn an_octave_up_is_seven_white_keys_right() {
        let k = layout();
        for p in (0..116).filter(|&p| !is_black(p)) {
            let here = k.pitch_to_offset(p).unwrap();
            let up = k.pitch_to_offset(p + 12).unwrap();
            assert_relative_eq!(up, here + 7.0 * k.white_key_width);
        }
    }

    #[test]
    fn key_position_rejects_pitches_off_the_keyboard() {
        let k = layout();
        assert_eq!(k.lowest_pitch(), 48);
        assert_eq!(k.highest_pitch(), 83);
        assert_eq!(
            k.key_position(47),
            Err(KeyboardError::OutOfRange {
                pitch: 47,
                lowest: 48,
                highest: 83
            })
        );
        assert!(k.key_position(84).is_err());
        assert!(k.key_position(83).is_ok());
    }

    #[test]
    fn black_keys_straddle_the_white_key_boundary() {
        let k = layout();
        let cs4 = k.key_position(61).unwrap();
        assert!(cs4.is_black);
        assert_relative_eq!(cs4.width, 16.0);
        // Centered on the C4/D4 boundary.
        assert_relative_eq!(cs4.center(), k.pitch_to_offset(62).unwrap());
    }

    #[test]
    fn key_positions_match_the_drawn_black_keys() {
        let k = layout();
        let rects = k.black_key_rects(k.octave_width());
        let pitches = [61, 63, 66, 68, 70];
        for (rect, pitch) in rects.iter().zip(pitches) {
            let pos = k.key_position(pitch).unwrap();
            assert_eq!(rect.x, pos.x, "pitch {pitch}");
            assert_eq!(rect.w, pos.width);
        }
    }

    #[test]
    fn draw_emits_seven_white_and_five_black_keys_per_octave() {
        let k = KeyboardLayout {
            octave_count: 2,
            ..layout()
        };
        let mut rec = CommandRecorder::new(SurfaceSize::new(400, 120));
        k.draw(&mut rec, &[61]);

        let strokes = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::StrokeRect { .. }))
            .count();
        assert_eq!(strokes, 10);
        let lit = rec
            .fill_rects()
            .filter(|(_, color, _)| *color == LIT_BLACK_COLOR)
            .count();
        assert_eq!(lit, 1);
        let lines = rec
            .commands()
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
            .count();
        // Right/left-notched keys have 6 edges, center-notched keys 8.
        assert_eq!(lines, 2 * (4 * 6 + 3 * 8));
    }

    #[test]
    fn key_regions_put_black_keys_first() {
        let k = layout();
        let regions = k.key_regions();
        assert_eq!(regions.len(), 36);
        assert!(regions[..15].iter().all(|(p, _)| is_black(*p)));
        assert!(regions[15..].iter().all(|(p, _)| !is_black(*p)));
        let (_, c4) = regions.iter().find(|(p, _)| *p == 60).unwrap();
        assert_eq!(c4.x, k.pitch_to_offset(60).unwrap());
    }

    #[test]
    fn sanitized_repairs_degenerate_layouts() {
        let k = KeyboardLayout {
            octave_count: 0,
            white_key_width: -3.0,
            black_key_height: 500.0,
            black_key_margin: 50.0,
            ..layout()
        }
        .sanitized();
        assert_eq!(k.octave_count, 1);
        assert_eq!(k.white_key_width, 24.0);
        assert_eq!(k.black_key_height, 100.0);
        assert_eq!(k.black_key_margin, 11.0);
    }

    #[test]
    fn sanitized_keeps_the_keyboard_inside_the_midi_range() {
        let huge = KeyboardLayout {
            min_octave: 2_000_000_000,
            ..layout()
        }
        .sanitized();
        assert_eq!(huge.min_octave, 8);
        assert_eq!(huge.octave_count, 1);
        assert_eq!(huge.highest_pitch(), 119);

        let tiny = KeyboardLayout {
            min_octave: i32::MIN,
            octave_count: 40,
            ..layout()
        }
        .sanitized();
        assert_eq!(tiny.min_octave, -1);
        assert_eq!(tiny.octave_count, 10);
        assert_eq!(tiny.lowest_pitch(), 0);
        assert_eq!(tiny.highest_pitch(), 119);
    }

    #[test]
    fn extreme_octaves_do_not_overflow_unsanitized() {
        let k = KeyboardLayout {
            min_octave: i32::MAX,
            ..layout()
        };
        assert_eq!(k.lowest_pitch(), i32::MAX);
        assert!(!k.contains_pitch(60));
        assert!(k.key_position(60).is_err());
        assert!(k.pitch_to_offset(60).is_some());
    }
}
