use std::collections::VecDeque;

use engine::graphics::{Color, Renderer2d, TextBaseline, TextStyle, line_advance_y, text_width};
use engine::ui::{Point, Rect};
use tracing::info;

/// Seconds a pushed message stays on screen.
pub const DEFAULT_LOG_LIFETIME: f64 = 3.0;

const COLOR_TEXT: Color = [235, 235, 245, 255];
const COLOR_HEADER: Color = [120, 220, 170, 255];
const COLOR_PANEL_BG: Color = [0, 0, 0, 180];
const COLOR_PANEL_BORDER: Color = [40, 40, 55, 255];
const FONT_SCALE: u32 = 2;
const PAD: f32 = 8.0;
const MARGIN: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DebugLogEntry {
    pub message: String,
    /// Seconds left before the entry expires.
    pub remaining: f64,
}

/// Short-lived on-screen messages, oldest first.
#[derive(Debug, Clone, Default)]
pub struct DebugLog {
    entries: VecDeque<DebugLogEntry>,
}

impl DebugLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.push_with_lifetime(message, DEFAULT_LOG_LIFETIME);
    }

    pub fn push_with_lifetime(&mut self, message: impl Into<String>, lifetime: f64) {
        let message = message.into();
        info!(target: "rhythm::debug", "{message}");
        self.entries.push_back(DebugLogEntry {
            message,
            remaining: lifetime,
        });
    }

    /// Counts every entry down by `delta` seconds, then drops expired entries from the front.
    ///
    /// Only the front is evicted: an expired entry queued behind a longer-lived one stays
    /// until everything ahead of it has gone.
    pub fn tick(&mut self, delta: f64) {
        for entry in &mut self.entries {
            entry.remaining -= delta;
        }
        while self.entries.front().is_some_and(|e| e.remaining <= 0.0) {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DebugLogEntry> + '_ {
        self.entries.iter()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.message.as_str())
    }
}

/// Values shown in the overlay header.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlayHeader {
    pub time: f64,
    pub wall_clock_ms: f64,
    pub pointer: Point,
    pub paused: bool,
}

impl OverlayHeader {
    pub fn lines(&self) -> [String; 3] {
        let state = if self.paused { " PAUSED" } else { "" };
        [
            format!("TIME {:.2}S{state}", self.time),
            format!("CLOCK {:.0}MS", self.wall_clock_ms),
            format!("POINTER {:.0},{:.0}", self.pointer.x, self.pointer.y),
        ]
    }
}

/// Header lines followed by one line per queued message.
pub fn overlay_lines(header: &OverlayHeader, log: &DebugLog) -> Vec<String> {
    let mut lines: Vec<String> = header.lines().into();
    lines.extend(log.messages().map(str::to_string));
    lines
}

/// Panel in the top-right corner sized to fit `lines`, clamped to the canvas.
pub fn panel_rect(canvas_w: f32, canvas_h: f32, lines: &[String]) -> Rect {
    let inner_w = lines
        .iter()
        .map(|l| text_width(l, FONT_SCALE))
        .fold(0.0, f32::max);
    let inner_h = lines.len() as f32 * line_advance_y(FONT_SCALE);
    let w = (inner_w + PAD * 2.0).min(canvas_w);
    let h = (inner_h + PAD * 2.0).min(canvas_h);
    Rect::new((canvas_w - w - MARGIN).max(0.0), MARGIN, w, h)
}

pub fn draw_overlay(gfx: &mut dyn Renderer2d, canvas_w: f32, canvas_h: f32, header: &OverlayHeader, log: &DebugLog) {
    let lines = overlay_lines(header, log);
    let panel = panel_rect(canvas_w, canvas_h, &lines);
    gfx.fill_rect(panel, COLOR_PANEL_BG);
    gfx.stroke_rect(panel, COLOR_PANEL_BORDER);
    gfx.set_text_style(TextStyle {
        scale: FONT_SCALE,
        baseline: TextBaseline::Top,
    });

    let mut y = panel.y + PAD;
    for (i, line) in lines.iter().enumerate() {
        if y >= panel.bottom() {
            break;
        }
        let color = if i < 3 { COLOR_HEADER } else { COLOR_TEXT };
        gfx.fill_text(panel.x + PAD, y, line, color);
        y += line_advance_y(FONT_SCALE);
    }
}
