//! Notes on a beat timeline and their state relative to the scrolling baseline.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::keyboard::{KeyboardError, KeyboardLayout};

/// One note of the score. `start` and `duration` are in beats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub start: f64,
    pub duration: f64,
    pub pitch: i32,
    #[serde(default)]
    pub staff_line: i32,
}

impl Note {
    pub const fn new(start: f64, duration: f64, pitch: i32) -> Self {
        Self {
            start,
            duration,
            pitch,
            staff_line: 0,
        }
    }

    pub const fn on_staff_line(mut self, staff_line: i32) -> Self {
        self.staff_line = staff_line;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tempo {
    pub bpm: f64,
    /// Scroll speed of the timeline.
    pub pixels_per_second: f64,
}

impl Default for Tempo {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            pixels_per_second: 200.0,
        }
    }
}

impl Tempo {
    pub const fn new(bpm: f64, pixels_per_second: f64) -> Self {
        Self {
            bpm,
            pixels_per_second,
        }
    }

    pub fn pixels_per_beat(&self) -> f64 {
        self.pixels_per_second * 60.0 / self.bpm
    }

    /// Scroll position representing logical time `t`.
    pub fn baseline(&self, t: f64) -> f64 {
        t * self.pixels_per_second
    }

    pub fn position_start(&self, note: &Note) -> f64 {
        note.start * self.pixels_per_beat()
    }

    pub fn position_end(&self, note: &Note) -> f64 {
        self.position_start(note) + note.duration * self.pixels_per_beat()
    }

    pub fn state(&self, note: &Note, t: f64) -> NoteState {
        let baseline = self.baseline(t);
        if baseline < self.position_start(note) {
            NoteState::Upcoming
        } else if baseline > self.position_end(note) {
            NoteState::Passed
        } else {
            NoteState::Hit
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteState {
    Upcoming,
    /// The baseline lies within the note, both ends included.
    Hit,
    Passed,
}

impl NoteState {
    pub fn is_hit(self) -> bool {
        self == NoteState::Hit
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NoteError {
    #[error("note {index} has a non-finite start ({start})")]
    NonFiniteStart { index: usize, start: f64 },

    #[error("note {index} has a non-positive duration ({duration})")]
    NonPositiveDuration { index: usize, duration: f64 },

    #[error("note {index} cannot be placed: {source}")]
    Unplaceable {
        index: usize,
        #[source]
        source: KeyboardError,
    },
}

/// Checks that a note can be scheduled and drawn on `keyboard`.
pub fn validate(index: usize, note: &Note, keyboard: &KeyboardLayout) -> Result<(), NoteError> {
    if !note.start.is_finite() {
        return Err(NoteError::NonFiniteStart {
            index,
            start: note.start,
        });
    }
    if !(note.duration.is_finite() && note.duration > 0.0) {
        return Err(NoteError::NonPositiveDuration {
            index,
            duration: note.duration,
        });
    }
    keyboard
        .key_position(note.pitch)
        .map_err(|source| NoteError::Unplaceable { index, source })?;
    Ok(())
}

/// The accepted notes of a score, in the order they were given.
#[derive(Debug, Clone, Default)]
pub struct NoteScheduler {
    notes: Vec<Note>,
    tempo: Tempo,
}

impl NoteScheduler {
    /// Keeps every valid note; invalid ones are logged and dropped.
    pub fn new(notes: impl IntoIterator<Item = Note>, tempo: Tempo, keyboard: &KeyboardLayout) -> Self {
        let mut accepted = Vec::new();
        for (index, note) in notes.into_iter().enumerate() {
            match validate(index, &note, keyboard) {
                Ok(()) => accepted.push(note),
                Err(err) => warn!(error = %err, "skipping note"),
            }
        }
        if accepted.is_empty() {
            info!("score has no playable notes");
        }
        Self {
            notes: accepted,
            tempo,
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn tempo(&self) -> Tempo {
        self.tempo
    }

    pub fn state_of(&self, note: &Note, t: f64) -> NoteState {
        self.tempo.state(note, t)
    }

    /// State of every note at time `t`, by index.
    pub fn classify(&self, t: f64) -> Vec<(usize, NoteState)> {
        self.notes
            .iter()
            .enumerate()
            .map(|(i, n)| (i, self.state_of(n, t)))
            .collect()
    }

    pub fn hit_notes(&self, t: f64) -> impl Iterator<Item = &Note> + '_ {
        self.notes
            .iter()
            .filter(move |n| self.state_of(n, t).is_hit())
    }

    /// Pitches sounding at `t`, in note order; a pitch may repeat.
    pub fn sounding_pitches(&self, t: f64) -> Vec<i32> {
        self.hit_notes(t).map(|n| n.pitch).collect()
    }
}
