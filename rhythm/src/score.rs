//! The score the sketch starts with.

use crate::notes::Note;

/// A short two-hand phrase around middle C. Beats, not seconds.
pub fn startup_score() -> Vec<Note> {
    vec![
        Note::new(0.0, 1.0, 60),
        Note::new(1.0, 1.0, 64),
        Note::new(2.0, 1.0, 67),
        Note::new(3.0, 0.5, 72),
        Note::new(3.5, 0.5, 71),
        Note::new(4.0, 2.0, 69),
        Note::new(0.0, 4.0, 48).on_staff_line(1),
        Note::new(4.0, 2.0, 53).on_staff_line(1),
        Note::new(6.0, 0.5, 66),
        Note::new(6.5, 0.5, 68),
        Note::new(7.0, 1.0, 70),
        Note::new(6.0, 2.0, 54).on_staff_line(1),
        Note::new(8.0, 4.0, 60),
        Note::new(8.0, 4.0, 55).on_staff_line(1),
    ]
}
