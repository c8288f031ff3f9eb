//! A rhythm-game screen: notes falling onto a piano keyboard, a mascot, a fixed side panel
//! and a debug overlay, each drawn as its own layer.

pub mod debug;
pub mod keyboard;
pub mod layers;
pub mod notes;
pub mod score;
pub mod settings;
pub mod sketch;
pub mod state;

pub use keyboard::{KeyboardError, KeyboardLayout};
pub use notes::{Note, NoteScheduler, NoteState, Tempo};
pub use settings::{SettingsStore, SketchSettings};
pub use sketch::Sketch;
pub use state::{SketchRequest, SketchState};
