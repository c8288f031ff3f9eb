//! The sketch's layers, listed bottom to top.

pub mod background;
pub mod debug;
pub mod keyboard;
pub mod mascot;
pub mod notes;
pub mod panel;

pub use background::BackgroundLayer;
pub use debug::DebugLayer;
pub use keyboard::KeyboardLayer;
pub use mascot::MascotLayer;
pub use notes::NotesLayer;
pub use panel::PanelLayer;
