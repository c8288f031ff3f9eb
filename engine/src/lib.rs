//! Game-agnostic pieces of the sketch: geometry, the drawing-surface trait and its CPU
//! rasterizer, the playback clock, the layer pipeline and click routing.

pub mod app;
pub mod error;
pub mod graphics;
pub mod layers;
pub mod pixels_renderer;
pub mod recorder;
pub mod snapshot;
pub mod surface;
pub mod transport;
pub mod ui;

pub use error::DrawError;
pub use graphics::{Color, Renderer2d};
pub use hit_test::{HitRouter, PhysicalObject};
pub use layers::{DrawContext, Layer, LayerHandle, LayerPipeline};
pub use transport::{FrameTime, Transport};
pub use ui::{Point, Rect};
