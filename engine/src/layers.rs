//! Ordered, independently offsettable draw layers.
//!
//! Each frame the pipeline walks its layers in declaration order (which is also the paint
//! order), wraps every visible layer in a scoped `save`/`restore`, pre-translates by the
//! layer's committed offset and hands the layer a `DrawContext`. A layer re-anchors itself
//! with `DrawContext::set_layer_offset`; the pipeline's copy of that offset is what the
//! hit-test router reads between frames.

use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::error::DrawError;
use crate::graphics::{Renderer2d, SavedState};
use crate::surface::SurfaceSize;
use crate::transport::FrameTime;
use crate::ui::Point;

/// A single visual layer. `S` is the application state shared by all layers and click
/// handlers.
pub trait Layer<S> {
    fn id(&self) -> &str;

    fn draw(&mut self, ctx: &mut DrawContext<'_>, state: &mut S) -> Result<(), DrawError>;
}

/// Non-owning reference to a layer slot inside a `LayerPipeline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerHandle(usize);

impl LayerHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a layer sees while drawing.
pub struct DrawContext<'a> {
    pub gfx: &'a mut dyn Renderer2d,
    /// Logical playback time in seconds.
    pub time: f64,
    /// Wall-clock seconds since the previous frame.
    pub delta: f64,
    pub canvas: SurfaceSize,
    offset: &'a mut Point,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        gfx: &'a mut dyn Renderer2d,
        frame: FrameTime,
        canvas: SurfaceSize,
        offset: &'a mut Point,
    ) -> Self {
        Self {
            gfx,
            time: frame.time,
            delta: frame.delta,
            canvas,
            offset,
        }
    }

    /// The layer's last committed offset.
    pub fn offset(&self) -> Point {
        *self.offset
    }

    /// Commits `offset` for this layer and moves the active transform by the difference.
    ///
    /// Returns the translation applied, which is zero when `offset` is already current.
    pub fn set_layer_offset(&mut self, offset: Point) -> Point {
        if *self.offset == offset {
            return Point::ZERO;
        }
        let delta = offset - *self.offset;
        *self.offset = offset;
        self.gfx.translate(delta.x, delta.y);
        delta
    }
}

struct LayerSlot<S> {
    id: String,
    layer: Box<dyn Layer<S>>,
    visible: bool,
    offset: Point,
}

/// Outcome of one `run_frame`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub drawn: usize,
    pub skipped: usize,
    pub failed: Vec<DrawError>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

pub struct LayerPipeline<S> {
    slots: Vec<LayerSlot<S>>,
}

impl<S> Default for LayerPipeline<S> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<S> LayerPipeline<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `layer` on top of everything pushed so far.
    pub fn push(&mut self, layer: Box<dyn Layer<S>>) -> Result<LayerHandle, DrawError> {
        let id = layer.id().to_string();
        if self.slots.iter().any(|s| s.id == id) {
            return Err(DrawError::DuplicateLayer { id });
        }
        self.slots.push(LayerSlot {
            id,
            layer,
            visible: true,
            offset: Point::ZERO,
        });
        Ok(LayerHandle(self.slots.len() - 1))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.slots.iter().map(|s| s.id.as_str())
    }

    pub fn find(&self, id: &str) -> Option<LayerHandle> {
        self.slots.iter().position(|s| s.id == id).map(LayerHandle)
    }

    pub fn offset(&self, handle: LayerHandle) -> Option<Point> {
        self.slots.get(handle.0).map(|s| s.offset)
    }

    pub fn is_visible(&self, handle: LayerHandle) -> bool {
        self.slots.get(handle.0).is_some_and(|s| s.visible)
    }

    pub fn set_visible(&mut self, handle: LayerHandle, visible: bool) -> Result<(), DrawError> {
        let slot = self.slot_mut(handle)?;
        slot.visible = visible;
        Ok(())
    }

    /// Flips visibility and returns the new value.
    pub fn toggle_visible(&mut self, handle: LayerHandle) -> Result<bool, DrawError> {
        let slot = self.slot_mut(handle)?;
        slot.visible = !slot.visible;
        Ok(slot.visible)
    }

    fn slot_mut(&mut self, handle: LayerHandle) -> Result<&mut LayerSlot<S>, DrawError> {
        self.slots
            .get_mut(handle.0)
            .ok_or(DrawError::UnknownLayer { index: handle.0 })
    }

    /// Draws every visible layer once, in order.
    ///
    /// A layer that errors or panics is logged and reported; the layers after it still draw
    /// and the renderer's state stack is balanced either way.
    pub fn run_frame(
        &mut self,
        gfx: &mut dyn Renderer2d,
        frame: FrameTime,
        canvas: SurfaceSize,
        state: &mut S,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        for slot in &mut self.slots {
            if !slot.visible {
                report.skipped += 1;
                continue;
            }

            let outcome = {
                let mut scoped = SavedState::new(&mut *gfx);
                scoped.translate(slot.offset.x, slot.offset.y);
                let mut ctx = DrawContext::new(&mut *scoped, frame, canvas, &mut slot.offset);
                let layer = &mut slot.layer;
                panic::catch_unwind(AssertUnwindSafe(|| layer.draw(&mut ctx, state)))
            };

            match outcome {
                Ok(Ok(())) => report.drawn += 1,
                Ok(Err(err)) => {
                    warn!(layer = %slot.id, error = %err, "layer draw failed");
                    report.failed.push(err);
                }
                Err(_) => {
                    let err = DrawError::Panicked {
                        layer: slot.id.clone(),
                    };
                    warn!(layer = %slot.id, "layer draw panicked");
                    report.failed.push(err);
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::{CommandRecorder, DrawCommand};
    use crate::ui::Rect;

    enum Behaviour {
        Draw,
        Fail,
        Panic,
    }

    struct StubLayer {
        id: &'static str,
        target: Option<Point>,
        behaviour: Behaviour,
    }

    impl StubLayer {
        fn new(id: &'static str) -> Self {
            Self {
                id,
                target: None,
                behaviour: Behaviour::Draw,
            }
        }

        fn anchored(id: &'static str, target: Point) -> Self {
            Self {
                target: Some(target),
                ..Self::new(id)
            }
        }
    }

    impl Layer<Vec<String>> for StubLayer {
        fn id(&self) -> &str {
            self.id
        }

        fn draw(
            &mut self,
            ctx: &mut DrawContext<'_>,
            calls: &mut Vec<String>,
        ) -> Result<(), DrawError> {
            calls.push(self.id.to_string());
            if let Some(target) = self.target {
                ctx.set_layer_offset(target);
            }
            ctx.gfx.translate(1000.0, 1000.0);
            match self.behaviour {
                Behaviour::Draw => {
                    ctx.gfx.translate(-1000.0, -1000.0);
                    ctx.gfx.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), [1, 2, 3, 255]);
                    Ok(())
                }
                Behaviour::Fail => Err(DrawError::layer(self.id, "boom")),
                Behaviour::Panic => panic!("stub layer panic"),
            }
        }
    }

    fn frame(time: f64) -> FrameTime {
        FrameTime { time, delta: 0.016 }
    }

    #[test]
    fn layers_draw_in_declared_order() {
        let mut pipeline = LayerPipeline::new();
        pipeline.push(Box::new(StubLayer::new("a"))).expect("push a");
        pipeline.push(Box::new(StubLayer::new("b"))).expect("push b");
        pipeline.push(Box::new(StubLayer::new("c"))).expect("push c");

        let mut gfx = CommandRecorder::new(SurfaceSize::new(64, 64));
        let mut calls = Vec::new();
        let report = pipeline.run_frame(&mut gfx, frame(0.0), SurfaceSize::new(64, 64), &mut calls);

        assert_eq!(calls, vec!["a", "b", "c"]);
        assert_eq!(report.drawn, 3);
        assert!(report.is_clean());
        assert_eq!(gfx.depth(), 0);
    }

    #[test]
    fn hidden_layers_are_skipped_without_touching_offset() {
        let mut pipeline = LayerPipeline::new();
        let h = pipeline
            .push(Box::new(StubLayer::anchored("hidden", Point::new(5.0, 5.0))))
            .expect("push");
        pipeline.set_visible(h, false).expect("known handle");

        let mut gfx = CommandRecorder::new(SurfaceSize::new(8, 8));
        let mut calls = Vec::new();
        let report = pipeline.run_frame(&mut gfx, frame(0.0), SurfaceSize::new(8, 8), &mut calls);

        assert!(calls.is_empty());
        assert_eq!(report.skipped, 1);
        assert_eq!(pipeline.offset(h), Some(Point::ZERO));
        assert!(gfx.commands().is_empty());
    }

    #[test]
    fn committed_offset_is_pre_applied_on_the_next_frame() {
        let mut pipeline = LayerPipeline::new();
        let h = pipeline
            .push(Box::new(StubLayer::anchored("scroll", Point::new(0.0, 30.0))))
            .expect("push");
        let size = SurfaceSize::new(8, 8);
        let mut calls = Vec::new();

        let mut first = CommandRecorder::new(size);
        pipeline.run_frame(&mut first, frame(0.0), size, &mut calls);
        assert_eq!(pipeline.offset(h), Some(Point::new(0.0, 30.0)));
        let (rect, _, _) = first.fill_rects().next().expect("drawn");
        assert_eq!(rect, Rect::new(0.0, 30.0, 1.0, 1.0));

        let mut second = CommandRecorder::new(size);
        pipeline.run_frame(&mut second, frame(1.0), size, &mut calls);
        // Pipeline translation carries the offset; diffing adds nothing.
        assert_eq!(
            second.commands()[1],
            DrawCommand::Translate { dx: 0.0, dy: 30.0 }
        );
        let (rect, _, _) = second.fill_rects().next().expect("drawn");
        assert_eq!(rect, Rect::new(0.0, 30.0, 1.0, 1.0));
    }

    #[test]
    fn set_layer_offset_is_idempotent() {
        let mut gfx = CommandRecorder::new(SurfaceSize::new(8, 8));
        let mut offset = Point::ZERO;
        let mut ctx = DrawContext::new(&mut gfx, frame(0.0), SurfaceSize::new(8, 8), &mut offset);

        let first = ctx.set_layer_offset(Point::new(3.0, -2.0));
        let second = ctx.set_layer_offset(Point::new(3.0, -2.0));
        assert_eq!(first, Point::new(3.0, -2.0));
        assert_eq!(second, Point::ZERO);
        let moved = ctx.set_layer_offset(Point::new(4.0, -2.0));
        assert_eq!(moved, Point::new(1.0, 0.0));
        drop(ctx);

        assert_eq!(gfx.translate_count(), 2);
        assert_eq!(gfx.translation(), Point::new(4.0, -2.0));
        assert_eq!(offset, Point::new(4.0, -2.0));
    }

    #[test]
    fn failing_and_panicking_layers_do_not_stop_the_frame() {
        let mut pipeline = LayerPipeline::new();
        pipeline
            .push(Box::new(StubLayer {
                behaviour: Behaviour::Fail,
                ..StubLayer::new("fails")
            }))
            .expect("push");
        pipeline
            .push(Box::new(StubLayer {
                behaviour: Behaviour::Panic,
                ..StubLayer::new("panics")
            }))
            .expect("push");
        pipeline.push(Box::new(StubLayer::new("after"))).expect("push");

        let mut gfx = CommandRecorder::new(SurfaceSize::new(8, 8));
        let mut calls = Vec::new();
        let report = pipeline.run_frame(&mut gfx, frame(0.0), SurfaceSize::new(8, 8), &mut calls);

        assert_eq!(calls, vec!["fails", "panics", "after"]);
        assert_eq!(report.drawn, 1);
        assert_eq!(
            report.failed,
            vec![
                DrawError::layer("fails", "boom"),
                DrawError::Panicked {
                    layer: "panics".to_string()
                },
            ]
        );
        // The stray translations of the failed layers never leak into "after".
        assert_eq!(gfx.depth(), 0);
        let (rect, _, _) = gfx.fill_rects().next().expect("after drew");
        assert_eq!(rect, Rect::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut pipeline: LayerPipeline<Vec<String>> = LayerPipeline::new();
        pipeline.push(Box::new(StubLayer::new("x"))).expect("first push");
        let err = pipeline.push(Box::new(StubLayer::new("x"))).unwrap_err();
        assert_eq!(err, DrawError::DuplicateLayer { id: "x".to_string() });
        assert_eq!(pipeline.find("x").map(LayerHandle::index), Some(0));
        assert_eq!(pipeline.ids().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn toggle_visibility_reports_new_state() {
        let mut pipeline: LayerPipeline<Vec<String>> = LayerPipeline::new();
        let h = pipeline.push(Box::new(StubLayer::new("x"))).expect("push");
        assert!(pipeline.is_visible(h));
        assert_eq!(pipeline.toggle_visible(h), Ok(false));
        assert!(!pipeline.is_visible(h));
        assert_eq!(
            pipeline.set_visible(LayerHandle(9), true),
            Err(DrawError::UnknownLayer { index: 9 })
        );
    }
}
