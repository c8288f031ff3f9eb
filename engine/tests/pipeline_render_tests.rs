use engine::graphics::{CpuRenderer, Renderer2d};
use engine::hit_test::{HitRouter, PhysicalObject};
use engine::layers::{DrawContext, Layer, LayerPipeline};
use engine::snapshot::rgba_sha256_hex;
use engine::surface::{RgbaBufferSurface, Surface, SurfaceSize};
use engine::transport::Transport;
use engine::ui::{Point, Rect};
use engine::DrawError;

const RED: [u8; 4] = [220, 20, 60, 255];
const BLUE: [u8; 4] = [30, 144, 255, 255];

#[derive(Default)]
struct Clicks {
    hits: Vec<String>,
}

struct Backdrop;

impl Layer<Clicks> for Backdrop {
    fn id(&self) -> &str {
        "backdrop"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, _: &mut Clicks) -> Result<(), DrawError> {
        ctx.gfx.clear([0, 0, 0, 255]);
        ctx.gfx.fill_rect(Rect::from_size(16.0, 16.0), RED);
        Ok(())
    }
}

/// Slides right one pixel per second of logical time.
struct Slider;

impl Layer<Clicks> for Slider {
    fn id(&self) -> &str {
        "slider"
    }

    fn draw(&mut self, ctx: &mut DrawContext<'_>, _: &mut Clicks) -> Result<(), DrawError> {
        ctx.set_layer_offset(Point::new(ctx.time as f32, 0.0));
        ctx.gfx.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), BLUE);
        Ok(())
    }
}

fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * width + x) * 4) as usize;
    [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
}

fn pipeline() -> LayerPipeline<Clicks> {
    let mut p = LayerPipeline::new();
    p.push(Box::new(Backdrop)).expect("backdrop");
    p.push(Box::new(Slider)).expect("slider");
    p
}

#[test]
fn later_layers_paint_over_earlier_ones() {
    let size = SurfaceSize::new(32, 32);
    let mut surface = RgbaBufferSurface::new(size);
    let mut pipeline = pipeline();
    let mut transport = Transport::new();
    transport.advance(0.0);
    let frame = transport.advance(3000.0);

    {
        let mut gfx = surface.renderer();
        gfx.begin_frame(size);
        let report = pipeline.run_frame(&mut gfx, frame, size, &mut Clicks::default());
        assert!(report.is_clean());
    }

    let rgba = surface.frame();
    assert_eq!(pixel(rgba, 32, 0, 0), RED);
    assert_eq!(pixel(rgba, 32, 3, 0), BLUE);
    assert_eq!(pixel(rgba, 32, 6, 3), BLUE);
    assert_eq!(pixel(rgba, 32, 7, 0), RED);
    assert_eq!(pixel(rgba, 32, 20, 20), [0, 0, 0, 255]);
}

#[test]
fn identical_frames_hash_identically() {
    let size = SurfaceSize::new(24, 24);
    let mut hashes = Vec::new();
    for _ in 0..2 {
        let mut buf = vec![0u8; size.rgba_len()];
        let mut pipeline = pipeline();
        let mut transport = Transport::new();
        for now in [0.0, 500.0, 1000.0] {
            let frame = transport.advance(now);
            let mut gfx = CpuRenderer::new(&mut buf, size);
            gfx.begin_frame(size);
            pipeline.run_frame(&mut gfx, frame, size, &mut Clicks::default());
        }
        hashes.push(rgba_sha256_hex(&buf));
    }
    assert_eq!(hashes[0], hashes[1]);
}

#[test]
fn clicks_track_the_slider_between_frames() {
    let size = SurfaceSize::new(32, 32);
    let mut buf = vec![0u8; size.rgba_len()];
    let mut pipeline = pipeline();
    let slider = pipeline.find("slider").expect("slider registered");

    let mut router = HitRouter::new();
    router.register(
        PhysicalObject::new("block", Rect::new(0.0, 0.0, 4.0, 4.0), slider)
            .on_click(|p: Point, clicks: &mut Clicks| clicks.hits.push(format!("{}", p.x))),
    );

    let mut transport = Transport::new();
    let mut clicks = Clicks::default();
    for now in [0.0, 10_000.0] {
        let frame = transport.advance(now);
        let mut gfx = CpuRenderer::new(&mut buf, size);
        gfx.begin_frame(size);
        pipeline.run_frame(&mut gfx, frame, size, &mut clicks);
    }

    assert_eq!(router.handle_click(Point::new(2.0, 2.0), &pipeline, &mut clicks), None);
    assert_eq!(
        router.handle_click(Point::new(12.0, 2.0), &pipeline, &mut clicks),
        Some("block")
    );
    assert_eq!(clicks.hits, vec!["12"]);
}
