#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use plot_rs::api::{PdfExporter, PngExporter};
use plot_rs::core::{Axis, AxisPosition, DataPoint, LineSeries, ScreenRect};
use plot_rs::render::{CairoBackend, FontSpec, RenderBackend, RenderTarget};
use plot_rs::{PlotError, PlotModel};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

fn sample_model() -> PlotModel {
    PlotModel::new()
        .with_title("Export")
        .with_series(
            LineSeries::new(vec![
                DataPoint::new(0.0, 1.0),
                DataPoint::new(1.0, 4.0),
                DataPoint::new(2.0, 2.0),
            ])
            .with_title("series"),
        )
}

#[test]
fn png_export_writes_an_encoded_image() {
    let mut model = sample_model();
    let mut stream = Vec::new();

    let result = PngExporter::new(320, 200)
        .export(&mut model, &mut stream)
        .expect("png export");

    assert!(stream.starts_with(&PNG_SIGNATURE));
    assert!(result.commands > 0);
    assert!(result.plot_area.width > 0.0);
}

#[test]
fn png_export_rejects_zero_size_without_touching_the_stream() {
    let mut model = sample_model();
    let mut stream = Vec::new();

    let err = PngExporter::new(0, 200)
        .export(&mut model, &mut stream)
        .expect_err("zero width");

    assert_eq!(err, PlotError::InvalidViewport { width: 0, height: 200 });
    assert!(stream.is_empty());
}

#[test]
fn failed_pass_leaves_the_stream_empty() {
    let mut model = sample_model().with_axis(Axis::linear(AxisPosition::Left).with_key("dup"));
    model.add_axis(Axis::linear(AxisPosition::Right).with_key("dup"));
    let mut stream = Vec::new();

    let err = PngExporter::new(200, 100)
        .export(&mut model, &mut stream)
        .expect_err("duplicate keys fault");

    assert!(matches!(err, PlotError::DuplicateAxisKey { .. }));
    assert!(stream.is_empty());
    assert!(model.last_render_error().is_some());
}

#[test]
fn pdf_export_writes_a_document() {
    let mut model = sample_model();
    let mut stream = Vec::new();

    PdfExporter::new(420.0, 297.0)
        .export(&mut model, &mut stream)
        .expect("pdf export");

    assert!(stream.starts_with(b"%PDF"));
}

#[test]
fn pdf_export_rejects_non_positive_page() {
    let mut model = sample_model();
    let mut stream = Vec::new();

    let err = PdfExporter::new(0.0, 297.0)
        .export(&mut model, &mut stream)
        .expect_err("zero page width");

    assert!(matches!(err, PlotError::Export(_)));
    assert!(stream.is_empty());
}

#[test]
fn cairo_backend_renders_a_pass_on_an_image_surface() {
    let surface = ImageSurface::create(Format::ARgb32, 400, 300).expect("surface");
    let context = Context::new(&surface).expect("context");
    let mut backend = CairoBackend::new(context, RenderTarget::ScreenRaster);
    let mut model = sample_model();

    let result = model
        .render(&mut backend, ScreenRect::new(0.0, 0.0, 400.0, 300.0))
        .expect("render");

    let stats = backend.stats();
    assert!(stats.lines_drawn > 0);
    assert!(stats.text_lines_drawn > 0);
    assert!(stats.rects_drawn > 0);
    assert_eq!(backend.clip_depth(), 0);
    assert!(result.commands > 0);
    assert_eq!(backend.render_target(), RenderTarget::ScreenRaster);
}

#[test]
fn cairo_text_measurement_grows_with_line_count() {
    let surface = ImageSurface::create(Format::ARgb32, 10, 10).expect("surface");
    let context = Context::new(&surface).expect("context");
    let backend = CairoBackend::for_screen(&context);
    let font = FontSpec::sized(12.0);

    let one = backend.measure_text("label", &font).expect("measure");
    let two = backend.measure_text("label\nlabel", &font).expect("measure");

    assert!(one.width > 0.0);
    assert!(two.height > one.height);
}
