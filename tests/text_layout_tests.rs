use approx::assert_relative_eq;
use plot_rs::core::ScreenPoint;
use plot_rs::render::text::{MULTILINE_SPACING, block_size, split_lines};
use plot_rs::render::{
    Color, FontSpec, HorizontalAlign, RecordedOp, RecordingBackend, RenderBackend, RenderTarget,
    TextCommand, VerticalAlign,
};

fn origins(backend: &RecordingBackend) -> Vec<ScreenPoint> {
    backend
        .ops()
        .iter()
        .filter_map(|op| match op {
            RecordedOp::TextLine { origin, .. } => Some(*origin),
            _ => None,
        })
        .collect()
}

#[test]
fn every_break_style_starts_a_new_line() {
    assert_eq!(split_lines("A\r\nB\nC\rD").as_slice(), ["A", "B", "C", "D"]);
    assert_eq!(split_lines("").as_slice(), [""]);
    assert_eq!(split_lines("tail\n").as_slice(), ["tail", ""]);
    assert_eq!(split_lines("\r\r\n").as_slice(), ["", "", ""]);
}

#[test]
fn lines_are_stacked_by_font_size_plus_spacing() {
    let mut backend = RecordingBackend::new(RenderTarget::ScreenRaster);
    let text = TextCommand::new(
        ScreenPoint::new(100.0, 50.0),
        "A\r\nB\nC\rD",
        FontSpec::sized(10.0),
        Color::BLACK,
    );

    backend.draw_text(&text).expect("draw text");

    assert_eq!(backend.text_lines(), ["A", "B", "C", "D"]);
    let step = 10.0 + MULTILINE_SPACING;
    for (index, origin) in origins(&backend).into_iter().enumerate() {
        assert_relative_eq!(origin.x, 100.0);
        assert_relative_eq!(origin.y, 50.0 + index as f64 * step);
    }
}

#[test]
fn measured_block_height_matches_line_count() {
    let backend = RecordingBackend::new(RenderTarget::ScreenRaster);
    let font = FontSpec::sized(12.0);

    let single = backend.measure_text("one", &font).expect("measure");
    let triple = backend.measure_text("one\nthree\nx", &font).expect("measure");

    assert_relative_eq!(single.height, 12.0);
    assert_relative_eq!(triple.height, 3.0 * 12.0 + 2.0 * MULTILINE_SPACING);
    assert!(triple.width > single.width);
    assert_eq!(block_size(std::iter::empty::<f64>(), 12.0).height, 0.0);
}

#[test]
fn alignment_offsets_the_whole_block() {
    let mut backend = RecordingBackend::new(RenderTarget::ScreenRaster);
    let font = FontSpec::sized(10.0);
    let size = backend.measure_text("wide line\nab", &font).expect("measure");
    let text = TextCommand::new(ScreenPoint::new(200.0, 100.0), "wide line\nab", font, Color::BLACK)
        .aligned(HorizontalAlign::Right, VerticalAlign::Bottom);

    backend.draw_text(&text).expect("draw text");

    let origins = origins(&backend);
    assert_relative_eq!(origins[0].x, 200.0 - size.width);
    assert_relative_eq!(origins[0].y, 100.0 - size.height);
    // Right-aligned lines share their right edge.
    let short_width = backend.measure_text("ab", &FontSpec::sized(10.0)).expect("measure").width;
    assert_relative_eq!(origins[1].x, 200.0 - short_width);
}

#[test]
fn rotation_turns_line_offsets_around_the_anchor() {
    let mut backend = RecordingBackend::new(RenderTarget::ScreenRaster);
    let text = TextCommand::new(ScreenPoint::new(20.0, 200.0), "a\nb", FontSpec::sized(10.0), Color::BLACK)
        .rotated(-90.0);

    backend.draw_text(&text).expect("draw text");

    let origins = origins(&backend);
    assert_relative_eq!(origins[0].x, 20.0, epsilon = 1e-9);
    assert_relative_eq!(origins[0].y, 200.0, epsilon = 1e-9);
    // The second line moves along +x once the block is turned counter-clockwise.
    assert_relative_eq!(origins[1].x, 20.0 + 10.0 + MULTILINE_SPACING, epsilon = 1e-9);
    assert_relative_eq!(origins[1].y, 200.0, epsilon = 1e-9);
}
