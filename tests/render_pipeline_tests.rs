use plot_rs::core::{
    Annotation, AnnotationKind, AnnotationLayer, Axis, AxisPosition, DataPoint, LineSeries, ScatterSeries,
    ScreenRect,
};
use plot_rs::render::{
    Color, EdgeRenderingMode, FontSpec, RecordedOp, RecordingBackend, RenderBackend, RenderTarget,
    Stroke, TextCommand, TextSize,
};
use plot_rs::{PlotError, PlotModel, PlotResult};

fn bounds() -> ScreenRect {
    ScreenRect::new(0.0, 0.0, 800.0, 600.0)
}

fn screen_backend() -> RecordingBackend {
    RecordingBackend::new(RenderTarget::ScreenRaster)
}

fn one_axis_per_position() -> PlotModel {
    PlotModel::new()
        .with_axis(Axis::linear(AxisPosition::Left))
        .with_axis(Axis::linear(AxisPosition::Bottom))
        .with_axis(Axis::linear(AxisPosition::Right).with_key("right"))
        .with_axis(Axis::linear(AxisPosition::Top).with_key("top"))
}

#[test]
fn empty_model_renders_with_default_ranges() {
    let mut model = one_axis_per_position();
    let mut backend = screen_backend();

    let result = model.render(&mut backend, bounds()).expect("render");

    assert!(!result.is_empty());
    assert!(model.last_render_error().is_none());
    for axis in model.axes() {
        assert_eq!(axis.actual_range(), (0.0, 1.0));
    }
    assert_eq!(backend.clip_depth(), 0);
}

#[test]
fn huge_and_non_finite_points_are_dropped_without_fault() {
    let mut model = PlotModel::new().with_series(LineSeries::new(vec![
        DataPoint::new(0.0, 0.0),
        DataPoint::new(1.0, 1e40),
        DataPoint::new(2.0, 2.0),
        DataPoint::new(3.0, f64::NAN),
        DataPoint::new(4.0, f64::INFINITY),
        DataPoint::new(5.0, 5.0),
    ]));
    let mut backend = screen_backend();

    let result = model.render(&mut backend, bounds()).expect("render");

    assert_eq!(result.dropped_points, 3);
    let (y_min, y_max) = model.axes()[1].actual_range();
    assert!(y_min < 0.0 && y_max > 5.0 && y_max < 6.0);
    for point in backend.drawn_points() {
        assert!(point.is_finite());
        assert!(point.x.abs() < 1e6 && point.y.abs() < 1e6);
    }
}

#[test]
fn unplottable_points_split_lines_into_pieces() {
    let mut model = PlotModel::new().with_series(
        LineSeries::new(vec![
            DataPoint::new(0.0, 0.0),
            DataPoint::new(1.0, 1.0),
            DataPoint::new(2.0, f64::NAN),
            DataPoint::new(3.0, 1.0),
            DataPoint::new(4.0, 0.0),
        ])
        .with_marker_size(0.0),
    );
    let mut backend = screen_backend();

    let result = model.render(&mut backend, bounds()).expect("render");

    assert_eq!(result.clipped_pieces, 2);
    assert_eq!(result.dropped_points, 1);
}

#[test]
fn lines_leaving_the_plot_area_are_clipped() {
    let mut model = PlotModel::new()
        .with_axis(Axis::linear(AxisPosition::Bottom).with_range(0.0, 10.0))
        .with_axis(Axis::linear(AxisPosition::Left).with_range(0.0, 10.0))
        .with_series(LineSeries::new(vec![
            DataPoint::new(-100.0, 5.0),
            DataPoint::new(5.0, 5.0),
            DataPoint::new(5.0, 500.0),
        ]));
    let mut backend = screen_backend();

    model.render(&mut backend, bounds()).expect("render");
    let area = model.plot_area();

    let series_points = backend
        .ops()
        .iter()
        .filter_map(|op| match op {
            RecordedOp::Line { points, stroke, .. } if stroke.thickness == 2.0 => Some(points),
            _ => None,
        })
        .flatten()
        .collect::<Vec<_>>();
    assert!(!series_points.is_empty());
    for point in series_points {
        assert!(point.x >= area.left - 1.0 && point.x <= area.right() + 1.0);
        assert!(point.y >= area.top - 1.0 && point.y <= area.bottom() + 1.0);
    }
}

#[test]
fn series_are_bracketed_by_plot_area_clips() {
    let mut model = PlotModel::new()
        .with_series(LineSeries::new(vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)]))
        .with_series(ScatterSeries::new(vec![DataPoint::new(0.5, 0.5)]));
    let mut backend = screen_backend();

    model.render(&mut backend, bounds()).expect("render");

    let clips = backend
        .ops()
        .iter()
        .filter(|op| matches!(op, RecordedOp::ClipPush(rect) if *rect == model.plot_area()))
        .count();
    assert_eq!(clips, 2);
    assert_eq!(backend.max_clip_depth(), 1);
    assert_eq!(backend.clip_depth(), 0);
}

#[test]
fn commands_follow_layer_order() {
    let marker = |color: Color| Stroke::solid(color, 3.0);
    let below_axes = Color::rgb(1.0, 0.0, 0.0);
    let above_series = Color::rgb(0.0, 0.0, 1.0);
    let mut model = PlotModel::new()
        .with_axis(Axis::linear(AxisPosition::Bottom).with_range(0.0, 10.0))
        .with_axis(Axis::linear(AxisPosition::Left).with_range(0.0, 10.0))
        .with_series(LineSeries::new(vec![DataPoint::new(0.0, 1.0), DataPoint::new(10.0, 9.0)]))
        .with_annotation(
            Annotation::horizontal_line(5.0, marker(above_series)).with_layer(AnnotationLayer::AboveSeries),
        )
        .with_annotation(
            Annotation::vertical_line(5.0, marker(below_axes)).with_layer(AnnotationLayer::BelowAxes),
        );
    let mut backend = screen_backend();

    model.render(&mut backend, bounds()).expect("render");

    let position = |predicate: &dyn Fn(&RecordedOp) -> bool| {
        backend
            .ops()
            .iter()
            .position(|op| predicate(op))
            .expect("op present")
    };
    let below = position(&|op| matches!(op, RecordedOp::Line { stroke, .. } if stroke.color == below_axes));
    let first_label = position(&|op| matches!(op, RecordedOp::TextLine { .. }));
    let series = position(&|op| matches!(op, RecordedOp::Line { stroke, .. } if stroke.thickness == 2.0));
    let above = position(&|op| matches!(op, RecordedOp::Line { stroke, .. } if stroke.color == above_series));

    assert!(below < first_label);
    assert!(first_label < series);
    assert!(series < above);
}

#[test]
fn unknown_axis_key_faults_and_is_retained_until_fixed() {
    let mut model = PlotModel::new()
        .with_series(LineSeries::new(vec![DataPoint::new(0.0, 0.0)]).with_y_axis_key("missing"));
    let mut backend = screen_backend();

    let err = model.render(&mut backend, bounds()).expect_err("unknown key");
    assert_eq!(
        err,
        PlotError::UnknownAxisKey {
            key: "missing".to_owned()
        }
    );
    assert!(backend.ops().is_empty(), "no partial frame reaches the backend");
    assert_eq!(model.last_render_error(), Some(&err));

    model.add_axis(Axis::linear(AxisPosition::Right).with_key("missing"));
    model.render(&mut backend, bounds()).expect("render after fix");
    assert!(model.last_render_error().is_none());
}

#[test]
fn duplicate_axis_keys_fault() {
    let mut model = PlotModel::new()
        .with_axis(Axis::linear(AxisPosition::Left).with_key("y"))
        .with_axis(Axis::linear(AxisPosition::Right).with_key("y"));
    let err = model
        .render(&mut screen_backend(), bounds())
        .expect_err("duplicate key");
    assert!(matches!(&err, PlotError::DuplicateAxisKey { key } if key == "y"));
    assert!(err.is_configuration_error());
}

struct FailingBackend {
    inner: RecordingBackend,
    fail_on_rectangles: bool,
}

impl RenderBackend for FailingBackend {
    fn render_target(&self) -> RenderTarget {
        self.inner.render_target()
    }

    fn draw_line(
        &mut self,
        points: &[plot_rs::core::ScreenPoint],
        stroke: &Stroke,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        self.inner.draw_line(points, stroke, edge_mode)
    }

    fn draw_polygon(
        &mut self,
        points: &[plot_rs::core::ScreenPoint],
        fill: Option<Color>,
        stroke: Option<&Stroke>,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        self.inner.draw_polygon(points, fill, stroke, edge_mode)
    }

    fn draw_rectangle(
        &mut self,
        rect: ScreenRect,
        fill: Option<Color>,
        stroke: Option<&Stroke>,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        if self.fail_on_rectangles && self.inner.clip_depth() > 0 {
            return Err(PlotError::Backend("device lost".to_owned()));
        }
        self.inner.draw_rectangle(rect, fill, stroke, edge_mode)
    }

    fn draw_text(&mut self, text: &TextCommand) -> PlotResult<()> {
        self.inner.draw_text(text)
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> PlotResult<TextSize> {
        self.inner.measure_text(text, font)
    }

    fn push_clip(&mut self, rect: ScreenRect) -> PlotResult<()> {
        self.inner.push_clip(rect)
    }

    fn pop_clip(&mut self) -> PlotResult<()> {
        self.inner.pop_clip()
    }
}

#[test]
fn backend_fault_unwinds_clips_and_clears_on_next_pass() {
    let mut model = PlotModel::new().with_series(ScatterSeries::new(vec![DataPoint::new(1.0, 1.0)]));
    let mut backend = FailingBackend {
        inner: screen_backend(),
        fail_on_rectangles: true,
    };

    let err = model.render(&mut backend, bounds()).expect_err("backend fault");
    assert!(matches!(err, PlotError::Backend(_)));
    assert_eq!(backend.inner.clip_depth(), 0);
    assert_eq!(model.last_render_error(), Some(&err));

    backend.fail_on_rectangles = false;
    model.render(&mut backend, bounds()).expect("recovered");
    assert!(model.last_render_error().is_none());
}

#[test]
fn zero_area_pass_renders_nothing() {
    let mut model = PlotModel::new().with_series(LineSeries::new(vec![DataPoint::new(0.0, 0.0)]));
    let mut backend = screen_backend();

    let result = model
        .render(&mut backend, ScreenRect::new(0.0, 0.0, 0.0, 0.0))
        .expect("zero-area pass");

    assert!(result.is_empty());
    assert!(backend.ops().is_empty());
}

#[test]
fn edge_modes_resolve_per_target() {
    let series = || {
        LineSeries::new(vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)]).with_marker_size(0.0)
    };
    let series_line = |backend: &RecordingBackend| {
        backend
            .ops()
            .iter()
            .find_map(|op| match op {
                RecordedOp::Line {
                    stroke,
                    edge_mode,
                    antialias,
                    ..
                } if stroke.thickness == 2.0 => Some((*edge_mode, *antialias)),
                _ => None,
            })
            .expect("series line")
    };

    let mut screen = screen_backend();
    PlotModel::new()
        .with_series(series())
        .render(&mut screen, bounds())
        .expect("screen pass");
    assert_eq!(series_line(&screen), (EdgeRenderingMode::Adaptive, true));

    let mut vector = RecordingBackend::new(RenderTarget::VectorGraphic);
    PlotModel::new()
        .with_series(series())
        .render(&mut vector, bounds())
        .expect("vector pass");
    assert_eq!(series_line(&vector), (EdgeRenderingMode::PreferGeometricAccuracy, true));

    let mut sharp = screen_backend();
    PlotModel::new()
        .with_series(series().with_edge_mode(EdgeRenderingMode::PreferSharpness))
        .render(&mut sharp, bounds())
        .expect("sharp pass");
    assert_eq!(series_line(&sharp), (EdgeRenderingMode::PreferSharpness, false));
}

#[test]
fn legend_and_title_are_drawn_as_text() {
    let mut model = PlotModel::new()
        .with_title("Signal")
        .with_subtitle("first line\nsecond line")
        .with_series(LineSeries::new(vec![DataPoint::new(0.0, 0.0)]).with_title("sin(x)"));
    let mut backend = screen_backend();

    model.render(&mut backend, bounds()).expect("render");

    let lines = backend.text_lines();
    for expected in ["Signal", "first line", "second line", "sin(x)"] {
        assert!(lines.contains(&expected), "missing text `{expected}`");
    }
    assert!(model.plot_area().top > 16.0 + 2.0 * 12.0);
}

#[test]
fn settings_survive_json_round_trip() {
    let model = PlotModel::new().with_title("exported");
    let json = model.settings_json().expect("serialize");

    let mut other = PlotModel::new();
    other.apply_settings_json(&json).expect("apply");

    assert_eq!(other.title(), Some("exported"));
    assert!(other.apply_settings_json("{ not json").is_err());
}

#[test]
fn heat_map_cells_sit_on_category_slots() {
    use approx::assert_relative_eq;
    use plot_rs::core::HeatMapSeries;

    let days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let hours = ["0h", "6h", "12h", "18h", "24h"];
    let data = (0..days.len())
        .map(|i| (0..hours.len()).map(|j| (i * hours.len() + j) as f64).collect())
        .collect();
    let mut model = PlotModel::new()
        .with_axis(Axis::category(AxisPosition::Bottom, days))
        .with_axis(Axis::category(AxisPosition::Left, hours))
        .with_series(HeatMapSeries::new(0.0, 6.0, 0.0, 4.0, data));
    let mut backend = RecordingBackend::new(RenderTarget::VectorGraphic);

    model.render(&mut backend, bounds()).expect("render");

    let mut inside_clip = false;
    let mut cells = Vec::new();
    for op in backend.ops() {
        match op {
            RecordedOp::ClipPush(_) => inside_clip = true,
            RecordedOp::ClipPop => inside_clip = false,
            RecordedOp::Rectangle { rect, .. } if inside_clip => cells.push(*rect),
            _ => {}
        }
    }
    assert_eq!(cells.len(), days.len() * hours.len());

    let (x_axis, y_axis) = (&model.axes()[0], &model.axes()[1]);
    assert_eq!(x_axis.actual_range(), (-0.5, 6.5));
    let first = cells[0];
    assert_relative_eq!(first.left + first.width * 0.5, x_axis.transform(0.0), epsilon = 1e-9);
    assert_relative_eq!(first.top + first.height * 0.5, y_axis.transform(0.0), epsilon = 1e-9);
    let last = cells[cells.len() - 1];
    assert_relative_eq!(last.left + last.width * 0.5, x_axis.transform(6.0), epsilon = 1e-9);

    let area = model.plot_area();
    let right = cells.iter().map(|cell| cell.right()).fold(f64::MIN, f64::max);
    assert_relative_eq!(cells.iter().map(|cell| cell.left).fold(f64::MAX, f64::min), area.left, epsilon = 1e-9);
    assert_relative_eq!(right, area.right(), epsilon = 1e-9);
}

#[test]
fn zero_font_sizes_render_without_text() {
    let mut note = Annotation::text(DataPoint::new(0.5, 0.5), "note");
    if let AnnotationKind::Text(text) = &mut note.kind {
        text.font = FontSpec::sized(0.0);
    }
    let mut model = PlotModel::new()
        .with_title("hidden")
        .with_axis(Axis::linear(AxisPosition::Bottom).with_font_size(0.0).with_title("x"))
        .with_axis(Axis::linear(AxisPosition::Left).with_font_size(-3.0))
        .with_annotation(note)
        .with_series(
            LineSeries::new(vec![DataPoint::new(0.0, 0.0), DataPoint::new(1.0, 1.0)]).with_title("line"),
        );
    model.settings_mut().title_font_size = 0.0;
    model.settings_mut().legend.font_size = 0.0;
    let mut backend = screen_backend();

    let result = model.render(&mut backend, bounds()).expect("render");

    assert!(model.last_render_error().is_none());
    assert!(result.commands > 0);
    assert!(!backend.ops().iter().any(|op| matches!(op, RecordedOp::TextLine { .. })));
}
