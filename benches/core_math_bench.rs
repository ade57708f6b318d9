use criterion::{Criterion, criterion_group, criterion_main};
use plot_rs::PlotModel;
use plot_rs::core::projection::{clip_polyline, project_runs};
use plot_rs::core::{
    Axis, AxisPosition, AxisTransform, DataPoint, LineSeries, ScaleMapping, ScreenRect,
};
use plot_rs::render::{RecordingBackend, RenderTarget};
use std::hint::black_box;

fn wave(count: usize) -> Vec<DataPoint> {
    (0..count)
        .map(|i| {
            let x = i as f64 * 0.01;
            DataPoint::new(x, x.sin() * 100.0)
        })
        .collect()
}

fn bench_transform_round_trip(c: &mut Criterion) {
    let transform = AxisTransform::from_extent(0.0, 10_000.0, 0.0, 1920.0, ScaleMapping::Linear);

    c.bench_function("axis_transform_round_trip", |b| {
        b.iter(|| {
            let screen = transform.transform(black_box(4_321.123));
            let _ = transform.inverse_transform(black_box(screen));
        })
    });
}

fn bench_project_and_clip_100k(c: &mut Criterion) {
    let mut model = PlotModel::new()
        .with_axis(Axis::linear(AxisPosition::Bottom).with_range(100.0, 400.0))
        .with_axis(Axis::linear(AxisPosition::Left).with_range(-50.0, 50.0));
    let mut backend = RecordingBackend::new(RenderTarget::ScreenRaster);
    model
        .render(&mut backend, ScreenRect::new(0.0, 0.0, 1600.0, 900.0))
        .expect("layout pass");
    let points = wave(100_000);
    let (x_axis, y_axis) = (&model.axes()[0], &model.axes()[1]);
    let plot_area = model.plot_area();

    c.bench_function("project_and_clip_100k", |b| {
        b.iter(|| {
            let projected = project_runs(black_box(&points), x_axis, y_axis);
            let pieces = projected
                .runs
                .iter()
                .map(|run| clip_polyline(run, plot_area).len())
                .sum::<usize>();
            black_box(pieces)
        })
    });
}

fn bench_render_pass_10k(c: &mut Criterion) {
    let mut model = PlotModel::new()
        .with_title("bench")
        .with_series(LineSeries::new(wave(10_000)).with_title("sin"));
    let bounds = ScreenRect::new(0.0, 0.0, 1600.0, 900.0);

    c.bench_function("render_pass_10k", |b| {
        b.iter(|| {
            let mut backend = RecordingBackend::new(RenderTarget::ScreenRaster);
            let result = model
                .render(&mut backend, black_box(bounds))
                .expect("render pass should succeed");
            black_box(result)
        })
    });
}

criterion_group!(
    benches,
    bench_transform_round_trip,
    bench_project_and_clip_100k,
    bench_render_pass_10k
);
criterion_main!(benches);
