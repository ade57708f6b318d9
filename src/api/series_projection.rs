use tracing::trace;

use crate::core::projection::{clip_polygon, clip_polyline, project_point, project_runs};
use crate::core::{
    Axis, ColumnSeries, HeatMapSeries, LineSeries, ScatterSeries, ScreenPoint, ScreenRect, Series,
    SeriesAxes,
};
use crate::render::{Color, DrawCommand, EdgeRenderingMode, RenderFrame, Stroke};

use super::plot_model::PlotModel;

impl PlotModel {
    /// Projects, splits and clips every visible series. Each series is
    /// bracketed by a clip to the plot area.
    pub(super) fn append_series_commands(&self, frame: &mut RenderFrame) {
        let plot_area = frame.plot_area;
        for (index, (series, binding)) in self.series.iter().zip(&self.series_axes).enumerate() {
            if !series.is_visible() {
                continue;
            }
            let color = series.resolved_color(index);
            frame.push(DrawCommand::ClipPush(plot_area));
            let before = frame.commands.len();
            match series {
                Series::Line(line) => append_line_series(frame, line, &self.axes, *binding, color),
                Series::Scatter(scatter) => {
                    append_scatter_series(frame, scatter, &self.axes, *binding, color);
                }
                Series::Column(column) => {
                    append_column_series(frame, column, &self.axes, *binding, color);
                }
                Series::HeatMap(heat_map) => append_heat_map(frame, heat_map, &self.axes, *binding),
            }
            trace!(
                series = index,
                commands = frame.commands.len() - before,
                "projected series"
            );
            frame.push(DrawCommand::ClipPop);
        }
    }
}

fn marker_rect(center: ScreenPoint, size: f64) -> ScreenRect {
    ScreenRect::new(center.x - size * 0.5, center.y - size * 0.5, size, size)
}

fn append_line_series(
    frame: &mut RenderFrame,
    series: &LineSeries,
    axes: &[Axis],
    binding: SeriesAxes,
    color: Color,
) {
    let (x_axis, y_axis) = (&axes[binding.x], &axes[binding.y]);
    let plot_area = frame.plot_area;
    let projected = project_runs(&series.points, x_axis, y_axis);
    frame.dropped_points += projected.dropped;

    if let Some(fill) = series.fill.filter(|fill| fill.is_visible()) {
        let baseline = y_axis
            .try_transform(0.0)
            .unwrap_or_else(|| plot_area.bottom())
            .clamp(plot_area.top - 1.0, plot_area.bottom() + 1.0);
        for run in projected.runs.iter().filter(|run| run.len() >= 2) {
            let mut polygon = run.clone();
            if let (Some(first), Some(last)) = (run.first(), run.last()) {
                polygon.push(ScreenPoint::new(last.x, baseline));
                polygon.push(ScreenPoint::new(first.x, baseline));
            }
            let clipped = clip_polygon(&polygon, plot_area);
            if clipped.len() >= 3 {
                frame.push(DrawCommand::Polygon {
                    points: clipped,
                    fill: Some(fill),
                    stroke: None,
                    edge_mode: series.edge_mode,
                });
            }
        }
    }

    let stroke = Stroke::solid(color, series.stroke_thickness).with_line_style(series.line_style);
    for run in &projected.runs {
        for piece in clip_polyline(run, plot_area) {
            frame.clipped_pieces += 1;
            frame.push_line(piece, stroke, series.edge_mode);
        }
    }

    if series.marker_size > 0.0 {
        for point in projected.runs.iter().flatten() {
            if plot_area.contains(*point) {
                frame.push_rect(
                    marker_rect(*point, series.marker_size),
                    Some(color),
                    None,
                    series.edge_mode,
                );
            }
        }
    }
}

fn append_scatter_series(
    frame: &mut RenderFrame,
    series: &ScatterSeries,
    axes: &[Axis],
    binding: SeriesAxes,
    color: Color,
) {
    let (x_axis, y_axis) = (&axes[binding.x], &axes[binding.y]);
    let plot_area = frame.plot_area;
    for point in &series.points {
        let Some(screen) = project_point(*point, x_axis, y_axis) else {
            frame.dropped_points += 1;
            continue;
        };
        if plot_area.contains(screen) {
            frame.push_rect(
                marker_rect(screen, series.marker_size),
                Some(color),
                None,
                EdgeRenderingMode::Automatic,
            );
        }
    }
}

fn append_column_series(
    frame: &mut RenderFrame,
    series: &ColumnSeries,
    axes: &[Axis],
    binding: SeriesAxes,
    color: Color,
) {
    let (x_axis, y_axis) = (&axes[binding.x], &axes[binding.y]);
    let plot_area = frame.plot_area;
    let half_width = series.column_width * 0.5;
    for (index, value) in series.values.iter().enumerate() {
        let center = index as f64;
        let corners = (
            x_axis.try_transform(center - half_width),
            x_axis.try_transform(center + half_width),
            y_axis.try_transform(series.base_value),
            y_axis.try_transform(*value),
        );
        let (Some(x0), Some(x1), Some(y0), Some(y1)) = corners else {
            frame.dropped_points += 1;
            continue;
        };
        let rect = ScreenRect::from_corners(ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1))
            .intersect(plot_area);
        if !rect.is_empty() {
            frame.push_rect(rect, Some(color), None, EdgeRenderingMode::Automatic);
        }
    }
}

fn append_heat_map(frame: &mut RenderFrame, series: &HeatMapSeries, axes: &[Axis], binding: SeriesAxes) {
    let (x_axis, y_axis) = (&axes[binding.x], &axes[binding.y]);
    let Some(color_axis) = binding.color.map(|index| &axes[index]) else {
        return;
    };
    let plot_area = frame.plot_area;
    for (i, column) in series.data.iter().enumerate() {
        for (j, value) in column.iter().enumerate() {
            let Some(color) = color_axis.color_for(*value) else {
                frame.dropped_points += 1;
                continue;
            };
            let (x_min, x_max, y_min, y_max) = series.cell_bounds(i, j);
            let corners = (
                x_axis.try_transform(x_min),
                x_axis.try_transform(x_max),
                y_axis.try_transform(y_min),
                y_axis.try_transform(y_max),
            );
            let (Some(x0), Some(x1), Some(y0), Some(y1)) = corners else {
                frame.dropped_points += 1;
                continue;
            };
            let rect = ScreenRect::from_corners(ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1))
                .intersect(plot_area);
            if !rect.is_empty() {
                frame.push_rect(rect, Some(color), None, EdgeRenderingMode::PreferSpeed);
            }
        }
    }
}
