use std::fmt;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::axis::Axis;
use crate::core::projection::project_point;
use crate::core::types::{DataPoint, ScreenPoint};
use crate::render::{Color, DEFAULT_SERIES_COLORS, EdgeRenderingMode, LineStyle};

/// Callback that produces a fresh copy of a series' points.
#[derive(Clone)]
pub struct DataSource(Arc<dyn Fn() -> Vec<DataPoint> + Send + Sync>);

impl DataSource {
    pub fn new(source: impl Fn() -> Vec<DataPoint> + Send + Sync + 'static) -> Self {
        Self(Arc::new(source))
    }

    #[must_use]
    pub fn fetch(&self) -> Vec<DataPoint> {
        (self.0)()
    }
}

impl fmt::Debug for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DataSource(..)")
    }
}

/// Axis indices a series is bound to for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesAxes {
    pub x: usize,
    pub y: usize,
    pub color: Option<usize>,
}

/// Nearest data point found for a tracker query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerHit {
    pub series_index: usize,
    pub series_title: Option<String>,
    pub item_index: usize,
    pub data: DataPoint,
    pub position: ScreenPoint,
}

impl TrackerHit {
    /// Text shown by the tracker overlay.
    #[must_use]
    pub fn text(&self) -> String {
        let body = format!("X: {}\nY: {}", trim_float(self.data.x), trim_float(self.data.y));
        match &self.series_title {
            Some(title) => format!("{title}\n{body}"),
            None => body,
        }
    }
}

fn trim_float(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_owned() } else { text.to_owned() }
}

/// Fields shared by every series kind.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCommon {
    pub title: Option<String>,
    pub x_axis_key: Option<String>,
    pub y_axis_key: Option<String>,
    pub color: Option<Color>,
    pub is_visible: bool,
}

impl Default for SeriesCommon {
    fn default() -> Self {
        Self {
            title: None,
            x_axis_key: None,
            y_axis_key: None,
            color: None,
            is_visible: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LineSeries {
    pub common: SeriesCommon,
    pub points: Vec<DataPoint>,
    pub source: Option<DataSource>,
    pub stroke_thickness: f64,
    pub line_style: LineStyle,
    /// Marker edge length in device units; zero draws no markers.
    pub marker_size: f64,
    /// Area between the line and the y = 0 baseline.
    pub fill: Option<Color>,
    pub edge_mode: EdgeRenderingMode,
}

impl Default for LineSeries {
    fn default() -> Self {
        Self {
            common: SeriesCommon::default(),
            points: Vec::new(),
            source: None,
            stroke_thickness: 2.0,
            line_style: LineStyle::Solid,
            marker_size: 0.0,
            fill: None,
            edge_mode: EdgeRenderingMode::Automatic,
        }
    }
}

impl LineSeries {
    #[must_use]
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Points are pulled from `source` on every data update.
    #[must_use]
    pub fn from_source(source: DataSource) -> Self {
        Self {
            source: Some(source),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_stroke_thickness(mut self, thickness: f64) -> Self {
        self.stroke_thickness = thickness;
        self
    }

    #[must_use]
    pub fn with_line_style(mut self, line_style: LineStyle) -> Self {
        self.line_style = line_style;
        self
    }

    #[must_use]
    pub fn with_marker_size(mut self, marker_size: f64) -> Self {
        self.marker_size = marker_size.max(0.0);
        self
    }

    #[must_use]
    pub fn with_fill(mut self, fill: Color) -> Self {
        self.fill = Some(fill);
        self
    }

    #[must_use]
    pub fn with_edge_mode(mut self, edge_mode: EdgeRenderingMode) -> Self {
        self.edge_mode = edge_mode;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ScatterSeries {
    pub common: SeriesCommon,
    pub points: Vec<DataPoint>,
    pub marker_size: f64,
}

impl ScatterSeries {
    #[must_use]
    pub fn new(points: Vec<DataPoint>) -> Self {
        Self {
            common: SeriesCommon::default(),
            points,
            marker_size: 5.0,
        }
    }

    #[must_use]
    pub fn with_marker_size(mut self, marker_size: f64) -> Self {
        self.marker_size = marker_size.max(0.0);
        self
    }
}

/// Bars at category indices `0..values.len()` of a category axis.
#[derive(Debug, Clone)]
pub struct ColumnSeries {
    pub common: SeriesCommon,
    pub values: Vec<f64>,
    /// Share of a category slot covered by the column.
    pub column_width: f64,
    pub base_value: f64,
}

impl ColumnSeries {
    #[must_use]
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            common: SeriesCommon::default(),
            values,
            column_width: 0.8,
            base_value: 0.0,
        }
    }

    #[must_use]
    pub fn with_column_width(mut self, column_width: f64) -> Self {
        self.column_width = column_width.clamp(0.0, 1.0);
        self
    }
}

/// Regular grid of values whose cell centers run from `(x0, y0)` to `(x1, y1)`.
///
/// `data[i][j]` is the cell at the i-th x position and j-th y position, so
/// each cell extends half a step beyond its center. A single column or row
/// is one unit wide, centered on `x0` or `y0`.
#[derive(Debug, Clone)]
pub struct HeatMapSeries {
    pub common: SeriesCommon,
    pub color_axis_key: Option<String>,
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub data: Vec<Vec<f64>>,
}

impl HeatMapSeries {
    #[must_use]
    pub fn new(x0: f64, x1: f64, y0: f64, y1: f64, data: Vec<Vec<f64>>) -> Self {
        Self {
            common: SeriesCommon::default(),
            color_axis_key: None,
            x0,
            x1,
            y0,
            y1,
            data,
        }
    }

    #[must_use]
    pub fn with_color_axis_key(mut self, key: impl Into<String>) -> Self {
        self.color_axis_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.data.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Data-space rectangle of cell `(i, j)` as `(x_min, x_max, y_min, y_max)`.
    #[must_use]
    pub fn cell_bounds(&self, i: usize, j: usize) -> (f64, f64, f64, f64) {
        let (x_min, x_max) = cell_span(self.x0, self.x1, self.columns(), i);
        let (y_min, y_max) = cell_span(self.y0, self.y1, self.rows(), j);
        (x_min, x_max, y_min, y_max)
    }

    /// Outer edges of the whole grid as `(x_min, x_max, y_min, y_max)`.
    #[must_use]
    pub fn grid_bounds(&self) -> (f64, f64, f64, f64) {
        let (x_min, x_max) = grid_span(self.x0, self.x1, self.columns());
        let (y_min, y_max) = grid_span(self.y0, self.y1, self.rows());
        (x_min, x_max, y_min, y_max)
    }
}

fn cell_step(first: f64, last: f64, count: usize) -> f64 {
    if count > 1 {
        (last - first) / (count - 1) as f64
    } else {
        1.0
    }
}

fn cell_span(first: f64, last: f64, count: usize, index: usize) -> (f64, f64) {
    let step = cell_step(first, last, count);
    let center = first + step * index as f64;
    let half = step.abs() * 0.5;
    (center - half, center + half)
}

fn grid_span(first: f64, last: f64, count: usize) -> (f64, f64) {
    if count == 0 {
        return (first.min(last), first.max(last));
    }
    let (a_min, a_max) = cell_span(first, last, count, 0);
    let (b_min, b_max) = cell_span(first, last, count, count - 1);
    (a_min.min(b_min), a_max.max(b_max))
}

#[derive(Debug, Clone)]
pub enum Series {
    Line(LineSeries),
    Scatter(ScatterSeries),
    Column(ColumnSeries),
    HeatMap(HeatMapSeries),
}

macro_rules! common_builders {
    ($($ty:ident => $variant:ident),*) => {$(
        impl $ty {
            #[must_use]
            pub fn with_title(mut self, title: impl Into<String>) -> Self {
                self.common.title = Some(title.into());
                self
            }

            #[must_use]
            pub fn with_color(mut self, color: Color) -> Self {
                self.common.color = Some(color);
                self
            }

            #[must_use]
            pub fn with_x_axis_key(mut self, key: impl Into<String>) -> Self {
                self.common.x_axis_key = Some(key.into());
                self
            }

            #[must_use]
            pub fn with_y_axis_key(mut self, key: impl Into<String>) -> Self {
                self.common.y_axis_key = Some(key.into());
                self
            }

            #[must_use]
            pub fn with_visible(mut self, visible: bool) -> Self {
                self.common.is_visible = visible;
                self
            }
        }

        impl From<$ty> for Series {
            fn from(series: $ty) -> Self {
                Self::$variant(series)
            }
        }
    )*};
}

common_builders!(
    LineSeries => Line,
    ScatterSeries => Scatter,
    ColumnSeries => Column,
    HeatMapSeries => HeatMap
);

impl Series {
    #[must_use]
    pub fn common(&self) -> &SeriesCommon {
        match self {
            Self::Line(series) => &series.common,
            Self::Scatter(series) => &series.common,
            Self::Column(series) => &series.common,
            Self::HeatMap(series) => &series.common,
        }
    }

    pub fn common_mut(&mut self) -> &mut SeriesCommon {
        match self {
            Self::Line(series) => &mut series.common,
            Self::Scatter(series) => &mut series.common,
            Self::Column(series) => &mut series.common,
            Self::HeatMap(series) => &mut series.common,
        }
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.common().title.as_deref()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.common().is_visible
    }

    #[must_use]
    pub fn color_axis_key(&self) -> Option<&str> {
        match self {
            Self::HeatMap(series) => series.color_axis_key.as_deref(),
            _ => None,
        }
    }

    #[must_use]
    pub fn needs_color_axis(&self) -> bool {
        matches!(self, Self::HeatMap(_))
    }

    /// Explicit color, or the palette entry for `index`.
    #[must_use]
    pub fn resolved_color(&self, index: usize) -> Color {
        self.common()
            .color
            .unwrap_or(DEFAULT_SERIES_COLORS[index % DEFAULT_SERIES_COLORS.len()])
    }

    /// Number of items along a category axis.
    #[must_use]
    pub fn category_count(&self) -> usize {
        match self {
            Self::Column(series) => series.values.len(),
            _ => 0,
        }
    }

    /// Pulls fresh points from bound data sources.
    pub fn update_data(&mut self) {
        if let Self::Line(series) = self {
            if let Some(source) = &series.source {
                series.points = source.fetch();
            }
        }
    }

    /// Data points in `(x, y)` form, for point-based kinds.
    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        match self {
            Self::Line(series) => &series.points,
            Self::Scatter(series) => &series.points,
            Self::Column(_) | Self::HeatMap(_) => &[],
        }
    }

    /// Widens the data ranges of the bound axes by this series' extents.
    pub(crate) fn include_extents(&self, axes: &mut [Axis], binding: SeriesAxes) {
        match self {
            Self::Line(_) | Self::Scatter(_) => {
                for point in self.points() {
                    if axes[binding.x].is_valid_value(point.x) && axes[binding.y].is_valid_value(point.y) {
                        axes[binding.x].include_data_value(point.x);
                        axes[binding.y].include_data_value(point.y);
                    }
                }
            }
            Self::Column(series) => {
                if !series.values.is_empty() {
                    axes[binding.x].include_data_range(0.0, series.values.len() as f64 - 1.0);
                }
                let y_axis = &mut axes[binding.y];
                y_axis.include_data_value(series.base_value);
                for value in &series.values {
                    y_axis.include_data_value(*value);
                }
            }
            Self::HeatMap(series) => {
                let (x_min, x_max, y_min, y_max) = series.grid_bounds();
                axes[binding.x].include_data_range(x_min, x_max);
                axes[binding.y].include_data_range(y_min, y_max);
                if let Some(color) = binding.color {
                    for value in series.data.iter().flatten() {
                        axes[color].include_data_value(*value);
                    }
                }
            }
        }
    }

    /// Nearest item to `position` in screen space, if any is plottable.
    #[must_use]
    pub fn nearest_point(
        &self,
        series_index: usize,
        axes: &[Axis],
        binding: SeriesAxes,
        position: ScreenPoint,
    ) -> Option<TrackerHit> {
        let (x_axis, y_axis) = (&axes[binding.x], &axes[binding.y]);
        let candidates: Vec<DataPoint> = match self {
            Self::Line(_) | Self::Scatter(_) => self.points().to_vec(),
            Self::Column(series) => series
                .values
                .iter()
                .enumerate()
                .map(|(index, value)| DataPoint::new(index as f64, *value))
                .collect(),
            Self::HeatMap(_) => return None,
        };
        candidates
            .into_iter()
            .enumerate()
            .filter_map(|(item_index, data)| {
                let screen = project_point(data, x_axis, y_axis)?;
                Some((item_index, data, screen))
            })
            .min_by_key(|(_, _, screen)| OrderedFloat(screen.distance_to(position)))
            .map(|(item_index, data, screen)| TrackerHit {
                series_index,
                series_title: self.title().map(str::to_owned),
                item_index,
                data,
                position: screen,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::axis::AxisPosition;

    fn axes() -> Vec<Axis> {
        vec![Axis::linear(AxisPosition::Bottom), Axis::linear(AxisPosition::Left)]
    }

    #[test]
    fn line_extents_skip_unplottable_points() {
        let series: Series = LineSeries::new(vec![
            DataPoint::new(0.0, 1.0),
            DataPoint::new(1.0, 1e40),
            DataPoint::new(f64::NAN, 2.0),
            DataPoint::new(2.0, 3.0),
        ])
        .into();
        let mut axes = axes();
        series.include_extents(&mut axes, SeriesAxes { x: 0, y: 1, color: None });
        assert_eq!(axes[0].data_range, Some((0.0, 2.0)));
        assert_eq!(axes[1].data_range, Some((1.0, 3.0)));
    }

    #[test]
    fn data_source_is_pulled_on_update() {
        let mut series: Series =
            LineSeries::from_source(DataSource::new(|| vec![DataPoint::new(1.0, 2.0)])).into();
        assert!(series.points().is_empty());
        series.update_data();
        assert_eq!(series.points(), &[DataPoint::new(1.0, 2.0)]);
    }

    #[test]
    fn heat_map_cells_are_centered_on_grid_coordinates() {
        let series = HeatMapSeries::new(0.0, 6.0, 0.0, 4.0, vec![vec![0.0; 5]; 7]);
        assert_eq!(series.cell_bounds(0, 0), (-0.5, 0.5, -0.5, 0.5));
        assert_eq!(series.cell_bounds(6, 4), (5.5, 6.5, 3.5, 4.5));
        assert_eq!(series.grid_bounds(), (-0.5, 6.5, -0.5, 4.5));
    }

    #[test]
    fn single_column_heat_map_is_one_unit_wide() {
        let series = HeatMapSeries::new(2.0, 2.0, 0.0, 1.0, vec![vec![1.0, 2.0]]);
        assert_eq!(series.cell_bounds(0, 1), (1.5, 2.5, 0.5, 1.5));
        assert_eq!(series.grid_bounds(), (1.5, 2.5, -0.5, 1.5));
    }

    #[test]
    fn heat_map_extents_cover_outer_cell_edges() {
        let series: Series =
            HeatMapSeries::new(0.0, 4.0, 10.0, 20.0, vec![vec![0.0; 3]; 5]).into();
        let mut axes = axes();
        series.include_extents(&mut axes, SeriesAxes { x: 0, y: 1, color: None });
        assert_eq!(axes[0].data_range, Some((-0.5, 4.5)));
        assert_eq!(axes[1].data_range, Some((7.5, 22.5)));
    }

    #[test]
    fn tracker_text_includes_title() {
        let hit = TrackerHit {
            series_index: 0,
            series_title: Some("temp".to_owned()),
            item_index: 2,
            data: DataPoint::new(1.5, 2.0),
            position: ScreenPoint::new(0.0, 0.0),
        };
        assert_eq!(hit.text(), "temp\nX: 1.5\nY: 2");
    }
}
