use std::sync::Arc;

use ordered_float::OrderedFloat;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::core::{
    Annotation, Axis, AxisManager, Orientation, ScreenPoint, ScreenRect, Series, SeriesAxes,
    Thickness, TrackerHit,
};
use crate::error::{PlotError, PlotResult};
use crate::render::{Color, Stroke};

/// Model handle shared between the owning application and a view.
pub type SharedPlotModel = Arc<RwLock<PlotModel>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LegendPosition {
    #[default]
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendSettings {
    pub is_visible: bool,
    pub position: LegendPosition,
    pub font_size: f64,
    pub background: Color,
    pub border: Option<Stroke>,
}

impl Default for LegendSettings {
    fn default() -> Self {
        Self {
            is_visible: true,
            position: LegendPosition::TopRight,
            font_size: 12.0,
            background: Color::WHITE.with_alpha(0.8),
            border: Some(Stroke::solid(Color::BLACK, 1.0)),
        }
    }
}

impl LegendSettings {
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            is_visible: false,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: LegendPosition) -> Self {
        self.position = position;
        self
    }
}

/// Presentation settings of a model, round-trippable through JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSettings {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub title_font_size: f64,
    pub subtitle_font_size: f64,
    pub padding: Thickness,
    pub background: Color,
    pub plot_area_border: Option<Stroke>,
    #[serde(default)]
    pub legend: LegendSettings,
}

impl Default for PlotSettings {
    fn default() -> Self {
        Self {
            title: None,
            subtitle: None,
            title_font_size: 16.0,
            subtitle_font_size: 12.0,
            padding: Thickness::default(),
            background: Color::WHITE,
            plot_area_border: Some(Stroke::solid(Color::BLACK, 1.0)),
            legend: LegendSettings::default(),
        }
    }
}

/// Declarative plot scene: axes, series, annotations and presentation
/// settings, plus state cached by the last render pass.
#[derive(Debug, Default)]
pub struct PlotModel {
    pub(super) settings: PlotSettings,
    pub(super) axes: Vec<Axis>,
    pub(super) series: Vec<Series>,
    pub(super) annotations: Vec<Annotation>,
    pub(super) last_render_error: Option<PlotError>,
    pub(super) attached_view: Option<u64>,
    pub(super) plot_area: ScreenRect,
    pub(super) series_axes: Vec<SeriesAxes>,
}

impl PlotModel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the model for sharing with a view.
    #[must_use]
    pub fn into_shared(self) -> SharedPlotModel {
        Arc::new(RwLock::new(self))
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.settings.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.settings.subtitle = Some(subtitle.into());
        self
    }

    #[must_use]
    pub fn with_padding(mut self, padding: Thickness) -> Self {
        self.settings.padding = padding;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: Color) -> Self {
        self.settings.background = background;
        self
    }

    #[must_use]
    pub fn with_plot_area_border(mut self, border: Option<Stroke>) -> Self {
        self.settings.plot_area_border = border;
        self
    }

    #[must_use]
    pub fn with_legend(mut self, legend: LegendSettings) -> Self {
        self.settings.legend = legend;
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.add_axis(axis);
        self
    }

    #[must_use]
    pub fn with_series(mut self, series: impl Into<Series>) -> Self {
        self.add_series(series);
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.add_annotation(annotation);
        self
    }

    pub fn add_axis(&mut self, axis: Axis) {
        self.axes.push(axis);
    }

    pub fn add_series(&mut self, series: impl Into<Series>) {
        self.series.push(series.into());
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    #[must_use]
    pub fn settings(&self) -> &PlotSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut PlotSettings {
        &mut self.settings
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.settings.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.settings.title = title;
    }

    /// Serializes presentation settings (not data) to pretty JSON.
    pub fn settings_json(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(&self.settings)
            .map_err(|e| PlotError::InvalidData(format!("failed to serialize settings: {e}")))
    }

    pub fn apply_settings_json(&mut self, json: &str) -> PlotResult<()> {
        let settings: PlotSettings = serde_json::from_str(json)
            .map_err(|e| PlotError::InvalidData(format!("failed to parse settings: {e}")))?;
        settings.background.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Axes including implicit defaults added by the last update.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Axis] {
        &mut self.axes
    }

    #[must_use]
    pub fn axis_by_key(&self, key: &str) -> Option<&Axis> {
        self.axes.iter().find(|axis| axis.key() == Some(key))
    }

    pub fn axis_by_key_mut(&mut self, key: &str) -> Option<&mut Axis> {
        self.axes.iter_mut().find(|axis| axis.key() == Some(key))
    }

    /// First axis of the given orientation, after defaults were added.
    #[must_use]
    pub fn default_axis(&self, orientation: Orientation) -> Option<&Axis> {
        self.axes
            .iter()
            .find(|axis| axis.orientation() == orientation && !axis.kind().is_color())
    }

    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn series_mut(&mut self) -> &mut [Series] {
        &mut self.series
    }

    pub fn clear_series(&mut self) {
        self.series.clear();
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut Vec<Annotation> {
        &mut self.annotations
    }

    /// Fault of the most recent render pass; cleared by a successful pass.
    #[must_use]
    pub fn last_render_error(&self) -> Option<&PlotError> {
        self.last_render_error.as_ref()
    }

    /// Plot area computed by the most recent render pass.
    #[must_use]
    pub fn plot_area(&self) -> ScreenRect {
        self.plot_area
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached_view.is_some()
    }

    pub(crate) fn attached_view(&self) -> Option<u64> {
        self.attached_view
    }

    pub(crate) fn attach_to(&mut self, view_id: u64) -> PlotResult<()> {
        match self.attached_view {
            Some(current) if current != view_id => Err(PlotError::ModelAlreadyAttached),
            _ => {
                self.attached_view = Some(view_id);
                Ok(())
            }
        }
    }

    pub(crate) fn detach_from(&mut self, view_id: u64) {
        if self.attached_view == Some(view_id) {
            self.attached_view = None;
        }
    }

    /// Refreshes caches before a pass: pulls series data sources when
    /// `update_data` is set and (re)creates implicit default axes.
    pub fn update(&mut self, update_data: bool) {
        if update_data {
            for series in &mut self.series {
                series.update_data();
            }
        }
        let needs_color_axis = self.series.iter().any(Series::needs_color_axis);
        AxisManager::ensure_default_axes(&mut self.axes, needs_color_axis);
    }

    /// Pans every positioned axis by a screen delta.
    pub fn pan_all(&mut self, dx: f64, dy: f64) -> bool {
        let mut changed = false;
        for axis in &mut self.axes {
            changed |= match axis.orientation() {
                Orientation::Horizontal if dx != 0.0 => axis.pan_by(dx),
                Orientation::Vertical if dy != 0.0 => axis.pan_by(dy),
                _ => false,
            };
        }
        changed
    }

    /// Zooms every positioned axis around `position`.
    pub fn zoom_all_at(&mut self, factor: f64, position: ScreenPoint) -> bool {
        let mut changed = false;
        for axis in &mut self.axes {
            changed |= match axis.orientation() {
                Orientation::Horizontal => axis.zoom_at(factor, position.x),
                Orientation::Vertical => axis.zoom_at(factor, position.y),
                Orientation::Unpositioned => false,
            };
        }
        changed
    }

    pub fn reset_all_axes(&mut self) {
        for axis in &mut self.axes {
            axis.reset();
        }
    }

    /// Nearest plottable item of any visible series, using axis bindings of
    /// the last pass.
    #[must_use]
    pub fn nearest_hit(&self, position: ScreenPoint) -> Option<TrackerHit> {
        if !self.plot_area.contains(position) {
            return None;
        }
        self.series
            .iter()
            .zip(&self.series_axes)
            .enumerate()
            .filter(|(_, (series, _))| series.is_visible())
            .filter_map(|(index, (series, binding))| {
                series.nearest_point(index, &self.axes, *binding, position)
            })
            .min_by_key(|hit| OrderedFloat(hit.position.distance_to(position)))
    }
}
