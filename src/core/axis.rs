use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::transform::{AxisTransform, ScaleMapping};
use crate::render::Color;

/// Data values beyond this magnitude are unplottable by default.
pub const DEFAULT_FILTER_LIMIT: f64 = 1e30;
/// Fraction of the data span added below and above auto-scaled ranges.
pub const DEFAULT_PADDING: f64 = 0.01;
/// Range used when no series binds to an axis.
pub const DEFAULT_RANGE: (f64, f64) = (0.0, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxisPosition {
    Left,
    #[default]
    Bottom,
    Right,
    Top,
    /// Not laid out in the plot area (color axes).
    None,
}

impl AxisPosition {
    #[must_use]
    pub fn orientation(self) -> Orientation {
        match self {
            Self::Left | Self::Right => Orientation::Vertical,
            Self::Bottom | Self::Top => Orientation::Horizontal,
            Self::None => Orientation::Unpositioned,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Unpositioned,
}

/// Ordered color ramp used by color axes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    #[must_use]
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// `count` colors interpolated through the given stops.
    #[must_use]
    pub fn interpolate(count: usize, stops: &[Color]) -> Self {
        if stops.is_empty() || count == 0 {
            return Self::new(Vec::new());
        }
        if stops.len() == 1 || count == 1 {
            return Self::new(vec![stops[0]; count]);
        }
        let colors = (0..count)
            .map(|index| {
                let t = index as f64 / (count - 1) as f64 * (stops.len() - 1) as f64;
                let lower = (t.floor() as usize).min(stops.len() - 2);
                stops[lower].lerp(stops[lower + 1], t - lower as f64)
            })
            .collect();
        Self::new(colors)
    }

    /// Black → red → yellow → white ramp.
    #[must_use]
    pub fn hot(count: usize) -> Self {
        Self::interpolate(
            count,
            &[
                Color::BLACK,
                Color::rgb(1.0, 0.0, 0.0),
                Color::rgb(1.0, 1.0, 0.0),
                Color::WHITE,
            ],
        )
    }

    #[must_use]
    pub fn blue_white_red(count: usize) -> Self {
        Self::interpolate(
            count,
            &[Color::rgb(0.0, 0.0, 1.0), Color::WHITE, Color::rgb(1.0, 0.0, 0.0)],
        )
    }

    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::hot(64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AxisKind {
    Linear,
    Logarithmic { base: f64 },
    /// Values are category indices `0..labels.len()`.
    Category { labels: Vec<String>, gap_width: f64 },
    /// Values are unix seconds.
    DateTime,
    LinearColor { palette: Palette },
}

impl AxisKind {
    #[must_use]
    pub fn mapping(&self) -> ScaleMapping {
        match self {
            Self::Logarithmic { base } => ScaleMapping::Logarithmic { base: *base },
            _ => ScaleMapping::Linear,
        }
    }

    #[must_use]
    pub fn is_category(&self) -> bool {
        matches!(self, Self::Category { .. })
    }

    #[must_use]
    pub fn is_color(&self) -> bool {
        matches!(self, Self::LinearColor { .. })
    }
}

/// Placement computed by the axis manager for one pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisLayout {
    /// Distance between the plot-area edge and this axis' line.
    pub edge_offset: f64,
    /// Space reserved for ticks, labels and title.
    pub desired_size: f64,
    pub screen_start: f64,
    pub screen_end: f64,
}

/// One axis: logical range, pan/zoom state and the derived transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub(crate) key: Option<String>,
    pub(crate) position: AxisPosition,
    pub(crate) kind: AxisKind,
    pub(crate) title: Option<String>,
    pub(crate) minimum: Option<f64>,
    pub(crate) maximum: Option<f64>,
    pub(crate) absolute_minimum: f64,
    pub(crate) absolute_maximum: f64,
    pub(crate) minimum_padding: f64,
    pub(crate) maximum_padding: f64,
    pub(crate) minimum_range: f64,
    pub(crate) filter_min_value: f64,
    pub(crate) filter_max_value: f64,
    pub(crate) zoom_enabled: bool,
    pub(crate) pan_enabled: bool,
    pub(crate) is_visible: bool,
    pub(crate) show_major_gridlines: bool,
    pub(crate) font_size: f64,
    pub(crate) tick_length: f64,
    pub(crate) implicit: bool,
    #[serde(skip)]
    pub(crate) view_range: Option<(f64, f64)>,
    #[serde(skip)]
    pub(crate) data_range: Option<(f64, f64)>,
    #[serde(skip)]
    pub(crate) actual_minimum: f64,
    #[serde(skip)]
    pub(crate) actual_maximum: f64,
    #[serde(skip)]
    pub(crate) layout: AxisLayout,
    #[serde(skip)]
    pub(crate) transform: AxisTransform,
}

impl Axis {
    #[must_use]
    pub fn new(position: AxisPosition, kind: AxisKind) -> Self {
        let mut axis = Self {
            key: None,
            position,
            kind,
            title: None,
            minimum: None,
            maximum: None,
            absolute_minimum: f64::NEG_INFINITY,
            absolute_maximum: f64::INFINITY,
            minimum_padding: DEFAULT_PADDING,
            maximum_padding: DEFAULT_PADDING,
            minimum_range: 0.0,
            filter_min_value: -DEFAULT_FILTER_LIMIT,
            filter_max_value: DEFAULT_FILTER_LIMIT,
            zoom_enabled: true,
            pan_enabled: true,
            is_visible: true,
            show_major_gridlines: true,
            font_size: 12.0,
            tick_length: 4.0,
            implicit: false,
            view_range: None,
            data_range: None,
            actual_minimum: DEFAULT_RANGE.0,
            actual_maximum: DEFAULT_RANGE.1,
            layout: AxisLayout::default(),
            transform: AxisTransform::default(),
        };
        if axis.kind.is_category() {
            axis.minimum_padding = 0.0;
            axis.maximum_padding = 0.0;
            axis.show_major_gridlines = false;
        }
        if axis.kind.is_color() {
            axis.position = AxisPosition::None;
        }
        axis.update_transform();
        axis
    }

    #[must_use]
    pub fn linear(position: AxisPosition) -> Self {
        Self::new(position, AxisKind::Linear)
    }

    #[must_use]
    pub fn logarithmic(position: AxisPosition, base: f64) -> Self {
        let mut axis = Self::new(position, AxisKind::Logarithmic { base });
        axis.filter_min_value = 0.0;
        axis
    }

    #[must_use]
    pub fn category<S: Into<String>>(position: AxisPosition, labels: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            position,
            AxisKind::Category {
                labels: labels.into_iter().map(Into::into).collect(),
                gap_width: 1.0,
            },
        )
    }

    #[must_use]
    pub fn date_time(position: AxisPosition) -> Self {
        Self::new(position, AxisKind::DateTime)
    }

    #[must_use]
    pub fn linear_color(palette: Palette) -> Self {
        Self::new(AxisPosition::None, AxisKind::LinearColor { palette })
    }

    pub(crate) fn implicit_default(position: AxisPosition) -> Self {
        let mut axis = Self::linear(position);
        axis.implicit = true;
        axis
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Fixes the logical range instead of auto-scaling it.
    #[must_use]
    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    #[must_use]
    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    #[must_use]
    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Hard bounds that pan and zoom never cross.
    #[must_use]
    pub fn with_absolute_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.absolute_minimum = minimum;
        self.absolute_maximum = maximum;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, minimum_padding: f64, maximum_padding: f64) -> Self {
        self.minimum_padding = minimum_padding.max(0.0);
        self.maximum_padding = maximum_padding.max(0.0);
        self
    }

    #[must_use]
    pub fn with_minimum_range(mut self, minimum_range: f64) -> Self {
        self.minimum_range = minimum_range.max(0.0);
        self
    }

    /// Values outside `(minimum, maximum)` are treated as unplottable.
    #[must_use]
    pub fn with_filter_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.filter_min_value = minimum;
        self.filter_max_value = maximum;
        self
    }

    #[must_use]
    pub fn with_zoom_enabled(mut self, enabled: bool) -> Self {
        self.zoom_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_pan_enabled(mut self, enabled: bool) -> Self {
        self.pan_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    #[must_use]
    pub fn with_major_gridlines(mut self, show: bool) -> Self {
        self.show_major_gridlines = show;
        self
    }

    #[must_use]
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    #[must_use]
    pub fn position(&self) -> AxisPosition {
        self.position
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.position.orientation()
    }

    #[must_use]
    pub fn kind(&self) -> &AxisKind {
        &self.kind
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.is_visible
    }

    #[must_use]
    pub fn is_implicit(&self) -> bool {
        self.implicit
    }

    #[must_use]
    pub fn zoom_enabled(&self) -> bool {
        self.zoom_enabled
    }

    #[must_use]
    pub fn pan_enabled(&self) -> bool {
        self.pan_enabled
    }

    #[must_use]
    pub fn absolute_range(&self) -> (f64, f64) {
        (self.absolute_minimum, self.absolute_maximum)
    }

    /// Range in effect for the current pass.
    #[must_use]
    pub fn actual_range(&self) -> (f64, f64) {
        (self.actual_minimum, self.actual_maximum)
    }

    /// Range set by pan/zoom, if any.
    #[must_use]
    pub fn view_range(&self) -> Option<(f64, f64)> {
        self.view_range
    }

    #[must_use]
    pub fn layout(&self) -> AxisLayout {
        self.layout
    }

    #[must_use]
    pub fn axis_transform(&self) -> AxisTransform {
        self.transform
    }

    pub fn set_range(&mut self, minimum: Option<f64>, maximum: Option<f64>) {
        self.minimum = minimum;
        self.maximum = maximum;
        self.coerce_actual_range();
    }

    /// `true` when `value` can be mapped on this axis.
    #[must_use]
    pub fn is_valid_value(&self, value: f64) -> bool {
        value.is_finite()
            && value > self.filter_min_value
            && value < self.filter_max_value
            && self.kind.mapping().to_linear(value).is_finite()
    }

    #[must_use]
    pub fn transform(&self, value: f64) -> f64 {
        self.transform.transform(value)
    }

    #[must_use]
    pub fn inverse_transform(&self, screen: f64) -> f64 {
        self.transform.inverse_transform(screen)
    }

    /// `None` for unplottable values; never panics on degenerate input.
    #[must_use]
    pub fn try_transform(&self, value: f64) -> Option<f64> {
        if !self.is_valid_value(value) {
            return None;
        }
        self.transform.try_transform(value)
    }

    /// Color for `value` on a color axis; `None` on other kinds.
    #[must_use]
    pub fn color_for(&self, value: f64) -> Option<Color> {
        let AxisKind::LinearColor { palette } = &self.kind else {
            return None;
        };
        if palette.is_empty() || !value.is_finite() {
            return None;
        }
        let span = self.actual_maximum - self.actual_minimum;
        let t = if span > 0.0 {
            ((value - self.actual_minimum) / span).clamp(0.0, 1.0)
        } else {
            0.5
        };
        let index = ((t * palette.len() as f64) as usize).min(palette.len() - 1);
        Some(palette.colors()[index])
    }

    pub(crate) fn reset_data_range(&mut self) {
        self.data_range = None;
    }

    pub(crate) fn include_data_value(&mut self, value: f64) {
        if !self.is_valid_value(value) {
            return;
        }
        self.data_range = Some(match self.data_range {
            Some((min, max)) => (min.min(value), max.max(value)),
            None => (value, value),
        });
    }

    pub(crate) fn include_data_range(&mut self, minimum: f64, maximum: f64) {
        self.include_data_value(minimum);
        self.include_data_value(maximum);
    }

    fn padded_data_range(&self, category_count: usize) -> (f64, f64) {
        if self.kind.is_category() {
            let count = category_count.max(1) as f64;
            return (-0.5, count - 0.5);
        }
        let Some((min, max)) = self.data_range else {
            return DEFAULT_RANGE;
        };
        let mapping = self.kind.mapping();
        let (a0, a1) = (mapping.to_linear(min), mapping.to_linear(max));
        let (a0, a1) = if a1 - a0 > 0.0 {
            (a0, a1)
        } else if a0 == 0.0 {
            (a0 - 1.0, a1 + 1.0)
        } else {
            (a0 - a0.abs() * 0.01, a1 + a1.abs() * 0.01)
        };
        let span = a1 - a0;
        let padded_min = a0 - self.minimum_padding * span;
        let padded_max = a1 + self.maximum_padding * span;
        (mapping.from_linear(padded_min), mapping.from_linear(padded_max))
    }

    /// Recomputes the actual range from view override, explicit range, data
    /// extent and absolute clamps, then rebuilds the transform.
    pub(crate) fn coerce_actual_range_with_categories(&mut self, category_count: usize) {
        let (auto_min, auto_max) = self.padded_data_range(category_count);
        let (mut min, mut max) = match self.view_range {
            Some(range) => range,
            None => (
                self.minimum.unwrap_or(auto_min),
                self.maximum.unwrap_or(auto_max),
            ),
        };

        if !min.is_finite() || !max.is_finite() {
            (min, max) = DEFAULT_RANGE;
        }
        if max < min {
            std::mem::swap(&mut min, &mut max);
        }
        if max == min {
            let delta = if min == 0.0 { 1.0 } else { min.abs() * 0.01 };
            min -= delta;
            max += delta;
        }
        if self.absolute_minimum.is_finite() {
            min = min.max(self.absolute_minimum);
        }
        if self.absolute_maximum.is_finite() {
            max = max.min(self.absolute_maximum);
        }
        if max <= min {
            min = if self.absolute_minimum.is_finite() { self.absolute_minimum } else { DEFAULT_RANGE.0 };
            max = if self.absolute_maximum.is_finite() { self.absolute_maximum } else { min + 1.0 };
        }

        self.actual_minimum = min;
        self.actual_maximum = max;
        self.update_transform();
    }

    pub(crate) fn coerce_actual_range(&mut self) {
        let categories = match &self.kind {
            AxisKind::Category { labels, .. } => labels.len(),
            _ => 0,
        };
        self.coerce_actual_range_with_categories(categories);
    }

    pub(crate) fn set_screen_extent(&mut self, screen_start: f64, screen_end: f64) {
        self.layout.screen_start = screen_start;
        self.layout.screen_end = screen_end;
        self.update_transform();
    }

    /// Rebuilds (scale, offset) from the actual range and screen extent.
    pub(crate) fn update_transform(&mut self) {
        self.transform = AxisTransform::from_extent(
            self.actual_minimum,
            self.actual_maximum,
            self.layout.screen_start,
            self.layout.screen_end,
            self.kind.mapping(),
        );
    }

    fn linear_range(&self) -> (f64, f64) {
        let mapping = self.kind.mapping();
        (
            mapping.to_linear(self.actual_minimum),
            mapping.to_linear(self.actual_maximum),
        )
    }

    fn linear_absolute_range(&self) -> (f64, f64) {
        let mapping = self.kind.mapping();
        let min = mapping.to_linear(self.absolute_minimum);
        let max = mapping.to_linear(self.absolute_maximum);
        (
            if min.is_nan() { f64::NEG_INFINITY } else { min },
            if max.is_nan() { f64::INFINITY } else { max },
        )
    }

    fn apply_linear_view(&mut self, min: f64, max: f64) -> bool {
        let mapping = self.kind.mapping();
        let (new_min, new_max) = (mapping.from_linear(min), mapping.from_linear(max));
        if !new_min.is_finite() || !new_max.is_finite() || new_max <= new_min {
            return false;
        }
        self.view_range = Some((new_min, new_max));
        self.coerce_actual_range();
        true
    }

    /// Moves the content so the value under `previous` ends up under
    /// `current` (screen coordinates along this axis).
    pub fn pan(&mut self, previous: f64, current: f64) -> bool {
        if !self.pan_enabled {
            return false;
        }
        let scale = self.transform.scale();
        let shift = (previous - current) / scale;
        if !shift.is_finite() {
            return false;
        }
        let (a0, a1) = self.linear_range();
        let (abs_min, abs_max) = self.linear_absolute_range();
        let (mut min, mut max) = (a0 + shift, a1 + shift);
        if min < abs_min {
            max += abs_min - min;
            min = abs_min;
        }
        if max > abs_max {
            min -= max - abs_max;
            max = abs_max;
        }
        min = min.max(abs_min);
        trace!(shift, min, max, "pan axis");
        self.apply_linear_view(min, max)
    }

    /// Pans by a screen delta; positive deltas move the content towards
    /// increasing screen coordinates.
    pub fn pan_by(&mut self, screen_delta: f64) -> bool {
        self.pan(0.0, screen_delta)
    }

    /// Zooms by `factor` (> 1 zooms in) keeping the value under
    /// `screen_coordinate` fixed.
    pub fn zoom_at(&mut self, factor: f64, screen_coordinate: f64) -> bool {
        if !self.zoom_enabled || !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let anchor = self.transform.linear_at(screen_coordinate);
        if !anchor.is_finite() {
            return false;
        }
        let (a0, a1) = self.linear_range();
        let min = (a0 - anchor) / factor + anchor;
        let max = (a1 - anchor) / factor + anchor;
        self.zoom_linear(min, max, anchor)
    }

    /// Sets an explicit view range in data units.
    pub fn zoom(&mut self, minimum: f64, maximum: f64) -> bool {
        if !self.zoom_enabled {
            return false;
        }
        let mapping = self.kind.mapping();
        let (min, max) = (mapping.to_linear(minimum), mapping.to_linear(maximum));
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.zoom_linear(min, max, (min + max) * 0.5)
    }

    /// Applies a linear view range. A range narrower than `minimum_range` is
    /// widened so `anchor` keeps its relative position inside it.
    fn zoom_linear(&mut self, mut min: f64, mut max: f64, anchor: f64) -> bool {
        if !min.is_finite() || !max.is_finite() {
            return false;
        }
        let minimum_range = self.minimum_range;
        if minimum_range > 0.0 && max - min < minimum_range {
            let span = max - min;
            let ratio = if span > 0.0 {
                ((anchor - min) / span).clamp(0.0, 1.0)
            } else {
                0.5
            };
            min = anchor - minimum_range * ratio;
            max = min + minimum_range;
        }
        let (abs_min, abs_max) = self.linear_absolute_range();
        min = min.max(abs_min);
        max = max.min(abs_max);
        trace!(min, max, "zoom axis");
        self.apply_linear_view(min, max)
    }

    /// Drops any pan/zoom override.
    pub fn reset(&mut self) {
        self.view_range = None;
        self.coerce_actual_range();
    }
}
