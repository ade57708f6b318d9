use indexmap::IndexMap;
use tracing::trace;

use crate::core::axis::{Axis, AxisKind, AxisPosition, Orientation, Palette};
use crate::core::axis_ticks::generate_ticks;
use crate::core::series::{Series, SeriesAxes};
use crate::core::types::{ScreenRect, Thickness};
use crate::error::{PlotError, PlotResult};
use crate::render::{FontSpec, TextSize};

/// Gap between tick marks and labels, and between labels and title.
pub const AXIS_LABEL_SPACING: f64 = 4.0;

/// Which kind of axis a series slot needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisRole {
    Horizontal,
    Vertical,
    Color,
}

impl AxisRole {
    /// Role an axis can fill; `None` for unpositioned non-color axes.
    #[must_use]
    pub fn of(axis: &Axis) -> Option<Self> {
        if axis.kind().is_color() {
            return Some(Self::Color);
        }
        match axis.orientation() {
            Orientation::Horizontal => Some(Self::Horizontal),
            Orientation::Vertical => Some(Self::Vertical),
            Orientation::Unpositioned => None,
        }
    }
}

/// Key index and default axes of one model, rebuilt every pass.
#[derive(Debug, Clone, Default)]
pub struct AxisManager {
    key_index: IndexMap<String, usize>,
    default_horizontal: Option<usize>,
    default_vertical: Option<usize>,
    default_color: Option<usize>,
}

impl AxisManager {
    /// Adds defaults for missing roles: a bottom and a left linear axis, plus
    /// a color axis when a series needs one. Implicit axes are kept across
    /// passes, with their pan/zoom state, until an explicit axis takes over
    /// their role.
    pub fn ensure_default_axes(axes: &mut Vec<Axis>, needs_color_axis: bool) {
        let explicit = |axes: &[Axis], role: AxisRole| {
            axes.iter()
                .any(|axis| !axis.is_implicit() && AxisRole::of(axis) == Some(role))
        };
        let covered = [AxisRole::Horizontal, AxisRole::Vertical, AxisRole::Color]
            .map(|role| explicit(axes.as_slice(), role));
        axes.retain(|axis| {
            if !axis.is_implicit() {
                return true;
            }
            match AxisRole::of(axis) {
                Some(AxisRole::Horizontal) => !covered[0],
                Some(AxisRole::Vertical) => !covered[1],
                Some(AxisRole::Color) => needs_color_axis && !covered[2],
                None => false,
            }
        });

        let has = |axes: &[Axis], role: AxisRole| axes.iter().any(|axis| AxisRole::of(axis) == Some(role));
        if !has(axes.as_slice(), AxisRole::Horizontal) {
            axes.push(Axis::implicit_default(AxisPosition::Bottom));
        }
        if !has(axes.as_slice(), AxisRole::Vertical) {
            axes.push(Axis::implicit_default(AxisPosition::Left));
        }
        if needs_color_axis && !has(axes.as_slice(), AxisRole::Color) {
            let mut axis = Axis::linear_color(Palette::default());
            axis.implicit = true;
            axes.push(axis);
        }
    }

    /// Indexes `axes` by key; duplicate keys are a configuration error.
    pub fn from_axes(axes: &[Axis]) -> PlotResult<Self> {
        let mut manager = Self::default();
        for (index, axis) in axes.iter().enumerate() {
            if let Some(key) = axis.key() {
                if manager.key_index.insert(key.to_owned(), index).is_some() {
                    return Err(PlotError::DuplicateAxisKey {
                        key: key.to_owned(),
                    });
                }
            }
            let slot = match AxisRole::of(axis) {
                Some(AxisRole::Horizontal) => &mut manager.default_horizontal,
                Some(AxisRole::Vertical) => &mut manager.default_vertical,
                Some(AxisRole::Color) => &mut manager.default_color,
                None => continue,
            };
            slot.get_or_insert(index);
        }
        Ok(manager)
    }

    /// `None` resolves to the first axis of the role; an absent key fails.
    pub fn resolve_axis(&self, key: Option<&str>, role: AxisRole) -> PlotResult<usize> {
        if let Some(key) = key {
            return self
                .key_index
                .get(key)
                .copied()
                .ok_or_else(|| PlotError::UnknownAxisKey { key: key.to_owned() });
        }
        let default = match role {
            AxisRole::Horizontal => self.default_horizontal,
            AxisRole::Vertical => self.default_vertical,
            AxisRole::Color => self.default_color,
        };
        default.ok_or_else(|| PlotError::UnknownAxisKey {
            key: format!("<default {role:?} axis>"),
        })
    }

    /// Binds a series to its axes.
    pub fn series_axes(&self, series: &Series) -> PlotResult<SeriesAxes> {
        let common = series.common();
        let x = self.resolve_axis(common.x_axis_key.as_deref(), AxisRole::Horizontal)?;
        let y = self.resolve_axis(common.y_axis_key.as_deref(), AxisRole::Vertical)?;
        let color = if series.needs_color_axis() {
            Some(self.resolve_axis(series.color_axis_key(), AxisRole::Color)?)
        } else {
            None
        };
        Ok(SeriesAxes { x, y, color })
    }

    pub fn annotation_axes(&self, x_key: Option<&str>, y_key: Option<&str>) -> PlotResult<SeriesAxes> {
        Ok(SeriesAxes {
            x: self.resolve_axis(x_key, AxisRole::Horizontal)?,
            y: self.resolve_axis(y_key, AxisRole::Vertical)?,
            color: None,
        })
    }

    /// Unions the extents of every bound visible series into its axes, then
    /// coerces each axis' actual range.
    pub fn resolve_ranges(
        &self,
        axes: &mut [Axis],
        series: &[Series],
        bindings: &[SeriesAxes],
    ) {
        let mut category_counts = vec![0usize; axes.len()];
        for axis in axes.iter_mut() {
            axis.reset_data_range();
        }
        for (series, binding) in series.iter().zip(bindings) {
            if !series.is_visible() {
                continue;
            }
            series.include_extents(axes, *binding);
            category_counts[binding.x] = category_counts[binding.x].max(series.category_count());
        }
        for (axis, series_categories) in axes.iter_mut().zip(category_counts) {
            let labels = match axis.kind() {
                AxisKind::Category { labels, .. } => labels.len(),
                _ => 0,
            };
            axis.coerce_actual_range_with_categories(labels.max(series_categories));
            trace!(
                key = axis.key().unwrap_or("<default>"),
                min = axis.actual_range().0,
                max = axis.actual_range().1,
                "resolved axis range"
            );
        }
    }

    /// Lays axes around the plot area and gives each its screen extent.
    ///
    /// Returns the plot area: `bounds` minus padding, the title block and the
    /// stacked size of every visible positioned axis.
    pub fn assign_screen_extents<M>(
        &self,
        axes: &mut [Axis],
        bounds: ScreenRect,
        padding: Thickness,
        title_height: f64,
        mut measure: M,
    ) -> PlotResult<ScreenRect>
    where
        M: FnMut(&str, &FontSpec) -> PlotResult<TextSize>,
    {
        let outer = bounds.deflate(
            padding.left,
            padding.top + title_height,
            padding.right,
            padding.bottom,
        );

        // First pass: provisional extents so ticks (and label sizes) exist.
        for axis in axes.iter_mut() {
            set_extent(axis, outer);
        }

        let mut stacked = [0.0_f64; 4];
        for axis in axes.iter_mut() {
            let slot = match axis.position() {
                AxisPosition::Left => 0,
                AxisPosition::Top => 1,
                AxisPosition::Right => 2,
                AxisPosition::Bottom => 3,
                AxisPosition::None => continue,
            };
            if !axis.is_visible() {
                axis.layout.desired_size = 0.0;
                axis.layout.edge_offset = stacked[slot];
                continue;
            }
            let desired = desired_size(axis, &mut measure)?;
            axis.layout.edge_offset = stacked[slot];
            axis.layout.desired_size = desired;
            stacked[slot] += desired;
        }

        let plot_area = outer.deflate(stacked[0], stacked[1], stacked[2], stacked[3]);
        for axis in axes.iter_mut() {
            set_extent(axis, plot_area);
        }
        trace!(
            left = plot_area.left,
            top = plot_area.top,
            width = plot_area.width,
            height = plot_area.height,
            "assigned plot area"
        );
        Ok(plot_area)
    }
}

fn set_extent(axis: &mut Axis, area: ScreenRect) {
    match axis.orientation() {
        Orientation::Horizontal => axis.set_screen_extent(area.left, area.right()),
        Orientation::Vertical => axis.set_screen_extent(area.bottom(), area.top),
        Orientation::Unpositioned => axis.set_screen_extent(0.0, 1.0),
    }
}

fn desired_size<M>(axis: &Axis, measure: &mut M) -> PlotResult<f64>
where
    M: FnMut(&str, &FontSpec) -> PlotResult<TextSize>,
{
    let font = FontSpec::sized(axis.font_size);
    let mut label_extent = 0.0_f64;
    for tick in generate_ticks(axis) {
        let size = measure(&tick.label, &font)?;
        let extent = match axis.orientation() {
            Orientation::Vertical => size.width,
            _ => size.height,
        };
        label_extent = label_extent.max(extent);
    }
    let title_extent = match axis.title() {
        Some(title) => measure(title, &font)?.height + AXIS_LABEL_SPACING,
        None => 0.0,
    };
    Ok(axis.tick_length + AXIS_LABEL_SPACING + label_extent + title_extent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measure(text: &str, font: &FontSpec) -> PlotResult<TextSize> {
        Ok(TextSize::new(text.len() as f64 * font.size * 0.5, font.size))
    }

    #[test]
    fn defaults_are_added_once() {
        let mut axes = Vec::new();
        AxisManager::ensure_default_axes(&mut axes, false);
        AxisManager::ensure_default_axes(&mut axes, false);
        assert_eq!(axes.len(), 2);
        assert!(axes.iter().all(Axis::is_implicit));
    }

    #[test]
    fn explicit_axis_replaces_implicit_default() {
        let mut axes = Vec::new();
        AxisManager::ensure_default_axes(&mut axes, false);
        axes.push(Axis::linear(AxisPosition::Top));
        AxisManager::ensure_default_axes(&mut axes, false);
        assert_eq!(axes.len(), 2);
        assert_eq!(
            axes.iter().filter(|axis| axis.position() == AxisPosition::Top).count(),
            1
        );
    }

    #[test]
    fn implicit_axes_keep_view_state_across_passes() {
        let mut axes = Vec::new();
        AxisManager::ensure_default_axes(&mut axes, false);
        assert!(axes[0].zoom(2.0, 3.0));
        AxisManager::ensure_default_axes(&mut axes, true);
        assert_eq!(axes.len(), 3);
        assert_eq!(axes[0].view_range(), Some((2.0, 3.0)));
        AxisManager::ensure_default_axes(&mut axes, false);
        assert_eq!(axes.len(), 2);
    }

    #[test]
    fn stacked_axes_shrink_plot_area() {
        let mut axes = vec![
            Axis::linear(AxisPosition::Left),
            Axis::linear(AxisPosition::Left).with_key("second"),
            Axis::linear(AxisPosition::Bottom),
        ];
        let manager = AxisManager::from_axes(&axes).expect("index axes");
        manager.resolve_ranges(&mut axes, &[], &[]);
        let bounds = ScreenRect::new(0.0, 0.0, 400.0, 300.0);
        let area = manager
            .assign_screen_extents(&mut axes, bounds, Thickness::uniform(8.0), 0.0, measure)
            .expect("layout");
        assert!(area.left > 8.0 + axes[0].layout().desired_size);
        assert_eq!(axes[1].layout().edge_offset, axes[0].layout().desired_size);
        assert!((axes[2].transform(0.0) - area.left).abs() < 1e-9);
        assert!((axes[0].transform(0.0) - area.bottom()).abs() < 1e-9);
    }
}
