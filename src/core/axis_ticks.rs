use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::axis::{Axis, AxisKind, Orientation};
use crate::core::primitives::unix_seconds_to_datetime;

pub const AXIS_HORIZONTAL_TARGET_SPACING_PX: f64 = 60.0;
pub const AXIS_VERTICAL_TARGET_SPACING_PX: f64 = 40.0;
pub const AXIS_CATEGORY_MIN_SPACING_PX: f64 = 14.0;
/// Upper bound on ticks generated for one axis, whatever the range.
pub const MAX_TICKS_PER_AXIS: usize = 1000;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// One major tick: data value, screen coordinate along the axis and label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub value: f64,
    pub screen: f64,
    pub label: String,
}

#[must_use]
pub fn axis_tick_target_count(
    axis_span_px: f64,
    target_spacing_px: f64,
    min_ticks: usize,
    max_ticks: usize,
) -> usize {
    if !axis_span_px.is_finite() || axis_span_px <= 0.0 {
        return min_ticks;
    }
    if !target_spacing_px.is_finite() || target_spacing_px <= 0.0 {
        return min_ticks;
    }

    let raw = (axis_span_px / target_spacing_px).floor() as usize + 1;
    raw.clamp(min_ticks, max_ticks)
}

/// Smallest step of the form {1, 2, 2.5, 5} × 10ⁿ that is at least `raw_step`.
#[must_use]
pub fn nice_step(raw_step: f64) -> f64 {
    if !raw_step.is_finite() || raw_step <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;
    let nice = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|candidate| normalized <= *candidate + 1e-9)
        .unwrap_or(10.0);
    nice * magnitude
}

/// Drops ticks closer than `min_spacing_px` to the previously kept one. The
/// last tick replaces its predecessor when that keeps spacing.
#[must_use]
pub fn select_ticks_with_min_spacing(mut ticks: Vec<AxisTick>, min_spacing_px: f64) -> Vec<AxisTick> {
    ticks.sort_by(|left, right| left.screen.total_cmp(&right.screen));
    if ticks.len() <= 1 || !min_spacing_px.is_finite() || min_spacing_px <= 0.0 {
        return ticks;
    }

    let mut iter = ticks.into_iter();
    let Some(first) = iter.next() else {
        return Vec::new();
    };
    let mut selected = vec![first];
    let mut last_skipped: Option<AxisTick> = None;

    for tick in iter {
        let previous = selected.last().map_or(f64::NEG_INFINITY, |tick| tick.screen);
        if tick.screen - previous >= min_spacing_px {
            selected.push(tick);
            last_skipped = None;
        } else {
            last_skipped = Some(tick);
        }
    }

    if let Some(last_tick) = last_skipped {
        if selected.len() == 1 {
            // On very narrow axes a single label is clearer than overlapping pairs.
            selected[0] = last_tick;
        } else {
            let penultimate = selected[selected.len() - 2].screen;
            if last_tick.screen - penultimate >= min_spacing_px {
                let last_index = selected.len() - 1;
                selected[last_index] = last_tick;
            }
        }
    }

    selected
}

/// Formats `value` with as many decimals as `step` needs.
#[must_use]
pub fn format_number(value: f64, step: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-5..1e15).contains(&magnitude) {
        return format!("{value:e}");
    }
    let decimals = if step.is_finite() && step > 0.0 {
        (-step.log10().floor()).clamp(0.0, 12.0) as usize
    } else {
        0
    };
    let text = format!("{value:.decimals$}");
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    } else {
        text
    };
    if text == "-0" { "0".to_owned() } else { text }
}

/// Formats a unix-seconds value; the pattern follows the visible span.
#[must_use]
pub fn format_date_time(seconds: f64, span_seconds: f64) -> String {
    let Some(time) = unix_seconds_to_datetime(seconds) else {
        return format_number(seconds, 1.0);
    };
    date_time_label(time, span_seconds)
}

fn date_time_label(time: DateTime<Utc>, span_seconds: f64) -> String {
    let pattern = if span_seconds >= 2.0 * SECONDS_PER_DAY {
        "%Y-%m-%d"
    } else if span_seconds >= 120.0 {
        "%H:%M"
    } else {
        "%H:%M:%S"
    };
    time.format(pattern).to_string()
}

fn date_time_step(raw_step: f64) -> f64 {
    const STEPS: [f64; 14] = [
        1.0, 2.0, 5.0, 10.0, 15.0, 30.0, 60.0, 300.0, 900.0, 1800.0, 3600.0, 6.0 * 3600.0,
        12.0 * 3600.0, SECONDS_PER_DAY,
    ];
    if raw_step > SECONDS_PER_DAY {
        return nice_step(raw_step / SECONDS_PER_DAY) * SECONDS_PER_DAY;
    }
    STEPS
        .into_iter()
        .find(|step| *step >= raw_step)
        .unwrap_or(SECONDS_PER_DAY)
}

/// Values `k * step` inside `[min, max]`, widening the step so at most
/// [`MAX_TICKS_PER_AXIS`] are produced.
fn stepped_values(min: f64, max: f64, mut step: f64) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) || step <= 0.0 || max < min {
        return Vec::new();
    }
    while (max - min) / step > MAX_TICKS_PER_AXIS as f64 {
        step *= 2.0;
    }
    let first = (min / step).ceil();
    let last = (max / step).floor();
    if !first.is_finite() || !last.is_finite() || last < first {
        return Vec::new();
    }
    let count = ((last - first) as usize + 1).min(MAX_TICKS_PER_AXIS);
    (0..count)
        .map(|index| {
            let value = (first + index as f64) * step;
            if value.abs() < step * 1e-9 { 0.0 } else { value }
        })
        .collect()
}

fn target_spacing(orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Vertical => AXIS_VERTICAL_TARGET_SPACING_PX,
        _ => AXIS_HORIZONTAL_TARGET_SPACING_PX,
    }
}

/// Major ticks of `axis` for its current range and screen extent.
#[must_use]
pub fn generate_ticks(axis: &Axis) -> Vec<AxisTick> {
    let (min, max) = axis.actual_range();
    let layout = axis.layout();
    let length = (layout.screen_end - layout.screen_start).abs();
    let count = axis_tick_target_count(length, target_spacing(axis.orientation()), 2, MAX_TICKS_PER_AXIS);
    let span = max - min;

    let ticks: Vec<AxisTick> = match axis.kind() {
        AxisKind::Linear | AxisKind::LinearColor { .. } => {
            let step = nice_step(span / count.saturating_sub(1).max(1) as f64);
            stepped_values(min, max, step)
                .into_iter()
                .map(|value| (value, format_number(value, step)))
                .filter_map(|(value, label)| tick_at(axis, value, label))
                .collect()
        }
        AxisKind::DateTime => {
            let step = date_time_step(span / count.saturating_sub(1).max(1) as f64);
            stepped_values(min, max, step)
                .into_iter()
                .filter_map(|value| tick_at(axis, value, format_date_time(value, span)))
                .collect()
        }
        AxisKind::Logarithmic { base } => logarithmic_ticks(axis, *base, count),
        AxisKind::Category { labels, .. } => {
            let first = min.ceil().max(0.0);
            let last = max.floor().min(labels.len() as f64 - 1.0);
            let ticks = if last >= first {
                let count = ((last - first) as usize + 1).min(MAX_TICKS_PER_AXIS);
                (0..count)
                    .filter_map(|offset| {
                        let index = first as usize + offset;
                        let label = labels.get(index).cloned().unwrap_or_default();
                        tick_at(axis, index as f64, label)
                    })
                    .collect()
            } else {
                Vec::new()
            };
            return select_ticks_with_min_spacing(ticks, AXIS_CATEGORY_MIN_SPACING_PX);
        }
    };
    ticks
}

fn logarithmic_ticks(axis: &Axis, base: f64, target_count: usize) -> Vec<AxisTick> {
    let (min, max) = axis.actual_range();
    if !(base.is_finite() && base > 1.0 && min > 0.0 && max > min) {
        return Vec::new();
    }
    let first = (min.log(base) - 1e-9).ceil();
    let last = (max.log(base) + 1e-9).floor();
    if !first.is_finite() || !last.is_finite() {
        return Vec::new();
    }
    let decades = (last - first + 1.0).max(0.0);
    if decades < 2.0 {
        let step = nice_step((max - min) / target_count.saturating_sub(1).max(1) as f64);
        return stepped_values(min, max, step)
            .into_iter()
            .filter(|value| *value > 0.0)
            .filter_map(|value| tick_at(axis, value, format_number(value, step)))
            .collect();
    }
    let stride = (decades / target_count.max(1) as f64).ceil().max(1.0);
    stepped_values(first, last, stride)
        .into_iter()
        .filter_map(|exponent| {
            let value = base.powi(exponent as i32);
            tick_at(axis, value, format_number(value, value))
        })
        .collect()
}

fn tick_at(axis: &Axis, value: f64, label: String) -> Option<AxisTick> {
    let screen = axis.axis_transform().try_transform(value)?;
    Some(AxisTick {
        value,
        screen,
        label,
    })
}
