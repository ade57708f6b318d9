//! Data→screen projection of series points, polyline splitting and clipping.
//!
//! Points that cannot be mapped (NaN, infinities, values outside an axis'
//! filter range, non-positive values on logarithmic axes) break a polyline
//! into separate runs. Each run is then clipped to the plot area so that
//! backends only ever receive finite, bounded geometry.

use smallvec::SmallVec;

use crate::core::axis::Axis;
use crate::core::types::{DataPoint, ScreenPoint, ScreenRect};

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

/// Series larger than this are projected in parallel when the
/// `parallel-projection` feature is enabled.
pub const PARALLEL_PROJECTION_THRESHOLD: usize = 10_000;

/// Outcode iterations per segment; a segment needs at most four.
const MAX_CLIP_ITERATIONS: usize = 8;

pub type ScreenRun = Vec<ScreenPoint>;
pub type ClipPieces = SmallVec<[ScreenRun; 2]>;

/// Maximal runs of plottable points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectedRuns {
    pub runs: Vec<ScreenRun>,
    pub dropped: usize,
}

/// Maps one point through both axes; `None` when either coordinate is
/// unplottable.
#[must_use]
pub fn project_point(point: DataPoint, x_axis: &Axis, y_axis: &Axis) -> Option<ScreenPoint> {
    let x = x_axis.try_transform(point.x)?;
    let y = y_axis.try_transform(point.y)?;
    Some(ScreenPoint::new(x, y))
}

#[must_use]
pub fn project_points(points: &[DataPoint], x_axis: &Axis, y_axis: &Axis) -> Vec<Option<ScreenPoint>> {
    #[cfg(feature = "parallel-projection")]
    if points.len() > PARALLEL_PROJECTION_THRESHOLD {
        return points
            .par_iter()
            .map(|point| project_point(*point, x_axis, y_axis))
            .collect();
    }

    points
        .iter()
        .map(|point| project_point(*point, x_axis, y_axis))
        .collect()
}

/// Splits a projected sequence at every unplottable point.
#[must_use]
pub fn split_runs(projected: impl IntoIterator<Item = Option<ScreenPoint>>) -> ProjectedRuns {
    let mut result = ProjectedRuns::default();
    let mut current = ScreenRun::new();
    for point in projected {
        match point {
            Some(point) => current.push(point),
            None => {
                result.dropped += 1;
                if !current.is_empty() {
                    result.runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        result.runs.push(current);
    }
    result
}

#[must_use]
pub fn project_runs(points: &[DataPoint], x_axis: &Axis, y_axis: &Axis) -> ProjectedRuns {
    split_runs(project_points(points, x_axis, y_axis))
}

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const TOP: u8 = 4;
const BOTTOM: u8 = 8;

fn region_code(point: ScreenPoint, rect: ScreenRect) -> u8 {
    let mut code = 0;
    if point.x < rect.left {
        code |= LEFT;
    } else if point.x > rect.right() {
        code |= RIGHT;
    }
    if point.y < rect.top {
        code |= TOP;
    } else if point.y > rect.bottom() {
        code |= BOTTOM;
    }
    code
}

/// Cohen–Sutherland clipping of one segment against `rect`.
#[must_use]
pub fn clip_segment(
    mut start: ScreenPoint,
    mut end: ScreenPoint,
    rect: ScreenRect,
) -> Option<(ScreenPoint, ScreenPoint)> {
    if !start.is_finite() || !end.is_finite() {
        return None;
    }
    let mut out_start = region_code(start, rect);
    let mut out_end = region_code(end, rect);

    for _ in 0..MAX_CLIP_ITERATIONS {
        if (out_start | out_end) == 0 {
            return Some((start, end));
        }
        if (out_start & out_end) != 0 {
            return None;
        }

        let out_code = if out_start != 0 { out_start } else { out_end };
        let (x, y) = if (out_code & TOP) != 0 {
            (
                start.x + (end.x - start.x) * (rect.top - start.y) / (end.y - start.y),
                rect.top,
            )
        } else if (out_code & BOTTOM) != 0 {
            (
                start.x + (end.x - start.x) * (rect.bottom() - start.y) / (end.y - start.y),
                rect.bottom(),
            )
        } else if (out_code & RIGHT) != 0 {
            (
                rect.right(),
                start.y + (end.y - start.y) * (rect.right() - start.x) / (end.x - start.x),
            )
        } else {
            (
                rect.left,
                start.y + (end.y - start.y) * (rect.left - start.x) / (end.x - start.x),
            )
        };

        let new_point = ScreenPoint::new(x, y);
        if !new_point.is_finite() {
            return None;
        }
        if out_code == out_start {
            start = new_point;
            out_start = region_code(start, rect);
        } else {
            end = new_point;
            out_end = region_code(end, rect);
        }
    }
    None
}

/// Clips a polyline, splitting it where it leaves `rect`.
#[must_use]
pub fn clip_polyline(run: &[ScreenPoint], rect: ScreenRect) -> ClipPieces {
    let mut pieces = ClipPieces::new();
    let mut current = ScreenRun::new();
    for window in run.windows(2) {
        let Some((start, end)) = clip_segment(window[0], window[1], rect) else {
            if current.len() >= 2 {
                pieces.push(std::mem::take(&mut current));
            }
            current.clear();
            continue;
        };
        if current.last() == Some(&start) {
            current.push(end);
        } else {
            if current.len() >= 2 {
                pieces.push(std::mem::take(&mut current));
            }
            current.clear();
            current.push(start);
            current.push(end);
        }
    }
    if current.len() >= 2 {
        pieces.push(current);
    }
    pieces
}

/// Sutherland–Hodgman clipping of a closed polygon against `rect`.
#[must_use]
pub fn clip_polygon(points: &[ScreenPoint], rect: ScreenRect) -> Vec<ScreenPoint> {
    #[derive(Clone, Copy)]
    enum Edge {
        Left(f64),
        Right(f64),
        Top(f64),
        Bottom(f64),
    }

    impl Edge {
        fn inside(self, point: ScreenPoint) -> bool {
            match self {
                Self::Left(x) => point.x >= x,
                Self::Right(x) => point.x <= x,
                Self::Top(y) => point.y >= y,
                Self::Bottom(y) => point.y <= y,
            }
        }

        fn intersect(self, a: ScreenPoint, b: ScreenPoint) -> ScreenPoint {
            match self {
                Self::Left(x) | Self::Right(x) => {
                    let t = (x - a.x) / (b.x - a.x);
                    ScreenPoint::new(x, a.y + (b.y - a.y) * t)
                }
                Self::Top(y) | Self::Bottom(y) => {
                    let t = (y - a.y) / (b.y - a.y);
                    ScreenPoint::new(a.x + (b.x - a.x) * t, y)
                }
            }
        }
    }

    let mut output: Vec<ScreenPoint> = points.iter().copied().filter(|p| p.is_finite()).collect();
    for edge in [
        Edge::Left(rect.left),
        Edge::Right(rect.right()),
        Edge::Top(rect.top),
        Edge::Bottom(rect.bottom()),
    ] {
        if output.is_empty() {
            break;
        }
        let input = std::mem::take(&mut output);
        let mut previous = input[input.len() - 1];
        for current in input {
            match (edge.inside(current), edge.inside(previous)) {
                (true, true) => output.push(current),
                (true, false) => {
                    output.push(edge.intersect(previous, current));
                    output.push(current);
                }
                (false, true) => output.push(edge.intersect(previous, current)),
                (false, false) => {}
            }
            previous = current;
        }
    }
    output.retain(|point| point.is_finite());
    if output.len() < 3 { Vec::new() } else { output }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> ScreenRect {
        ScreenRect::new(0.0, 0.0, 10.0, 10.0)
    }

    #[test]
    fn segment_inside_is_unchanged() {
        let start = ScreenPoint::new(2.0, 2.0);
        let end = ScreenPoint::new(8.0, 8.0);
        assert_eq!(clip_segment(start, end, rect()), Some((start, end)));
    }

    #[test]
    fn segment_crossing_is_cut_at_edges() {
        let clipped = clip_segment(ScreenPoint::new(-10.0, 5.0), ScreenPoint::new(20.0, 5.0), rect());
        assert_eq!(
            clipped,
            Some((ScreenPoint::new(0.0, 5.0), ScreenPoint::new(10.0, 5.0)))
        );
    }

    #[test]
    fn huge_segment_stays_bounded() {
        let clipped = clip_segment(ScreenPoint::new(5.0, 5.0), ScreenPoint::new(5.0, 1e300), rect())
            .expect("clipped");
        assert_eq!(clipped.1, ScreenPoint::new(5.0, 10.0));
    }

    #[test]
    fn unplottable_points_split_runs() {
        let runs = split_runs([
            Some(ScreenPoint::new(0.0, 0.0)),
            Some(ScreenPoint::new(1.0, 1.0)),
            None,
            Some(ScreenPoint::new(2.0, 2.0)),
            Some(ScreenPoint::new(3.0, 3.0)),
        ]);
        assert_eq!(runs.runs.len(), 2);
        assert_eq!(runs.dropped, 1);
    }

    #[test]
    fn polyline_leaving_and_reentering_splits() {
        let run = [
            ScreenPoint::new(1.0, 5.0),
            ScreenPoint::new(5.0, 5.0),
            ScreenPoint::new(5.0, 50.0),
            ScreenPoint::new(8.0, 50.0),
            ScreenPoint::new(8.0, 5.0),
        ];
        let pieces = clip_polyline(&run, rect());
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].len(), 3);
        assert_eq!(pieces[1], vec![ScreenPoint::new(8.0, 10.0), ScreenPoint::new(8.0, 5.0)]);
    }

    #[test]
    fn polygon_is_clipped_to_rect() {
        let polygon = [
            ScreenPoint::new(-5.0, -5.0),
            ScreenPoint::new(15.0, -5.0),
            ScreenPoint::new(15.0, 15.0),
            ScreenPoint::new(-5.0, 15.0),
        ];
        let clipped = clip_polygon(&polygon, rect());
        assert_eq!(clipped.len(), 4);
        assert!(clipped.iter().all(|point| rect().contains(*point)));
    }
}
