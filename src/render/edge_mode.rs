use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::core::{ScreenPoint, ScreenRect};
use crate::render::RenderTarget;

/// Antialiasing and pixel-snapping hint attached to each primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EdgeRenderingMode {
    /// Resolved per target: `Adaptive` on screens, `PreferGeometricAccuracy`
    /// for vector output.
    #[default]
    Automatic,
    /// Antialias only edges that are not axis-aligned.
    Adaptive,
    PreferSpeed,
    PreferSharpness,
    PreferGeometricAccuracy,
}

impl EdgeRenderingMode {
    #[must_use]
    pub fn resolve(self, target: RenderTarget) -> Self {
        match (self, target) {
            (Self::Automatic, RenderTarget::ScreenRaster) => Self::Adaptive,
            (Self::Automatic, RenderTarget::VectorGraphic) => Self::PreferGeometricAccuracy,
            (mode, _) => mode,
        }
    }
}

const AXIS_ALIGNED_EPSILON: f64 = 1e-6;

fn is_axis_aligned(points: &[ScreenPoint]) -> bool {
    points.windows(2).all(|pair| {
        (pair[0].x - pair[1].x).abs() < AXIS_ALIGNED_EPSILON
            || (pair[0].y - pair[1].y).abs() < AXIS_ALIGNED_EPSILON
    })
}

/// Whether a primitive with the given (resolved) mode should be antialiased.
#[must_use]
pub fn should_antialias(mode: EdgeRenderingMode, points: &[ScreenPoint]) -> bool {
    match mode {
        EdgeRenderingMode::Automatic | EdgeRenderingMode::Adaptive => !is_axis_aligned(points),
        EdgeRenderingMode::PreferSpeed | EdgeRenderingMode::PreferSharpness => false,
        EdgeRenderingMode::PreferGeometricAccuracy => true,
    }
}

fn snap(value: f64, thickness: f64) -> f64 {
    let pixels = thickness.round().max(1.0) as i64;
    if pixels % 2 == 1 {
        value.floor() + 0.5
    } else {
        value.round()
    }
}

/// Geometry prepared for a concrete target.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedPoints<'a> {
    pub points: Cow<'a, [ScreenPoint]>,
    pub antialias: bool,
}

/// Resolves the mode, decides antialiasing and snaps aliased screen strokes
/// to pixel centers. Vector targets keep exact geometry.
#[must_use]
pub fn prepare_points<'a>(
    target: RenderTarget,
    mode: EdgeRenderingMode,
    points: &'a [ScreenPoint],
    thickness: f64,
) -> PreparedPoints<'a> {
    let resolved = mode.resolve(target);
    let antialias = should_antialias(resolved, points);
    if antialias || target == RenderTarget::VectorGraphic {
        return PreparedPoints {
            points: Cow::Borrowed(points),
            antialias,
        };
    }
    let snapped = points
        .iter()
        .map(|point| ScreenPoint::new(snap(point.x, thickness), snap(point.y, thickness)))
        .collect::<Vec<_>>();
    PreparedPoints {
        points: Cow::Owned(snapped),
        antialias,
    }
}

/// Rectangles are axis-aligned, so on screens they are only antialiased under
/// `PreferGeometricAccuracy`; otherwise the edges are rounded to whole pixels.
#[must_use]
pub fn prepare_rect(target: RenderTarget, mode: EdgeRenderingMode, rect: ScreenRect) -> (ScreenRect, bool) {
    let resolved = mode.resolve(target);
    let antialias = resolved == EdgeRenderingMode::PreferGeometricAccuracy;
    if antialias || target == RenderTarget::VectorGraphic {
        return (rect, antialias);
    }
    let left = rect.left.round();
    let top = rect.top.round();
    let right = rect.right().round();
    let bottom = rect.bottom().round();
    (
        ScreenRect::new(left, top, (right - left).max(0.0), (bottom - top).max(0.0)),
        false,
    )
}
