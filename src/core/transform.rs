use serde::{Deserialize, Serialize};

/// Spans at or below this are treated as zero when deriving a transform.
const MIN_SPAN: f64 = 1e-300;

/// Pre-transform applied before the affine step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScaleMapping {
    Linear,
    Logarithmic { base: f64 },
}

impl ScaleMapping {
    /// Maps a data value into the space where the axis is linear. Returns NaN
    /// for values a logarithmic axis cannot represent.
    #[must_use]
    pub fn to_linear(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Logarithmic { base } => {
                if value > 0.0 {
                    value.log(base)
                } else {
                    f64::NAN
                }
            }
        }
    }

    #[must_use]
    pub fn from_linear(self, value: f64) -> f64 {
        match self {
            Self::Linear => value,
            Self::Logarithmic { base } => base.powf(value),
        }
    }
}

/// Affine data↔screen mapping of one axis: `screen = (v - offset) * scale`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTransform {
    scale: f64,
    offset: f64,
    mapping: ScaleMapping,
}

impl Default for AxisTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: 0.0,
            mapping: ScaleMapping::Linear,
        }
    }
}

impl AxisTransform {
    /// Derives the mapping that sends `minimum` to `screen_start` and
    /// `maximum` to `screen_end`.
    ///
    /// A zero data span is widened to one unit, and a zero screen length keeps
    /// a unit scale so the transform stays invertible.
    #[must_use]
    pub fn from_extent(
        minimum: f64,
        maximum: f64,
        screen_start: f64,
        screen_end: f64,
        mapping: ScaleMapping,
    ) -> Self {
        let a0 = mapping.to_linear(minimum);
        let a1 = mapping.to_linear(maximum);
        let mut span = a1 - a0;
        if !span.is_finite() || span.abs() <= MIN_SPAN {
            span = 1.0;
        }
        let mut scale = (screen_end - screen_start) / span;
        if !scale.is_finite() || scale == 0.0 {
            scale = 1.0;
        }
        let offset = if a0.is_finite() { a0 - screen_start / scale } else { 0.0 };
        Self {
            scale,
            offset,
            mapping,
        }
    }

    #[must_use]
    pub fn scale(self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn offset(self) -> f64 {
        self.offset
    }

    #[must_use]
    pub fn mapping(self) -> ScaleMapping {
        self.mapping
    }

    #[must_use]
    pub fn transform(self, value: f64) -> f64 {
        (self.mapping.to_linear(value) - self.offset) * self.scale
    }

    #[must_use]
    pub fn inverse_transform(self, screen: f64) -> f64 {
        self.mapping.from_linear(self.linear_at(screen))
    }

    /// Value in the axis' linear space under a screen coordinate.
    #[must_use]
    pub fn linear_at(self, screen: f64) -> f64 {
        screen / self.scale + self.offset
    }

    /// `Some(screen)` when the result is finite.
    #[must_use]
    pub fn try_transform(self, value: f64) -> Option<f64> {
        if !value.is_finite() {
            return None;
        }
        let screen = self.transform(value);
        screen.is_finite().then_some(screen)
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisTransform, ScaleMapping};

    #[test]
    fn linear_extent_maps_endpoints() {
        let transform = AxisTransform::from_extent(10.0, 20.0, 100.0, 300.0, ScaleMapping::Linear);
        assert_eq!(transform.transform(10.0), 100.0);
        assert_eq!(transform.transform(20.0), 300.0);
        assert!((transform.inverse_transform(200.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn inverted_extent_has_negative_scale() {
        let transform = AxisTransform::from_extent(0.0, 1.0, 500.0, 0.0, ScaleMapping::Linear);
        assert!(transform.scale() < 0.0);
        assert_eq!(transform.transform(1.0), 0.0);
    }

    #[test]
    fn logarithmic_rejects_non_positive_values() {
        let transform = AxisTransform::from_extent(
            1.0,
            1000.0,
            0.0,
            300.0,
            ScaleMapping::Logarithmic { base: 10.0 },
        );
        assert!((transform.transform(10.0) - 100.0).abs() < 1e-9);
        assert_eq!(transform.try_transform(0.0), None);
        assert_eq!(transform.try_transform(-5.0), None);
    }

    #[test]
    fn degenerate_extent_stays_finite() {
        let transform = AxisTransform::from_extent(5.0, 5.0, 0.0, 0.0, ScaleMapping::Linear);
        assert!(transform.scale().is_finite());
        assert!(transform.inverse_transform(3.0).is_finite());
    }
}
