pub mod annotation;
pub mod axis;
pub mod axis_manager;
pub mod axis_ticks;
pub mod primitives;
pub mod projection;
pub mod series;
pub mod transform;
pub mod types;

pub use annotation::{Annotation, AnnotationKind, AnnotationLayer, LineAnnotationKind};
pub use axis::{Axis, AxisKind, AxisLayout, AxisPosition, Orientation, Palette};
pub use axis_manager::{AxisManager, AxisRole};
pub use axis_ticks::AxisTick;
pub use series::{
    ColumnSeries, DataSource, HeatMapSeries, LineSeries, ScatterSeries, Series, SeriesAxes,
    TrackerHit,
};
pub use transform::{AxisTransform, ScaleMapping};
pub use types::{DataPoint, ScreenPoint, ScreenRect, Thickness, Viewport};
