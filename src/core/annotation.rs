use serde::{Deserialize, Serialize};

use crate::core::axis::Axis;
use crate::core::projection::project_point;
use crate::core::series::SeriesAxes;
use crate::core::types::{DataPoint, ScreenPoint, ScreenRect};
use crate::render::{
    Color, EdgeRenderingMode, FontSpec, HorizontalAlign, RenderFrame, Stroke, TextCommand,
    VerticalAlign,
};

/// Where an annotation is drawn relative to axes and series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnnotationLayer {
    BelowAxes,
    BelowSeries,
    #[default]
    AboveSeries,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LineAnnotationKind {
    /// Constant y across the plot area.
    Horizontal { y: f64 },
    /// Constant x across the plot area.
    Vertical { x: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineAnnotation {
    pub kind: LineAnnotationKind,
    pub stroke: Stroke,
    pub text: Option<String>,
}

/// Data-space box; infinite bounds extend to the plot-area edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RectangleAnnotation {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub fill: Color,
    pub stroke: Option<Stroke>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    pub position: DataPoint,
    pub text: String,
    pub font: FontSpec,
    pub color: Color,
    pub h_align: HorizontalAlign,
    pub v_align: VerticalAlign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnnotationKind {
    Line(LineAnnotation),
    Rectangle(RectangleAnnotation),
    Text(TextAnnotation),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub layer: AnnotationLayer,
    pub x_axis_key: Option<String>,
    pub y_axis_key: Option<String>,
}

impl Annotation {
    fn with_kind(kind: AnnotationKind) -> Self {
        Self {
            kind,
            layer: AnnotationLayer::default(),
            x_axis_key: None,
            y_axis_key: None,
        }
    }

    #[must_use]
    pub fn horizontal_line(y: f64, stroke: Stroke) -> Self {
        Self::with_kind(AnnotationKind::Line(LineAnnotation {
            kind: LineAnnotationKind::Horizontal { y },
            stroke,
            text: None,
        }))
    }

    #[must_use]
    pub fn vertical_line(x: f64, stroke: Stroke) -> Self {
        Self::with_kind(AnnotationKind::Line(LineAnnotation {
            kind: LineAnnotationKind::Vertical { x },
            stroke,
            text: None,
        }))
    }

    #[must_use]
    pub fn rectangle(min_x: f64, max_x: f64, min_y: f64, max_y: f64, fill: Color) -> Self {
        Self::with_kind(AnnotationKind::Rectangle(RectangleAnnotation {
            min_x,
            max_x,
            min_y,
            max_y,
            fill,
            stroke: None,
            text: None,
        }))
    }

    #[must_use]
    pub fn text(position: DataPoint, text: impl Into<String>) -> Self {
        Self::with_kind(AnnotationKind::Text(TextAnnotation {
            position,
            text: text.into(),
            font: FontSpec::default(),
            color: Color::BLACK,
            h_align: HorizontalAlign::Center,
            v_align: VerticalAlign::Bottom,
        }))
    }

    #[must_use]
    pub fn with_layer(mut self, layer: AnnotationLayer) -> Self {
        self.layer = layer;
        self
    }

    #[must_use]
    pub fn with_x_axis_key(mut self, key: impl Into<String>) -> Self {
        self.x_axis_key = Some(key.into());
        self
    }

    #[must_use]
    pub fn with_y_axis_key(mut self, key: impl Into<String>) -> Self {
        self.y_axis_key = Some(key.into());
        self
    }

    /// Label for line and rectangle annotations; replaces the text of text
    /// annotations.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        match &mut self.kind {
            AnnotationKind::Line(line) => line.text = Some(label),
            AnnotationKind::Rectangle(rect) => rect.text = Some(label),
            AnnotationKind::Text(text) => text.text = label,
        }
        self
    }

    #[must_use]
    pub fn layer(&self) -> AnnotationLayer {
        self.layer
    }

    /// Emits this annotation's commands, clipped to `plot_area`.
    pub(crate) fn emit(
        &self,
        axes: &[Axis],
        binding: SeriesAxes,
        plot_area: ScreenRect,
        frame: &mut RenderFrame,
    ) {
        let (x_axis, y_axis) = (&axes[binding.x], &axes[binding.y]);
        match &self.kind {
            AnnotationKind::Line(line) => {
                let (start, end) = match line.kind {
                    LineAnnotationKind::Horizontal { y } => {
                        let Some(screen_y) = y_axis.try_transform(y) else {
                            return;
                        };
                        if screen_y < plot_area.top || screen_y > plot_area.bottom() {
                            return;
                        }
                        (
                            ScreenPoint::new(plot_area.left, screen_y),
                            ScreenPoint::new(plot_area.right(), screen_y),
                        )
                    }
                    LineAnnotationKind::Vertical { x } => {
                        let Some(screen_x) = x_axis.try_transform(x) else {
                            return;
                        };
                        if screen_x < plot_area.left || screen_x > plot_area.right() {
                            return;
                        }
                        (
                            ScreenPoint::new(screen_x, plot_area.bottom()),
                            ScreenPoint::new(screen_x, plot_area.top),
                        )
                    }
                };
                frame.push_line(vec![start, end], line.stroke, EdgeRenderingMode::Automatic);
                if let Some(text) = &line.text {
                    frame.push_text(
                        TextCommand::new(end, text.clone(), FontSpec::default(), line.stroke.color)
                            .aligned(HorizontalAlign::Right, VerticalAlign::Bottom),
                    );
                }
            }
            AnnotationKind::Rectangle(rect) => {
                let edge = |value: f64, axis: &Axis, low: f64, high: f64| {
                    if value == f64::NEG_INFINITY {
                        Some(low)
                    } else if value == f64::INFINITY {
                        Some(high)
                    } else {
                        axis.try_transform(value)
                    }
                };
                let (Some(x0), Some(x1), Some(y0), Some(y1)) = (
                    edge(rect.min_x, x_axis, plot_area.left, plot_area.right()),
                    edge(rect.max_x, x_axis, plot_area.left, plot_area.right()),
                    edge(rect.min_y, y_axis, plot_area.bottom(), plot_area.top),
                    edge(rect.max_y, y_axis, plot_area.bottom(), plot_area.top),
                ) else {
                    return;
                };
                let screen = ScreenRect::from_corners(ScreenPoint::new(x0, y0), ScreenPoint::new(x1, y1))
                    .intersect(plot_area);
                if screen.is_empty() {
                    return;
                }
                frame.push_rect(screen, Some(rect.fill), rect.stroke, EdgeRenderingMode::Automatic);
                if let Some(text) = &rect.text {
                    frame.push_text(
                        TextCommand::new(screen.center(), text.clone(), FontSpec::default(), Color::BLACK)
                            .aligned(HorizontalAlign::Center, VerticalAlign::Middle),
                    );
                }
            }
            AnnotationKind::Text(text) => {
                let Some(position) = project_point(text.position, x_axis, y_axis) else {
                    return;
                };
                if !plot_area.contains(position) {
                    return;
                }
                frame.push_text(
                    TextCommand::new(position, text.text.clone(), text.font.clone(), text.color)
                        .aligned(text.h_align, text.v_align),
                );
            }
        }
    }
}
