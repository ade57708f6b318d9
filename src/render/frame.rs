use serde::{Deserialize, Serialize};

use crate::core::{ScreenPoint, ScreenRect};
use crate::error::{PlotError, PlotResult};
use crate::render::{
    Color, EdgeRenderingMode, FontSpec, HorizontalAlign, Stroke, VerticalAlign,
};

/// One text run; `text` may contain CR, LF or CRLF line breaks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCommand {
    pub position: ScreenPoint,
    pub text: String,
    pub font: FontSpec,
    pub color: Color,
    /// Clockwise rotation in degrees around `position`.
    pub rotation: f64,
    pub h_align: HorizontalAlign,
    pub v_align: VerticalAlign,
}

impl TextCommand {
    #[must_use]
    pub fn new(position: ScreenPoint, text: impl Into<String>, font: FontSpec, color: Color) -> Self {
        Self {
            position,
            text: text.into(),
            font,
            color,
            rotation: 0.0,
            h_align: HorizontalAlign::Left,
            v_align: VerticalAlign::Top,
        }
    }

    #[must_use]
    pub fn aligned(mut self, h_align: HorizontalAlign, v_align: VerticalAlign) -> Self {
        self.h_align = h_align;
        self.v_align = v_align;
        self
    }

    #[must_use]
    pub fn rotated(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }
}

/// Backend-independent drawing primitive in screen coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrawCommand {
    Line {
        points: Vec<ScreenPoint>,
        stroke: Stroke,
        edge_mode: EdgeRenderingMode,
    },
    Polygon {
        points: Vec<ScreenPoint>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        edge_mode: EdgeRenderingMode,
    },
    Rectangle {
        rect: ScreenRect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        edge_mode: EdgeRenderingMode,
    },
    Text(TextCommand),
    ClipPush(ScreenRect),
    ClipPop,
}

impl DrawCommand {
    fn validate(&self) -> PlotResult<()> {
        let finite_points = |points: &[ScreenPoint]| points.iter().all(|point| point.is_finite());
        let ok = match self {
            Self::Line { points, .. } => points.len() >= 2 && finite_points(points),
            Self::Polygon { points, .. } => points.len() >= 3 && finite_points(points),
            Self::Rectangle { rect, .. } | Self::ClipPush(rect) => {
                rect.left.is_finite()
                    && rect.top.is_finite()
                    && rect.width.is_finite()
                    && rect.height.is_finite()
            }
            Self::Text(text) => text.position.is_finite() && text.font.is_visible(),
            Self::ClipPop => true,
        };
        if ok {
            Ok(())
        } else {
            Err(PlotError::InvalidData(format!(
                "draw command has degenerate geometry: {self:?}"
            )))
        }
    }
}

/// Ordered command list produced by one render pass.
///
/// Later commands draw on top of earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub bounds: ScreenRect,
    pub plot_area: ScreenRect,
    pub commands: Vec<DrawCommand>,
    /// Data points skipped because they could not be mapped to screen space.
    pub dropped_points: usize,
    /// Polyline pieces emitted after clipping to the plot area.
    pub clipped_pieces: usize,
}

impl RenderFrame {
    #[must_use]
    pub fn new(bounds: ScreenRect) -> Self {
        Self {
            bounds,
            plot_area: ScreenRect::default(),
            commands: Vec::new(),
            dropped_points: 0,
            clipped_pieces: 0,
        }
    }

    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }

    pub fn push_line(&mut self, points: Vec<ScreenPoint>, stroke: Stroke, edge_mode: EdgeRenderingMode) {
        if points.len() >= 2 && stroke.is_visible() {
            self.commands.push(DrawCommand::Line {
                points,
                stroke,
                edge_mode,
            });
        }
    }

    pub fn push_rect(
        &mut self,
        rect: ScreenRect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        edge_mode: EdgeRenderingMode,
    ) {
        let fill = fill.filter(|color| color.is_visible());
        let stroke = stroke.filter(|stroke| stroke.is_visible());
        if fill.is_none() && stroke.is_none() {
            return;
        }
        self.commands.push(DrawCommand::Rectangle {
            rect,
            fill,
            stroke,
            edge_mode,
        });
    }

    /// Empty text and text with an unusable font size draw nothing.
    pub fn push_text(&mut self, text: TextCommand) {
        if !text.text.is_empty() && text.font.is_visible() {
            self.commands.push(DrawCommand::Text(text));
        }
    }

    /// Checks geometry finiteness and clip bracket balance.
    pub fn validate(&self) -> PlotResult<()> {
        let mut depth = 0usize;
        for command in &self.commands {
            command.validate()?;
            match command {
                DrawCommand::ClipPush(_) => depth += 1,
                DrawCommand::ClipPop => {
                    depth = depth.checked_sub(1).ok_or_else(|| {
                        PlotError::InvalidData("clip pop without matching push".to_owned())
                    })?;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(PlotError::InvalidData(format!(
                "{depth} clip region(s) left open"
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
