use serde::{Deserialize, Serialize};

use crate::core::{ScreenPoint, ScreenRect};
use crate::error::{PlotError, PlotResult};
use crate::render::text::{block_offset, block_size, line_height, line_offset_x, split_lines};
use crate::render::{
    Color, EdgeRenderingMode, FontSpec, RenderBackend, RenderTarget, Stroke, TextCommand,
    TextSize, prepare_points, prepare_rect,
};

/// Average glyph advance used for headless measurement, relative to font size.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Operation as received by the recording backend, after target resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordedOp {
    Line {
        points: Vec<ScreenPoint>,
        stroke: Stroke,
        edge_mode: EdgeRenderingMode,
        antialias: bool,
    },
    Polygon {
        points: Vec<ScreenPoint>,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        edge_mode: EdgeRenderingMode,
        antialias: bool,
    },
    Rectangle {
        rect: ScreenRect,
        fill: Option<Color>,
        stroke: Option<Stroke>,
        edge_mode: EdgeRenderingMode,
    },
    /// One laid-out line of a text block.
    TextLine {
        origin: ScreenPoint,
        text: String,
        font_size: f64,
        rotation: f64,
    },
    ClipPush(ScreenRect),
    ClipPop,
}

/// Headless backend that records every operation.
///
/// Used by tests and by hosts that want a serializable trace of a pass. Text
/// is measured with a fixed average glyph width instead of a shaping service.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    target: RenderTarget,
    ops: Vec<RecordedOp>,
    clip_depth: usize,
    max_clip_depth: usize,
}

impl RecordingBackend {
    #[must_use]
    pub fn new(target: RenderTarget) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn ops(&self) -> &[RecordedOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.clip_depth = 0;
        self.max_clip_depth = 0;
    }

    #[must_use]
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    #[must_use]
    pub fn max_clip_depth(&self) -> usize {
        self.max_clip_depth
    }

    #[must_use]
    pub fn text_lines(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                RecordedOp::TextLine { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// All points of recorded line and polygon operations.
    pub fn drawn_points(&self) -> impl Iterator<Item = ScreenPoint> + '_ {
        self.ops
            .iter()
            .flat_map(|op| -> &[ScreenPoint] {
                match op {
                    RecordedOp::Line { points, .. } | RecordedOp::Polygon { points, .. } => points,
                    _ => &[],
                }
            })
            .copied()
    }

    /// Serializes the recorded trace to pretty JSON.
    pub fn to_json_pretty(&self) -> PlotResult<String> {
        serde_json::to_string_pretty(&self.ops)
            .map_err(|e| PlotError::InvalidData(format!("failed to serialize recording: {e}")))
    }

    fn line_width(text: &str, font_size: f64) -> f64 {
        text.chars().count() as f64 * font_size * GLYPH_WIDTH_RATIO
    }
}

impl RenderBackend for RecordingBackend {
    fn render_target(&self) -> RenderTarget {
        self.target
    }

    fn draw_line(
        &mut self,
        points: &[ScreenPoint],
        stroke: &Stroke,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        let prepared = prepare_points(self.target, edge_mode, points, stroke.thickness);
        self.ops.push(RecordedOp::Line {
            points: prepared.points.into_owned(),
            stroke: *stroke,
            edge_mode: edge_mode.resolve(self.target),
            antialias: prepared.antialias,
        });
        Ok(())
    }

    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        fill: Option<Color>,
        stroke: Option<&Stroke>,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        let thickness = stroke.map_or(1.0, |stroke| stroke.thickness);
        let prepared = prepare_points(self.target, edge_mode, points, thickness);
        self.ops.push(RecordedOp::Polygon {
            points: prepared.points.into_owned(),
            fill,
            stroke: stroke.copied(),
            edge_mode: edge_mode.resolve(self.target),
            antialias: prepared.antialias,
        });
        Ok(())
    }

    fn draw_rectangle(
        &mut self,
        rect: ScreenRect,
        fill: Option<Color>,
        stroke: Option<&Stroke>,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        let (rect, _) = prepare_rect(self.target, edge_mode, rect);
        self.ops.push(RecordedOp::Rectangle {
            rect,
            fill,
            stroke: stroke.copied(),
            edge_mode: edge_mode.resolve(self.target),
        });
        Ok(())
    }

    fn draw_text(&mut self, text: &TextCommand) -> PlotResult<()> {
        let font_size = text.font.size;
        let lines = split_lines(&text.text);
        let widths = lines
            .iter()
            .map(|line| Self::line_width(line, font_size))
            .collect::<Vec<_>>();
        let size = block_size(widths.iter().copied(), font_size);
        let offset = block_offset(size, text.h_align, text.v_align);
        let (sin, cos) = text.rotation.to_radians().sin_cos();

        for (index, (line, width)) in lines.iter().zip(widths).enumerate() {
            let local = ScreenPoint::new(
                offset.x + line_offset_x(width, size.width, text.h_align),
                offset.y + index as f64 * line_height(font_size),
            );
            let origin = ScreenPoint::new(
                text.position.x + local.x * cos - local.y * sin,
                text.position.y + local.x * sin + local.y * cos,
            );
            self.ops.push(RecordedOp::TextLine {
                origin,
                text: (*line).to_owned(),
                font_size,
                rotation: text.rotation,
            });
        }
        Ok(())
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> PlotResult<TextSize> {
        let lines = split_lines(text);
        Ok(block_size(
            lines.iter().map(|line| Self::line_width(line, font.size)),
            font.size,
        ))
    }

    fn push_clip(&mut self, rect: ScreenRect) -> PlotResult<()> {
        self.clip_depth += 1;
        self.max_clip_depth = self.max_clip_depth.max(self.clip_depth);
        self.ops.push(RecordedOp::ClipPush(rect));
        Ok(())
    }

    fn pop_clip(&mut self) -> PlotResult<()> {
        self.clip_depth = self
            .clip_depth
            .checked_sub(1)
            .ok_or_else(|| PlotError::Backend("clip stack underflow".to_owned()))?;
        self.ops.push(RecordedOp::ClipPop);
        Ok(())
    }
}
