mod edge_mode;
mod frame;
mod primitives;
mod recording_backend;
pub mod text;

pub use edge_mode::{
    EdgeRenderingMode, PreparedPoints, prepare_points, prepare_rect, should_antialias,
};
pub use frame::{DrawCommand, RenderFrame, TextCommand};
pub use primitives::{
    Color, DEFAULT_SERIES_COLORS, FontSpec, FontWeight, HorizontalAlign, LineStyle, Stroke,
    TextSize, VerticalAlign,
};
pub use recording_backend::{RecordedOp, RecordingBackend};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::{ScreenPoint, ScreenRect};
use crate::error::PlotResult;

/// Kind of surface a backend draws to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RenderTarget {
    /// Pixel surface; aliased strokes are snapped to pixel centers.
    #[default]
    ScreenRaster,
    /// Resolution-independent output where exact geometry wins.
    VectorGraphic,
}

/// Capability set every rendering backend implements.
///
/// Backends receive commands in screen coordinates, already clipped and
/// filtered by the render pipeline. Text measurement and multi-line layout are
/// implemented by each backend, since shaping is backend-specific.
pub trait RenderBackend {
    fn render_target(&self) -> RenderTarget;

    fn draw_line(
        &mut self,
        points: &[ScreenPoint],
        stroke: &Stroke,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()>;

    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        fill: Option<Color>,
        stroke: Option<&Stroke>,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()>;

    fn draw_rectangle(
        &mut self,
        rect: ScreenRect,
        fill: Option<Color>,
        stroke: Option<&Stroke>,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()>;

    /// Draws a text block; line breaks (CR, LF, CRLF) start new lines spaced by
    /// [`text::line_height`].
    fn draw_text(&mut self, text: &TextCommand) -> PlotResult<()>;

    fn measure_text(&self, text: &str, font: &FontSpec) -> PlotResult<TextSize>;

    fn push_clip(&mut self, rect: ScreenRect) -> PlotResult<()>;

    fn pop_clip(&mut self) -> PlotResult<()>;
}

/// Sends every command of `frame` to `backend` in order.
///
/// On a backend fault the clip regions opened by this flush are closed again
/// before the error is returned.
pub fn flush_frame<B: RenderBackend + ?Sized>(frame: &RenderFrame, backend: &mut B) -> PlotResult<()> {
    let mut open_clips = 0usize;
    for command in &frame.commands {
        let outcome = match command {
            DrawCommand::Line {
                points,
                stroke,
                edge_mode,
            } => backend.draw_line(points, stroke, *edge_mode),
            DrawCommand::Polygon {
                points,
                fill,
                stroke,
                edge_mode,
            } => backend.draw_polygon(points, *fill, stroke.as_ref(), *edge_mode),
            DrawCommand::Rectangle {
                rect,
                fill,
                stroke,
                edge_mode,
            } => backend.draw_rectangle(*rect, *fill, stroke.as_ref(), *edge_mode),
            DrawCommand::Text(text) => backend.draw_text(text),
            DrawCommand::ClipPush(rect) => backend.push_clip(*rect).map(|()| open_clips += 1),
            DrawCommand::ClipPop => backend.pop_clip().map(|()| open_clips = open_clips.saturating_sub(1)),
        };

        if let Err(err) = outcome {
            for _ in 0..open_clips {
                if let Err(unwind_err) = backend.pop_clip() {
                    warn!(error = %unwind_err, "failed to unwind clip after backend fault");
                    break;
                }
            }
            return Err(err);
        }
    }
    Ok(())
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::CairoBackend;
