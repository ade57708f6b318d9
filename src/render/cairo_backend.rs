use cairo::{Antialias, Context};
use pango::FontDescription;

use crate::core::{ScreenPoint, ScreenRect};
use crate::error::{PlotError, PlotResult};
use crate::render::text::{block_offset, block_size, line_height, line_offset_x, split_lines};
use crate::render::{
    Color, EdgeRenderingMode, FontSpec, FontWeight, RenderBackend, RenderTarget, Stroke,
    TextCommand, TextSize, prepare_points, prepare_rect,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub polygons_drawn: usize,
    pub rects_drawn: usize,
    pub text_lines_drawn: usize,
}

/// Cairo + Pango backend drawing into any Cairo context: an image surface,
/// a PDF surface or a GTK `DrawingArea` callback.
///
/// Clip regions map onto `save`/`restore` pairs of the context.
#[derive(Debug)]
pub struct CairoBackend {
    context: Context,
    target: RenderTarget,
    clip_depth: usize,
    stats: CairoRenderStats,
}

impl CairoBackend {
    #[must_use]
    pub fn new(context: Context, target: RenderTarget) -> Self {
        Self {
            context,
            target,
            clip_depth: 0,
            stats: CairoRenderStats::default(),
        }
    }

    /// Backend for a pixel surface.
    #[must_use]
    pub fn for_screen(context: &Context) -> Self {
        Self::new(context.clone(), RenderTarget::ScreenRaster)
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    #[must_use]
    pub fn clip_depth(&self) -> usize {
        self.clip_depth
    }

    #[must_use]
    pub fn stats(&self) -> CairoRenderStats {
        self.stats
    }

    fn apply_antialias(&self, antialias: bool) {
        self.context.set_antialias(if antialias {
            Antialias::Default
        } else {
            Antialias::None
        });
    }

    fn apply_stroke(&self, stroke: &Stroke) {
        apply_color(&self.context, stroke.color);
        self.context.set_line_width(stroke.thickness);
        let dashes = stroke
            .line_style
            .dash_pattern()
            .iter()
            .map(|length| length * stroke.thickness)
            .collect::<Vec<_>>();
        self.context.set_dash(&dashes, 0.0);
    }

    fn append_path(&self, points: &[ScreenPoint], close: bool) {
        self.context.new_path();
        for (index, point) in points.iter().enumerate() {
            if index == 0 {
                self.context.move_to(point.x, point.y);
            } else {
                self.context.line_to(point.x, point.y);
            }
        }
        if close {
            self.context.close_path();
        }
    }

    fn fill_and_stroke(&self, fill: Option<Color>, stroke: Option<&Stroke>, what: &str) -> PlotResult<()> {
        let stroke = stroke.filter(|stroke| stroke.is_visible());
        if let Some(fill) = fill.filter(|fill| fill.is_visible()) {
            apply_color(&self.context, fill);
            if stroke.is_some() {
                self.context
                    .fill_preserve()
                    .map_err(|err| map_backend_error(what, err))?;
            } else {
                self.context
                    .fill()
                    .map_err(|err| map_backend_error(what, err))?;
            }
        }
        if let Some(stroke) = stroke {
            self.apply_stroke(stroke);
            self.context
                .stroke()
                .map_err(|err| map_backend_error(what, err))?;
        }
        self.context.new_path();
        Ok(())
    }

    fn layout(&self, text: &str, font: &FontSpec) -> pango::Layout {
        let layout = pangocairo::functions::create_layout(&self.context);
        layout.set_font_description(Some(&font_description(font)));
        layout.set_text(text);
        layout
    }

    fn line_width(&self, line: &str, font: &FontSpec) -> f64 {
        let (width, _) = self.layout(line, font).pixel_size();
        f64::from(width)
    }
}

impl RenderBackend for CairoBackend {
    fn render_target(&self) -> RenderTarget {
        self.target
    }

    fn draw_line(
        &mut self,
        points: &[ScreenPoint],
        stroke: &Stroke,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        if points.len() < 2 || !stroke.is_visible() {
            return Ok(());
        }
        let prepared = prepare_points(self.target, edge_mode, points, stroke.thickness);
        self.apply_antialias(prepared.antialias);
        self.append_path(&prepared.points, false);
        self.apply_stroke(stroke);
        self.context
            .stroke()
            .map_err(|err| map_backend_error("failed to stroke line", err))?;
        self.stats.lines_drawn += 1;
        Ok(())
    }

    fn draw_polygon(
        &mut self,
        points: &[ScreenPoint],
        fill: Option<Color>,
        stroke: Option<&Stroke>,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        if points.len() < 3 {
            return Ok(());
        }
        let thickness = stroke.map_or(1.0, |stroke| stroke.thickness);
        let prepared = prepare_points(self.target, edge_mode, points, thickness);
        self.apply_antialias(prepared.antialias);
        self.append_path(&prepared.points, true);
        self.fill_and_stroke(fill, stroke, "failed to draw polygon")?;
        self.stats.polygons_drawn += 1;
        Ok(())
    }

    fn draw_rectangle(
        &mut self,
        rect: ScreenRect,
        fill: Option<Color>,
        stroke: Option<&Stroke>,
        edge_mode: EdgeRenderingMode,
    ) -> PlotResult<()> {
        let (rect, antialias) = prepare_rect(self.target, edge_mode, rect);
        self.apply_antialias(antialias);
        self.context.new_path();
        self.context
            .rectangle(rect.left, rect.top, rect.width, rect.height);
        self.fill_and_stroke(fill, stroke, "failed to draw rectangle")?;
        self.stats.rects_drawn += 1;
        Ok(())
    }

    fn draw_text(&mut self, text: &TextCommand) -> PlotResult<()> {
        let font_size = text.font.size;
        let lines = split_lines(&text.text);
        let widths = lines
            .iter()
            .map(|line| self.line_width(line, &text.font))
            .collect::<Vec<_>>();
        let size = block_size(widths.iter().copied(), font_size);
        let offset = block_offset(size, text.h_align, text.v_align);

        self.context
            .save()
            .map_err(|err| map_backend_error("failed to save context", err))?;
        self.context.set_antialias(Antialias::Default);
        self.context.translate(text.position.x, text.position.y);
        self.context.rotate(text.rotation.to_radians());
        apply_color(&self.context, text.color);
        for (index, (line, width)) in lines.iter().zip(widths).enumerate() {
            let layout = self.layout(line, &text.font);
            self.context.move_to(
                offset.x + line_offset_x(width, size.width, text.h_align),
                offset.y + index as f64 * line_height(font_size),
            );
            pangocairo::functions::show_layout(&self.context, &layout);
            self.stats.text_lines_drawn += 1;
        }
        self.context
            .restore()
            .map_err(|err| map_backend_error("failed to restore context", err))
    }

    fn measure_text(&self, text: &str, font: &FontSpec) -> PlotResult<TextSize> {
        let lines = split_lines(text);
        Ok(block_size(
            lines.iter().map(|line| self.line_width(line, font)),
            font.size,
        ))
    }

    fn push_clip(&mut self, rect: ScreenRect) -> PlotResult<()> {
        self.context
            .save()
            .map_err(|err| map_backend_error("failed to push clip", err))?;
        self.context.new_path();
        self.context
            .rectangle(rect.left, rect.top, rect.width, rect.height);
        self.context.clip();
        self.clip_depth += 1;
        Ok(())
    }

    fn pop_clip(&mut self) -> PlotResult<()> {
        self.clip_depth = self
            .clip_depth
            .checked_sub(1)
            .ok_or_else(|| PlotError::Backend("clip stack underflow".to_owned()))?;
        self.context
            .restore()
            .map_err(|err| map_backend_error("failed to pop clip", err))
    }
}

fn font_description(font: &FontSpec) -> FontDescription {
    let mut description = FontDescription::new();
    description.set_family(&font.family);
    description.set_absolute_size(font.size * f64::from(pango::SCALE));
    if font.weight == FontWeight::Bold {
        description.set_weight(pango::Weight::Bold);
    }
    description
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> PlotError {
    PlotError::Backend(format!("{prefix}: {err}"))
}

#[cfg(test)]
mod tests {
    use cairo::{Format, ImageSurface};

    use super::*;

    fn backend() -> CairoBackend {
        let surface = ImageSurface::create(Format::ARgb32, 64, 64).expect("surface");
        let context = Context::new(&surface).expect("context");
        CairoBackend::for_screen(&context)
    }

    #[test]
    fn multi_line_text_grows_measured_height() {
        let backend = backend();
        let font = FontSpec::sized(12.0);
        let one = backend.measure_text("a", &font).expect("measure");
        let three = backend.measure_text("a\nb\r\nc", &font).expect("measure");
        assert!(three.height > one.height * 2.0);
    }

    #[test]
    fn clip_pop_without_push_faults() {
        let mut backend = backend();
        assert!(matches!(backend.pop_clip(), Err(PlotError::Backend(_))));
        backend
            .push_clip(ScreenRect::new(0.0, 0.0, 10.0, 10.0))
            .expect("push");
        assert_eq!(backend.clip_depth(), 1);
        backend.pop_clip().expect("pop");
        assert_eq!(backend.clip_depth(), 0);
    }
}
