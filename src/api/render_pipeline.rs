use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{AnnotationLayer, AxisManager, ScreenPoint, ScreenRect, SeriesAxes, TrackerHit};
use crate::error::PlotResult;
use crate::render::{
    Color, DrawCommand, EdgeRenderingMode, FontSpec, HorizontalAlign, LineStyle, RenderBackend,
    RenderFrame, Stroke, TextCommand, TextSize, VerticalAlign, flush_frame,
};

use super::plot_model::{LegendPosition, PlotModel};

const TITLE_SPACING: f64 = 4.0;
const LEGEND_PADDING: f64 = 6.0;
const LEGEND_SWATCH_WIDTH: f64 = 16.0;
const LEGEND_MARGIN: f64 = 8.0;

/// Summary of one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderResult {
    pub commands: usize,
    pub plot_area: ScreenRect,
    /// Data points skipped because they were unplottable.
    pub dropped_points: usize,
    /// Polyline pieces emitted after clipping.
    pub clipped_pieces: usize,
}

impl RenderResult {
    fn from_frame(frame: &RenderFrame) -> Self {
        Self {
            commands: frame.commands.len(),
            plot_area: frame.plot_area,
            dropped_points: frame.dropped_points,
            clipped_pieces: frame.clipped_pieces,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands == 0
    }
}

/// Per-pass switches chosen by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassOptions {
    /// Pull series data sources before the pass.
    pub update_data: bool,
    /// Tracker overlay drawn above everything else.
    pub tracker: Option<TrackerHit>,
}

impl PassOptions {
    #[must_use]
    pub fn with_update_data(mut self, update_data: bool) -> Self {
        self.update_data = update_data;
        self
    }

    #[must_use]
    pub fn with_tracker(mut self, tracker: Option<TrackerHit>) -> Self {
        self.tracker = tracker;
        self
    }
}

impl PlotModel {
    /// Renders the model to `backend` inside `bounds`.
    ///
    /// The whole frame is built before the first command reaches the
    /// backend. A fault is kept in [`PlotModel::last_render_error`] until the
    /// next successful pass and is also returned.
    pub fn render<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        bounds: ScreenRect,
    ) -> PlotResult<RenderResult> {
        self.render_pass(backend, bounds, &PassOptions::default())
    }

    pub fn render_pass<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        bounds: ScreenRect,
        options: &PassOptions,
    ) -> PlotResult<RenderResult> {
        let outcome = self.run_pass(backend, bounds, options);
        match &outcome {
            Ok(result) => {
                self.last_render_error = None;
                debug!(
                    commands = result.commands,
                    dropped_points = result.dropped_points,
                    clipped_pieces = result.clipped_pieces,
                    "render pass finished"
                );
            }
            Err(err) => {
                warn!(error = %err, "render pass faulted");
                self.last_render_error = Some(err.clone());
            }
        }
        outcome
    }

    fn run_pass<B: RenderBackend + ?Sized>(
        &mut self,
        backend: &mut B,
        bounds: ScreenRect,
        options: &PassOptions,
    ) -> PlotResult<RenderResult> {
        debug!(
            width = bounds.width,
            height = bounds.height,
            update_data = options.update_data,
            "render pass started"
        );
        if bounds.is_empty() {
            self.update(options.update_data);
            return Ok(RenderResult {
                plot_area: ScreenRect::new(bounds.left, bounds.top, 0.0, 0.0),
                ..RenderResult::default()
            });
        }

        let frame = self.build_render_frame(bounds, options, |text, font| {
            if font.is_visible() {
                backend.measure_text(text, font)
            } else {
                Ok(TextSize::default())
            }
        })?;
        if frame.dropped_points > 0 {
            warn!(dropped_points = frame.dropped_points, "unplottable points dropped");
        }
        flush_frame(&frame, backend)?;
        Ok(RenderResult::from_frame(&frame))
    }

    /// Builds the complete command list of one pass without drawing it.
    ///
    /// Fails only on configuration errors (duplicate or unknown axis keys)
    /// and on text measurement faults reported through `measure`.
    pub fn build_render_frame<M>(
        &mut self,
        bounds: ScreenRect,
        options: &PassOptions,
        mut measure: M,
    ) -> PlotResult<RenderFrame>
    where
        M: FnMut(&str, &FontSpec) -> PlotResult<TextSize>,
    {
        self.update(options.update_data);

        let manager = AxisManager::from_axes(&self.axes)?;
        let series_axes = self
            .series
            .iter()
            .map(|series| manager.series_axes(series))
            .collect::<PlotResult<Vec<_>>>()?;
        let annotation_axes = self
            .annotations
            .iter()
            .map(|annotation| {
                manager.annotation_axes(annotation.x_axis_key.as_deref(), annotation.y_axis_key.as_deref())
            })
            .collect::<PlotResult<Vec<_>>>()?;

        manager.resolve_ranges(&mut self.axes, &self.series, &series_axes);
        let title_height = self.title_block_height(&mut measure)?;
        let plot_area = manager.assign_screen_extents(
            &mut self.axes,
            bounds,
            self.settings.padding,
            title_height,
            &mut measure,
        )?;
        self.plot_area = plot_area;
        self.series_axes = series_axes;

        let mut frame = RenderFrame::new(bounds);
        frame.plot_area = plot_area;

        frame.push_rect(bounds, Some(self.settings.background), None, EdgeRenderingMode::PreferSpeed);
        self.append_annotation_layer(&mut frame, AnnotationLayer::BelowAxes, &annotation_axes);
        self.append_axis_commands(&mut frame);
        self.append_annotation_layer(&mut frame, AnnotationLayer::BelowSeries, &annotation_axes);
        self.append_series_commands(&mut frame);
        self.append_annotation_layer(&mut frame, AnnotationLayer::AboveSeries, &annotation_axes);
        if let Some(border) = self.settings.plot_area_border {
            frame.push_rect(plot_area, None, Some(border), EdgeRenderingMode::Automatic);
        }
        self.append_title(&mut frame, &mut measure)?;
        self.append_legend(&mut frame, &mut measure)?;
        if let Some(hit) = &options.tracker {
            append_tracker(&mut frame, hit, &mut measure)?;
        }

        frame.validate()?;
        Ok(frame)
    }

    fn append_annotation_layer(
        &self,
        frame: &mut RenderFrame,
        layer: AnnotationLayer,
        bindings: &[SeriesAxes],
    ) {
        let mut opened = false;
        for (annotation, binding) in self.annotations.iter().zip(bindings) {
            if annotation.layer() != layer {
                continue;
            }
            if !opened {
                frame.push(DrawCommand::ClipPush(frame.plot_area));
                opened = true;
            }
            annotation.emit(&self.axes, *binding, frame.plot_area, frame);
        }
        if opened {
            frame.push(DrawCommand::ClipPop);
        }
    }

    fn title_fonts(&self) -> (FontSpec, FontSpec) {
        (
            FontSpec::sized(self.settings.title_font_size).bold(),
            FontSpec::sized(self.settings.subtitle_font_size),
        )
    }

    fn title_block_height<M>(&self, measure: &mut M) -> PlotResult<f64>
    where
        M: FnMut(&str, &FontSpec) -> PlotResult<TextSize>,
    {
        let (title_font, subtitle_font) = self.title_fonts();
        let mut height = 0.0;
        if let Some(title) = &self.settings.title {
            height += measure(title, &title_font)?.height + TITLE_SPACING;
        }
        if let Some(subtitle) = &self.settings.subtitle {
            height += measure(subtitle, &subtitle_font)?.height + TITLE_SPACING;
        }
        Ok(height)
    }

    fn append_title<M>(&self, frame: &mut RenderFrame, measure: &mut M) -> PlotResult<()>
    where
        M: FnMut(&str, &FontSpec) -> PlotResult<TextSize>,
    {
        let (title_font, subtitle_font) = self.title_fonts();
        let x = frame.plot_area.center().x;
        let mut y = frame.bounds.top + self.settings.padding.top;
        for (text, font) in [
            (self.settings.title.as_ref(), title_font),
            (self.settings.subtitle.as_ref(), subtitle_font),
        ] {
            let Some(text) = text else {
                continue;
            };
            let height = measure(text, &font)?.height;
            frame.push_text(
                TextCommand::new(ScreenPoint::new(x, y), text.clone(), font, Color::BLACK)
                    .aligned(HorizontalAlign::Center, VerticalAlign::Top),
            );
            y += height + TITLE_SPACING;
        }
        Ok(())
    }

    fn append_legend<M>(&self, frame: &mut RenderFrame, measure: &mut M) -> PlotResult<()>
    where
        M: FnMut(&str, &FontSpec) -> PlotResult<TextSize>,
    {
        let legend = &self.settings.legend;
        if !legend.is_visible {
            return Ok(());
        }
        let font = FontSpec::sized(legend.font_size);
        let mut entries = Vec::new();
        for (index, series) in self.series.iter().enumerate() {
            let Some(title) = series.title().filter(|_| series.is_visible()) else {
                continue;
            };
            let size = measure(title, &font)?;
            entries.push((title.to_owned(), series.resolved_color(index), size));
        }
        if entries.is_empty() {
            return Ok(());
        }

        let text_width = entries.iter().map(|(_, _, size)| size.width).fold(0.0, f64::max);
        let width = LEGEND_PADDING * 3.0 + LEGEND_SWATCH_WIDTH + text_width;
        let height = entries.iter().map(|(_, _, size)| size.height + LEGEND_PADDING).sum::<f64>()
            + LEGEND_PADDING;
        let area = frame.plot_area;
        let left = match legend.position {
            LegendPosition::TopLeft | LegendPosition::BottomLeft => area.left + LEGEND_MARGIN,
            LegendPosition::TopRight | LegendPosition::BottomRight => area.right() - LEGEND_MARGIN - width,
        };
        let top = match legend.position {
            LegendPosition::TopLeft | LegendPosition::TopRight => area.top + LEGEND_MARGIN,
            LegendPosition::BottomLeft | LegendPosition::BottomRight => area.bottom() - LEGEND_MARGIN - height,
        };
        frame.push_rect(
            ScreenRect::new(left, top, width, height),
            Some(legend.background),
            legend.border,
            EdgeRenderingMode::Automatic,
        );

        let mut y = top + LEGEND_PADDING;
        for (title, color, size) in entries {
            let middle = y + size.height * 0.5;
            let swatch_left = left + LEGEND_PADDING;
            frame.push_line(
                vec![
                    ScreenPoint::new(swatch_left, middle),
                    ScreenPoint::new(swatch_left + LEGEND_SWATCH_WIDTH, middle),
                ],
                Stroke::solid(color, 2.0),
                EdgeRenderingMode::Automatic,
            );
            frame.push_text(
                TextCommand::new(
                    ScreenPoint::new(swatch_left + LEGEND_SWATCH_WIDTH + LEGEND_PADDING, y),
                    title,
                    font.clone(),
                    Color::BLACK,
                ),
            );
            y += size.height + LEGEND_PADDING;
        }
        Ok(())
    }
}

fn append_tracker<M>(frame: &mut RenderFrame, hit: &TrackerHit, measure: &mut M) -> PlotResult<()>
where
    M: FnMut(&str, &FontSpec) -> PlotResult<TextSize>,
{
    let area = frame.plot_area;
    let position = hit.position;
    if !area.contains(position) {
        return Ok(());
    }
    let stroke = Stroke::solid(Color::rgba(0.0, 0.0, 0.0, 0.6), 1.0).with_line_style(LineStyle::Dash);
    frame.push_line(
        vec![ScreenPoint::new(area.left, position.y), ScreenPoint::new(area.right(), position.y)],
        stroke,
        EdgeRenderingMode::Automatic,
    );
    frame.push_line(
        vec![ScreenPoint::new(position.x, area.top), ScreenPoint::new(position.x, area.bottom())],
        stroke,
        EdgeRenderingMode::Automatic,
    );

    let text = hit.text();
    let font = FontSpec::default();
    let size = measure(&text, &font)?;
    let box_width = size.width + LEGEND_PADDING * 2.0;
    let box_height = size.height + LEGEND_PADDING * 2.0;
    let left = if position.x + box_width + LEGEND_MARGIN > area.right() {
        position.x - box_width - LEGEND_MARGIN
    } else {
        position.x + LEGEND_MARGIN
    };
    let top = if position.y - box_height - LEGEND_MARGIN < area.top {
        position.y + LEGEND_MARGIN
    } else {
        position.y - box_height - LEGEND_MARGIN
    };
    frame.push_rect(
        ScreenRect::new(left, top, box_width, box_height),
        Some(Color::rgb(1.0, 1.0, 0.88)),
        Some(Stroke::solid(Color::BLACK, 1.0)),
        EdgeRenderingMode::Automatic,
    );
    frame.push_text(TextCommand::new(
        ScreenPoint::new(left + LEGEND_PADDING, top + LEGEND_PADDING),
        text,
        font,
        Color::BLACK,
    ));
    Ok(())
}
