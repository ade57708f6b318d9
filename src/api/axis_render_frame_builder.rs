use crate::core::axis_manager::AXIS_LABEL_SPACING;
use crate::core::axis_ticks::generate_ticks;
use crate::core::{Axis, AxisPosition, ScreenPoint, ScreenRect};
use crate::render::{
    Color, EdgeRenderingMode, FontSpec, HorizontalAlign, RenderFrame, Stroke, TextCommand,
    VerticalAlign,
};

use super::plot_model::PlotModel;

const AXIS_LINE_COLOR: Color = Color::BLACK;
const GRIDLINE_COLOR: Color = Color::rgba(0.0, 0.0, 0.0, 0.12);

/// Screen geometry of one axis, relative to the plot area.
#[derive(Debug, Clone, Copy)]
struct AxisRenderContext {
    position: AxisPosition,
    plot_area: ScreenRect,
    /// Coordinate of the axis line across its orientation.
    line: f64,
    /// +1 when labels grow towards increasing screen coordinates.
    outward: f64,
}

impl AxisRenderContext {
    fn new(axis: &Axis, plot_area: ScreenRect) -> Option<Self> {
        let offset = axis.layout().edge_offset;
        let (line, outward) = match axis.position() {
            AxisPosition::Left => (plot_area.left - offset, -1.0),
            AxisPosition::Right => (plot_area.right() + offset, 1.0),
            AxisPosition::Top => (plot_area.top - offset, -1.0),
            AxisPosition::Bottom => (plot_area.bottom() + offset, 1.0),
            AxisPosition::None => return None,
        };
        Some(Self {
            position: axis.position(),
            plot_area,
            line,
            outward,
        })
    }

    fn is_vertical(self) -> bool {
        matches!(self.position, AxisPosition::Left | AxisPosition::Right)
    }

    /// Point at `along` on the axis line, shifted `across` outwards.
    fn point(self, along: f64, across: f64) -> ScreenPoint {
        let across = self.line + across * self.outward;
        if self.is_vertical() {
            ScreenPoint::new(across, along)
        } else {
            ScreenPoint::new(along, across)
        }
    }

    fn contains_along(self, along: f64) -> bool {
        let (low, high) = if self.is_vertical() {
            (self.plot_area.top, self.plot_area.bottom())
        } else {
            (self.plot_area.left, self.plot_area.right())
        };
        along >= low - 0.5 && along <= high + 0.5
    }

    fn gridline(self, along: f64) -> [ScreenPoint; 2] {
        let area = self.plot_area;
        if self.is_vertical() {
            [ScreenPoint::new(area.left, along), ScreenPoint::new(area.right(), along)]
        } else {
            [ScreenPoint::new(along, area.top), ScreenPoint::new(along, area.bottom())]
        }
    }

    fn label_alignment(self) -> (HorizontalAlign, VerticalAlign) {
        match self.position {
            AxisPosition::Left => (HorizontalAlign::Right, VerticalAlign::Middle),
            AxisPosition::Right => (HorizontalAlign::Left, VerticalAlign::Middle),
            AxisPosition::Top => (HorizontalAlign::Center, VerticalAlign::Bottom),
            AxisPosition::Bottom | AxisPosition::None => (HorizontalAlign::Center, VerticalAlign::Top),
        }
    }
}

impl PlotModel {
    /// Gridlines, axis lines, ticks, labels and titles of every visible
    /// positioned axis.
    pub(super) fn append_axis_commands(&self, frame: &mut RenderFrame) {
        for axis in &self.axes {
            if !axis.is_visible() {
                continue;
            }
            let Some(context) = AxisRenderContext::new(axis, frame.plot_area) else {
                continue;
            };
            append_axis(frame, axis, context);
        }
    }
}

fn append_axis(frame: &mut RenderFrame, axis: &Axis, context: AxisRenderContext) {
    let ticks = generate_ticks(axis)
        .into_iter()
        .filter(|tick| context.contains_along(tick.screen))
        .collect::<Vec<_>>();

    if axis.show_major_gridlines && axis.layout().edge_offset == 0.0 {
        for tick in &ticks {
            frame.push_line(
                context.gridline(tick.screen).to_vec(),
                Stroke::solid(GRIDLINE_COLOR, 1.0),
                EdgeRenderingMode::Automatic,
            );
        }
    }

    let layout = axis.layout();
    let axis_stroke = Stroke::solid(AXIS_LINE_COLOR, 1.0);
    frame.push_line(
        vec![
            context.point(layout.screen_start, 0.0),
            context.point(layout.screen_end, 0.0),
        ],
        axis_stroke,
        EdgeRenderingMode::Automatic,
    );

    let font = FontSpec::sized(axis.font_size);
    let (h_align, v_align) = context.label_alignment();
    for tick in ticks {
        frame.push_line(
            vec![
                context.point(tick.screen, 0.0),
                context.point(tick.screen, axis.tick_length),
            ],
            axis_stroke,
            EdgeRenderingMode::Automatic,
        );
        frame.push_text(
            TextCommand::new(
                context.point(tick.screen, axis.tick_length + AXIS_LABEL_SPACING),
                tick.label,
                font.clone(),
                Color::BLACK,
            )
            .aligned(h_align, v_align),
        );
    }

    if let Some(title) = axis.title() {
        let middle = (layout.screen_start + layout.screen_end) * 0.5;
        let anchor = context.point(middle, layout.desired_size);
        let (rotation, v_align) = match context.position {
            AxisPosition::Left => (-90.0, VerticalAlign::Top),
            AxisPosition::Right => (90.0, VerticalAlign::Top),
            AxisPosition::Top => (0.0, VerticalAlign::Top),
            AxisPosition::Bottom | AxisPosition::None => (0.0, VerticalAlign::Bottom),
        };
        frame.push_text(
            TextCommand::new(anchor, title, font, Color::BLACK)
                .aligned(HorizontalAlign::Center, v_align)
                .rotated(rotation),
        );
    }
}
