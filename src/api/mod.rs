mod axis_render_frame_builder;
#[cfg(feature = "cairo-backend")]
pub mod export;
mod invalidation;
mod plot_model;
mod plot_view;
mod render_pipeline;
mod series_projection;

pub use invalidation::{
    InvalidationCoordinator, InvalidationLevel, PassTicket, RedrawState, RedrawWaker,
};
pub use plot_model::{LegendPosition, LegendSettings, PlotModel, PlotSettings, SharedPlotModel};
pub use plot_view::{PassOutcome, PlotView};
pub use render_pipeline::{PassOptions, RenderResult};

#[cfg(feature = "cairo-backend")]
pub use export::{PdfExporter, PngExporter};
