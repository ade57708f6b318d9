//! plot-rs: a plot rendering pipeline.
//!
//! A [`PlotModel`] describes axes, series and annotations. Each render pass
//! resolves axis ranges, lays out the plot area, projects and clips data into
//! screen space and flushes an ordered list of drawing commands to a
//! [`render::RenderBackend`]. A [`PlotView`] hosts a model inside a toolkit,
//! coordinating redraws requested from any thread and dispatching input
//! through configurable bindings.

pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

#[cfg(feature = "gtk4-adapter")]
pub mod platform_gtk;

pub use api::{PlotModel, PlotView};
pub use error::{PlotError, PlotResult};
