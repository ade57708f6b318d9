//! File exporters on top of [`CairoBackend`].
//!
//! Documents are produced into memory first; the caller's stream only sees
//! bytes once the whole pass succeeded.

use std::io::Write;

use cairo::{Context, Format, ImageSurface, PdfSurface};
use tracing::debug;

use crate::core::ScreenRect;
use crate::error::{PlotError, PlotResult};
use crate::render::{CairoBackend, RenderTarget};

use super::plot_model::PlotModel;
use super::render_pipeline::{PassOptions, RenderResult};

fn export_options() -> PassOptions {
    PassOptions::default().with_update_data(true)
}

fn map_export_error(prefix: &str, err: impl std::fmt::Display) -> PlotError {
    PlotError::Export(format!("{prefix}: {err}"))
}

/// Raster export to PNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngExporter {
    pub width: u32,
    pub height: u32,
}

impl PngExporter {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Renders `model` and writes the encoded image to `stream`.
    pub fn export<W: Write + ?Sized>(&self, model: &mut PlotModel, stream: &mut W) -> PlotResult<RenderResult> {
        let (bytes, result) = self.export_to_bytes(model)?;
        stream.write_all(&bytes)?;
        Ok(result)
    }

    pub fn export_to_bytes(&self, model: &mut PlotModel) -> PlotResult<(Vec<u8>, RenderResult)> {
        let (width, height) = checked_size(self.width, self.height)?;
        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_export_error("failed to create image surface", err))?;
        let result = {
            let context = Context::new(&surface)
                .map_err(|err| map_export_error("failed to create cairo context", err))?;
            let mut backend = CairoBackend::new(context, RenderTarget::ScreenRaster);
            let bounds = ScreenRect::new(0.0, 0.0, f64::from(width), f64::from(height));
            model.render_pass(&mut backend, bounds, &export_options())?
        };

        let mut bytes = Vec::new();
        surface
            .write_to_png(&mut bytes)
            .map_err(|err| map_export_error("failed to encode png", err))?;
        debug!(width, height, bytes = bytes.len(), "png export finished");
        Ok((bytes, result))
    }
}

/// Vector export to PDF; sizes are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfExporter {
    pub width: f64,
    pub height: f64,
}

impl PdfExporter {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn export<W: Write + ?Sized>(&self, model: &mut PlotModel, stream: &mut W) -> PlotResult<RenderResult> {
        let (bytes, result) = self.export_to_bytes(model)?;
        stream.write_all(&bytes)?;
        Ok(result)
    }

    pub fn export_to_bytes(&self, model: &mut PlotModel) -> PlotResult<(Vec<u8>, RenderResult)> {
        if !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0) {
            return Err(PlotError::Export(format!(
                "pdf page size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        let surface = PdfSurface::for_stream(self.width, self.height, Vec::<u8>::new())
            .map_err(|err| map_export_error("failed to create pdf surface", err))?;
        let result = {
            let context = Context::new(&surface)
                .map_err(|err| map_export_error("failed to create cairo context", err))?;
            let mut backend = CairoBackend::new(context, RenderTarget::VectorGraphic);
            let bounds = ScreenRect::new(0.0, 0.0, self.width, self.height);
            model.render_pass(&mut backend, bounds, &export_options())?
        };

        let stream = surface
            .finish_output_stream()
            .map_err(|err| map_export_error("failed to finish pdf", err))?;
        let bytes = stream
            .downcast::<Vec<u8>>()
            .map_err(|_| PlotError::Export("pdf stream has an unexpected type".to_owned()))?;
        debug!(bytes = bytes.len(), "pdf export finished");
        Ok((*bytes, result))
    }
}

fn checked_size(width: u32, height: u32) -> PlotResult<(i32, i32)> {
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(PlotError::InvalidViewport { width, height }),
    }
}
