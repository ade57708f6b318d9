use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

/// Errors surfaced by model configuration, render passes and exporters.
///
/// Numeric degeneracies (NaN, infinities, values outside an axis filter range)
/// are never reported here; the pipeline drops such points instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("axis key `{key}` is referenced but no such axis exists")]
    UnknownAxisKey { key: String },

    #[error("axis key `{key}` is used by more than one axis")]
    DuplicateAxisKey { key: String },

    #[error("plot model is already bound to another view")]
    ModelAlreadyAttached,

    #[error("rendering backend fault: {0}")]
    Backend(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl PlotError {
    /// Returns `true` for faults caused by model configuration rather than by
    /// the backend.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownAxisKey { .. } | Self::DuplicateAxisKey { .. } | Self::InvalidData(_)
        )
    }
}

impl From<std::io::Error> for PlotError {
    fn from(err: std::io::Error) -> Self {
        Self::Export(err.to_string())
    }
}
