//! Telemetry helpers for applications embedding `plot-rs`.
//!
//! The render pipeline, invalidation coordinator and exporters emit `tracing`
//! events under the `plot_rs` target. Hosts either call
//! [`init_default_tracing`] or install their own subscriber and filters.

/// Filter applied when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,plot_rs=info";

/// Initializes a compact `tracing` subscriber when the `telemetry` feature is
/// enabled.
///
/// Returns `true` when initialization succeeds. Returns `false` when the
/// feature is disabled or a global subscriber was already installed by the
/// host application.
#[must_use]
pub fn init_default_tracing() -> bool {
    #[cfg(feature = "telemetry")]
    {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER)),
            )
            .with_target(true)
            .compact();

        return builder.try_init().is_ok();
    }

    #[cfg(not(feature = "telemetry"))]
    {
        false
    }
}
