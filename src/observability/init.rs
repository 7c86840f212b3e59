//! Subscriber setup: `EnvFilter` plus the OpenTelemetry layer.

use opentelemetry::trace::TracerProvider as _;
use tracing_opentelemetry::OpenTelemetryLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::file_writer::RotationPolicy;
use super::tracer::{self, SERVICE_NAME};
use crate::domain::error::Result;
use crate::Config;

/// File name of the span log inside the data directory.
pub const TRACE_FILE_NAME: &str = "arc-launcher-otlp.json";

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.trace_level`, which defaults to `info`. Spans are
/// written to [`TRACE_FILE_NAME`] in the configured data directory. Calling this a
/// second time leaves the first subscriber in place.
///
/// # Errors
///
/// Returns an error if the data directory cannot be created.
///
/// # Examples
///
/// ```no_run
/// use arc_launcher::observability::init_tracing;
/// use arc_launcher::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
/// init_tracing(&config)?;
/// tracing::debug!("tracing is now active");
/// # Ok::<(), arc_launcher::LauncherError>(())
/// ```
pub fn init_tracing(config: &Config) -> Result<()> {
    let level = config.trace_level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let data_dir = config.resolved_data_dir();
    std::fs::create_dir_all(&data_dir)?;

    let provider = tracer::create_tracer_provider(data_dir.join(TRACE_FILE_NAME), RotationPolicy::default());
    let otel_layer = OpenTelemetryLayer::new(provider.tracer(SERVICE_NAME));

    if tracing_subscriber::registry().with(filter).with(otel_layer).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
