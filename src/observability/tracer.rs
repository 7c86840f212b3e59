//! Span exporter that appends OTLP/JSON batches to a rotating file.
//!
//! Spans never leave the device. Each exported batch becomes one line of the trace
//! file, a complete OTLP/JSON document that standard OTLP tooling can replay.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::BoxFuture;
use opentelemetry::trace::TraceError;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::resource::Resource;
use opentelemetry_sdk::trace::TracerProvider;

use super::file_writer::{FileWriter, RotationPolicy};
use super::span_formatter::SpanFormatter;

/// Instrumentation scope and `service.name` of every exported span.
pub const SERVICE_NAME: &str = "arc-launcher";

/// OpenTelemetry exporter writing to a [`FileWriter`].
///
/// Batches are formatted with the launcher's resource attributes and scope, then
/// written as a single line. Once shut down, every further export fails.
#[derive(Debug)]
struct FileSpanExporter {
    /// Rotating trace file.
    writer: FileWriter,
    /// OTLP JSON formatter.
    formatter: SpanFormatter,
    /// Set by [`SpanExporter::shutdown`].
    is_shutdown: AtomicBool,
}

impl FileSpanExporter {
    /// # Parameters
    ///
    /// * `path` - Trace file to append to
    /// * `policy` - When to rotate it and how many backups to keep
    /// * `resource` - Resource attributes stamped on every batch
    fn new(path: PathBuf, policy: RotationPolicy, resource: Resource) -> Self {
        Self {
            writer: FileWriter::new(path, policy),
            formatter: SpanFormatter::new(resource, SERVICE_NAME),
            is_shutdown: AtomicBool::new(false),
        }
    }
}

impl SpanExporter for FileSpanExporter {
    /// Writes `batch` as one OTLP/JSON line.
    ///
    /// # Returns
    ///
    /// - `Ok(())` once the line is written
    /// - `Err(TraceError)` after shutdown, or if the write or rotation fails
    fn export(&mut self, batch: Vec<SpanData>) -> BoxFuture<'static, ExportResult> {
        let result = if self.is_shutdown.load(Ordering::SeqCst) {
            Err(TraceError::from("file exporter is shut down"))
        } else {
            let line = self.formatter.format_batch(&batch).to_string();
            self.writer
                .write_line(&line)
                .map_err(|e| TraceError::from(e.to_string()))
        };
        Box::pin(std::future::ready(result))
    }

    /// Stops accepting batches. The file itself is closed when the writer drops.
    fn shutdown(&mut self) {
        self.is_shutdown.store(true, Ordering::SeqCst);
    }
}

/// Builds a provider that exports every finished span straight to `path`.
///
/// Export is simple rather than batched: a span is on disk as soon as it ends,
/// so a launcher killed by the OS still leaves its last spans behind.
///
/// # Parameters
///
/// * `path` - Trace file, created on first write
/// * `policy` - Rotation size and backup count
///
/// # Returns
///
/// A `TracerProvider` ready to hand to `tracing-opentelemetry`, with
/// `service.name` set to [`SERVICE_NAME`].
pub fn create_tracer_provider(path: PathBuf, policy: RotationPolicy) -> TracerProvider {
    let resource = Resource::new(vec![opentelemetry::KeyValue::new("service.name", SERVICE_NAME)]);
    let exporter = FileSpanExporter::new(path, policy, resource.clone());

    TracerProvider::builder()
        .with_config(opentelemetry_sdk::trace::Config::default().with_resource(resource))
        .with_simple_exporter(exporter)
        .build()
}
