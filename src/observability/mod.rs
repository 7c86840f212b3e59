//! OpenTelemetry tracing with file-based span export.
//!
//! ```text
//! tracing spans → tracing-opentelemetry → SDK provider → FileSpanExporter → rotating JSON file
//! ```
//!
//! Spans land in `<data_dir>/arc-launcher-otlp.json`, one OTLP/JSON document per
//! line. The file rotates at 10 MB and the three newest backups are kept.
//!
//! The filter comes from `RUST_LOG` when set, otherwise from
//! [`Config::trace_level`](crate::Config::trace_level), otherwise `info`.

mod file_writer;
mod init;
mod span_formatter;
mod tracer;

pub use init::{init_tracing, TRACE_FILE_NAME};
