//! Background worker thread for persistence.
//!
//! All disk I/O happens here so pointer handling never blocks on a write.
//!
//! # Architecture
//!
//! - `messages`: Request/response protocol types with trace context propagation
//! - `handler`: Worker implementation and message processing logic
//! - `thread`: The worker thread and its channel handle

pub mod handler;
pub mod messages;
pub mod thread;

pub use handler::LauncherWorker;
pub use messages::{LoadSource, TraceContext, WorkerMessage, WorkerResponse};
pub use thread::{spawn, WorkerHandle};
