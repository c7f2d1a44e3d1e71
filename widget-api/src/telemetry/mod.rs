//! Widget API Telemetry
//!
//! Structured logging setup and per-request instrumentation.

pub mod middleware;
pub mod tracer;

pub use middleware::observability_middleware;
pub use tracer::{init_tracer, LogFormat, TelemetryConfig};
