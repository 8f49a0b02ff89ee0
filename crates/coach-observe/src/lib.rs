//! Observability setup for the coaching backend: structured logging via
//! `tracing` with optional OpenTelemetry span export.

pub mod tracing_setup;
