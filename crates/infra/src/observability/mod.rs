//! Observability infrastructure
//!
//! Structured logging via `tracing`. Call [`init_logging`] once at startup;
//! library code only emits events and never installs a subscriber itself.

pub mod logging;

pub use logging::{build_filter, init_logging};
