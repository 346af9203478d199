//! Observability subsystem
//!
//! - Structured logging (JSON, stderr)
//! - Monotonic counters
//! - Typed lifecycle events
//!
//! # Usage
//!
//! ```ignore
//! use armorscan::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::EnvelopeLocated, &[("source_id", "abc")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_inputs_received();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{min_severity, set_min_severity, Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
