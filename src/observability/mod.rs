//! Observability subsystem for folio
//!
//! - Structured logging (JSON lines on stderr)
//! - Operation counters
//! - Lifecycle event tracing
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on catalog state
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use folio::observability::{log_event_with_fields, Event, ObservationScope};
//!
//! log_event_with_fields(Event::RecordInserted, &[("id", "#3")]);
//!
//! let scope = ObservationScope::new("LOAD_RECORDS");
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, ParseSeverityError, Severity};
pub use metrics::{CatalogMetrics, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log a lifecycle event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
