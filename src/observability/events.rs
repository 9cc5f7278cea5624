//! Observability events for folio
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable catalog events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Catalog constructed
    CatalogCreated,
    /// Configuration loaded
    ConfigLoaded,
    /// Record file parsed and inserted
    RecordsLoaded,

    // Mutations
    /// Record filed in every index
    RecordInserted,
    /// Record failed validation or was a duplicate
    RecordRejected,
    /// Record removed from every index
    RecordRemoved,

    // Reads
    /// Query served
    QueryExecuted,

    // Integrity
    /// Structure check failed after a mutation (FATAL)
    InvariantViolation,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CatalogCreated => "CATALOG_CREATED",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::RecordsLoaded => "RECORDS_LOADED",
            Event::RecordInserted => "RECORD_INSERTED",
            Event::RecordRejected => "RECORD_REJECTED",
            Event::RecordRemoved => "RECORD_REMOVED",
            Event::QueryExecuted => "QUERY_EXECUTED",
            Event::InvariantViolation => "INVARIANT_VIOLATION",
        }
    }

    /// Returns true if this event indicates a fatal condition
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::InvariantViolation)
    }

    /// Severity an event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::InvariantViolation => Severity::Fatal,
            Event::RecordRejected => Severity::Warn,
            Event::QueryExecuted => Severity::Trace,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Event; 8] = [
        Event::CatalogCreated,
        Event::ConfigLoaded,
        Event::RecordsLoaded,
        Event::RecordInserted,
        Event::RecordRejected,
        Event::RecordRemoved,
        Event::QueryExecuted,
        Event::InvariantViolation,
    ];

    #[test]
    fn test_all_events_have_string_representation() {
        for event in ALL {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_only_invariant_violation_is_fatal() {
        for event in ALL {
            assert_eq!(event.is_fatal(), event == Event::InvariantViolation);
            assert_eq!(event.is_fatal(), event.severity() == Severity::Fatal);
        }
    }

    #[test]
    fn test_event_display() {
        assert_eq!(format!("{}", Event::RecordInserted), "RECORD_INSERTED");
        assert_eq!(format!("{}", Event::RecordsLoaded), "RECORDS_LOADED");
    }
}
