//! Validation and chronological ordering of extracted events. Runs
//! before presentation and before synchronization.

use chrono::NaiveDate;

use crate::ai::extract::ExtractedEvent;

/// An entry the normalizer refused, with the reason it was refused.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEvent {
    pub event: ExtractedEvent,
    pub reason: &'static str,
}

/// Valid events sorted ascending by date plus the entries that were
/// rejected. Rejection is explicit: nothing is silently dropped or
/// auto-corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedEvents {
    pub events: Vec<ExtractedEvent>,
    pub rejected: Vec<RejectedEvent>,
}

/// Parse an event date, requiring the full YYYY-MM-DD calendar form.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Validate and sort events ascending by date. Ties keep their input
/// order, and re-normalizing an already-normalized list is a no-op.
pub fn normalize_events(events: Vec<ExtractedEvent>) -> NormalizedEvents {
    let mut valid: Vec<(NaiveDate, ExtractedEvent)> = Vec::new();
    let mut rejected = Vec::new();

    for event in events {
        match parse_event_date(&event.date) {
            Some(_) if event.description.trim().is_empty() => rejected.push(RejectedEvent {
                event,
                reason: "empty description",
            }),
            Some(date) => valid.push((date, event)),
            None => rejected.push(RejectedEvent {
                event,
                reason: "unparseable date",
            }),
        }
    }

    // Stable sort preserves input order for equal dates
    valid.sort_by_key(|(date, _)| *date);

    NormalizedEvents {
        events: valid.into_iter().map(|(_, event)| event).collect(),
        rejected,
    }
}
