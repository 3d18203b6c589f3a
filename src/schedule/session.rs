//! The user-editable working copy of extracted events, held between
//! extraction and synchronization.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::ai::extract::ExtractedEvent;

/// Fallback calendar label when a document name yields nothing usable.
pub const DEFAULT_CALENDAR_LABEL: &str = "Syllabus Events";

/// Snapshot of an in-progress review, written right before the
/// authorization redirect so the round trip does not lose work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSyncState {
    pub events: Vec<ExtractedEvent>,
    pub source_document_name: String,
    pub calendar_label: String,
}

/// Working copy of a document's extracted events. Single writer; all
/// mutations are synchronous and no entry is ever auto-corrected.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    source_document_name: String,
    events: Vec<ExtractedEvent>,
    generation: u64,
}

impl ReviewSession {
    pub fn new(source_document_name: &str, events: Vec<ExtractedEvent>) -> Self {
        Self {
            source_document_name: source_document_name.to_string(),
            events,
            generation: 0,
        }
    }

    pub fn source_document_name(&self) -> &str {
        &self.source_document_name
    }

    pub fn events(&self) -> &[ExtractedEvent] {
        &self.events
    }

    /// Monotonic counter bumped on reset. Callers tag in-flight work
    /// with the generation they started from and discard results that
    /// resolve against a stale one.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Overwrite a single entry. Out-of-range indices are an error,
    /// never a panic.
    pub fn update_event(&mut self, index: usize, event: ExtractedEvent) -> Result<()> {
        if index >= self.events.len() {
            bail!("No event at index {}", index);
        }
        self.events[index] = event;
        Ok(())
    }

    /// Remove a single entry; the remaining entries keep their order.
    pub fn remove_event(&mut self, index: usize) -> Result<ExtractedEvent> {
        if index >= self.events.len() {
            bail!("No event at index {}", index);
        }
        Ok(self.events.remove(index))
    }

    /// Discard all events and return to the initial state.
    pub fn reset(&mut self) {
        self.events.clear();
        self.generation += 1;
    }

    /// Calendar label derived from the document name (extension
    /// stripped), falling back to the fixed default.
    pub fn calendar_label(&self) -> String {
        let stem = self
            .source_document_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.source_document_name)
            .trim();
        if stem.is_empty() {
            DEFAULT_CALENDAR_LABEL.to_string()
        } else {
            stem.to_string()
        }
    }

    pub fn pending_snapshot(&self) -> PendingSyncState {
        PendingSyncState {
            events: self.events.clone(),
            source_document_name: self.source_document_name.clone(),
            calendar_label: self.calendar_label(),
        }
    }

    /// Rebuild a session from a snapshot restored after the redirect
    /// round trip.
    pub fn from_snapshot(snapshot: PendingSyncState) -> Self {
        Self {
            source_document_name: snapshot.source_document_name,
            events: snapshot.events,
            generation: 0,
        }
    }
}
