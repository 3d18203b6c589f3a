//! Public types for the calendar sync API
use serde::{Deserialize, Serialize};

use crate::ai::extract::ExtractedEvent;
use crate::auth::Credential;
use crate::sync::{EventOutcome, SyncResult};

#[derive(Deserialize)]
pub struct SyncRequest {
    pub events: Vec<ExtractedEvent>,
    /// Token bundle held by the client. When absent the stored
    /// credential slot is used instead.
    #[serde(default)]
    pub tokens: Option<Credential>,
    #[serde(default, rename = "courseName")]
    pub course_name: Option<String>,
}

#[derive(Serialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(rename = "calendarId")]
    pub calendar_id: String,
    #[serde(rename = "totalEvents")]
    pub total_events: usize,
    #[serde(rename = "successfulEvents")]
    pub successful_events: usize,
    #[serde(rename = "failedEvents")]
    pub failed_events: usize,
    pub results: Vec<EventOutcome>,
}

impl From<SyncResult> for SyncResponse {
    fn from(result: SyncResult) -> Self {
        Self {
            success: true,
            calendar_id: result.calendar_id,
            total_events: result.total_events,
            successful_events: result.success_count,
            failed_events: result.failure_count,
            results: result.outcomes,
        }
    }
}
