//! Best-effort synchronization of reviewed events into Google
//! Calendar: resolve (or create) the target calendar once, then insert
//! events independently so one failure never aborts the rest.

use futures::{StreamExt, stream};
use serde::Serialize;
use thiserror::Error;

use crate::ai::extract::ExtractedEvent;
use crate::auth::{AuthManager, Credential, CredentialState};
use crate::google::oauth;
use crate::google::gcal::{
    self, CALENDAR_DESCRIPTION_MAX_LEN, CALENDAR_SUMMARY_MAX_LEN, CalendarEventRecord, EventDate,
    EventReminders, ReminderOverride,
};
use crate::schedule::session::DEFAULT_CALENDAR_LABEL;

const CALENDAR_DESCRIPTION: &str = "All syllabus-related events";

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No Google Calendar connection. Connect your calendar and try again.")]
    AuthMissing,
    #[error("The Google Calendar connection has expired. Reconnect your calendar and try again.")]
    AuthExpired,
    #[error("Could not prepare the target calendar: {0}")]
    ContainerResolution(anyhow::Error),
}

/// Outcome of one event's insertion attempt.
#[derive(Debug, Clone, Serialize)]
pub struct EventOutcome {
    pub success: bool,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate result of one synchronization call. Read-only to
/// callers; outcomes keep the order of the submitted events.
#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub calendar_id: String,
    pub total_events: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub outcomes: Vec<EventOutcome>,
}

/// The label actually used for the calendar: the caller's label unless
/// it is blank, truncated to the remote limit.
pub(crate) fn effective_label(label: &str) -> String {
    let label = label.trim();
    let label = if label.is_empty() {
        DEFAULT_CALENDAR_LABEL
    } else {
        label
    };
    label.chars().take(CALENDAR_SUMMARY_MAX_LEN).collect()
}

/// Map a reviewed event to the remote record: an all-day event titled
/// "<type>: <description>" with one email reminder a day ahead and one
/// popup an hour ahead.
pub fn to_calendar_record(event: &ExtractedEvent) -> CalendarEventRecord {
    CalendarEventRecord {
        summary: format!("{}: {}", event.r#type, event.description),
        description: None,
        start: EventDate {
            date: event.date.clone(),
        },
        end: EventDate {
            date: event.date.clone(),
        },
        reminders: EventReminders {
            use_default: false,
            overrides: vec![
                ReminderOverride {
                    method: "email".to_string(),
                    minutes: 24 * 60,
                },
                ReminderOverride {
                    method: "popup".to_string(),
                    minutes: 60,
                },
            ],
        },
    }
}

/// Find the calendar whose label matches exactly, creating it only
/// when absent. Repeated syncs of the same document reuse the same
/// calendar instead of creating duplicates.
async fn resolve_calendar(
    api_base: &str,
    access_token: &str,
    label: &str,
) -> Result<String, anyhow::Error> {
    let calendars = gcal::list_calendars(api_base, access_token).await?;
    if let Some(existing) = calendars.into_iter().find(|entry| entry.summary == label) {
        tracing::debug!(calendar_id = %existing.id, "Reusing existing calendar");
        return Ok(existing.id);
    }

    let description: String = CALENDAR_DESCRIPTION
        .chars()
        .take(CALENDAR_DESCRIPTION_MAX_LEN)
        .collect();
    let created = gcal::create_calendar(api_base, access_token, label, &description).await?;
    tracing::debug!(calendar_id = %created.id, "Created calendar");
    Ok(created.id)
}

/// Resolve an expired credential at call time: a single refresh
/// attempt when a refresh token is present, failing closed (still
/// expired) on any error. Never loops.
pub async fn refresh_expired_credential(
    manager: &AuthManager,
    client_id: &str,
    client_secret: &str,
    credential: Credential,
    now_ms: i64,
) -> CredentialState {
    let Some(refresh_token) = credential.refresh_token.clone() else {
        return CredentialState::Expired(credential);
    };

    match oauth::refresh_access_token(client_id, client_secret, &refresh_token).await {
        Ok(token) => {
            let refreshed = Credential {
                access_token: token.access_token,
                refresh_token: Some(refresh_token),
                scope: token.scope.unwrap_or(credential.scope),
                token_type: token.token_type.unwrap_or(credential.token_type),
                expiry_ms: token.expires_in.map(|secs| now_ms + secs * 1000),
            };
            if let Err(err) = manager.store_credential(&refreshed).await {
                tracing::error!("Failed to persist refreshed credential: {}", err);
            }
            CredentialState::Valid(refreshed)
        }
        Err(err) => {
            tracing::warn!("Access token refresh failed: {}", err);
            CredentialState::Expired(credential)
        }
    }
}

/// Synchronize reviewed events into the calendar named by `label`.
///
/// Fails as a whole only when authorization is missing/expired or the
/// calendar cannot be resolved. Individual insert failures are
/// recorded in the result and never abort the rest of the batch.
pub async fn sync_events(
    api_base: &str,
    credential: CredentialState,
    events: &[ExtractedEvent],
    label: &str,
) -> Result<SyncResult, SyncError> {
    let credential = match credential {
        CredentialState::Missing => return Err(SyncError::AuthMissing),
        CredentialState::Expired(_) => return Err(SyncError::AuthExpired),
        CredentialState::Valid(credential) => credential,
    };

    let label = effective_label(label);
    let calendar_id = resolve_calendar(api_base, &credential.access_token, &label)
        .await
        .map_err(SyncError::ContainerResolution)?;

    // One independent insertion per event, joined back in input order.
    // Insertions run one at a time to keep failure attribution simple.
    let outcomes: Vec<EventOutcome> = stream::iter(events)
        .then(|event| {
            let access_token = credential.access_token.clone();
            let calendar_id = calendar_id.clone();
            async move {
                let record = to_calendar_record(event);
                let summary = record.summary.clone();
                match gcal::insert_event(api_base, &access_token, &calendar_id, &record).await {
                    Ok(inserted) => EventOutcome {
                        success: true,
                        summary,
                        event_id: Some(inserted.id),
                        error: None,
                    },
                    Err(err) => {
                        tracing::warn!(summary = %summary, "Event insert failed: {}", err);
                        EventOutcome {
                            success: false,
                            summary,
                            event_id: None,
                            error: Some(err.to_string()),
                        }
                    }
                }
            }
        })
        .collect()
        .await;

    let success_count = outcomes.iter().filter(|outcome| outcome.success).count();
    Ok(SyncResult {
        calendar_id,
        total_events: events.len(),
        success_count,
        failure_count: events.len() - success_count,
        outcomes,
    })
}
