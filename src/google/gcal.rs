//! Google Calendar API client for listing calendars, creating
//! calendars, and inserting events.

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Production API base. Injectable at the call sites so tests can
/// point at a local server.
pub const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Remote limit on a calendar's summary (its label).
pub const CALENDAR_SUMMARY_MAX_LEN: usize = 100;
/// Remote limit on a calendar's description.
pub const CALENDAR_DESCRIPTION_MAX_LEN: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEntry {
    pub id: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub struct CalendarListResponse {
    pub items: Option<Vec<CalendarEntry>>,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventDate {
    pub date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderOverride {
    pub method: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventReminders {
    #[serde(rename = "useDefault")]
    pub use_default: bool,
    pub overrides: Vec<ReminderOverride>,
}

/// An all-day event record in the calendar API's wire format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEventRecord {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventDate,
    pub end: EventDate,
    pub reminders: EventReminders,
}

#[derive(Debug, Deserialize)]
pub struct InsertedEvent {
    pub id: String,
    #[serde(rename = "htmlLink")]
    pub html_link: Option<String>,
}

/// List every calendar accessible under the token, following
/// pagination.
pub async fn list_calendars(api_base: &str, access_token: &str) -> Result<Vec<CalendarEntry>> {
    let client = Client::new();
    let mut calendars = Vec::new();
    let mut page_token: Option<String> = None;

    loop {
        let mut url = format!("{}/users/me/calendarList", api_base.trim_end_matches('/'));
        if let Some(token) = &page_token {
            url = format!("{}?pageToken={}", url, urlencoding::encode(token));
        }
        let res = client.get(&url).bearer_auth(access_token).send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Calendar list failed: {} ({})", status, text);
        }
        let page: CalendarListResponse = serde_json::from_str(&text)?;
        calendars.extend(page.items.unwrap_or_default());
        match page.next_page_token {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    Ok(calendars)
}

/// Create a new calendar and return its entry.
pub async fn create_calendar(
    api_base: &str,
    access_token: &str,
    summary: &str,
    description: &str,
) -> Result<CalendarEntry> {
    let client = Client::new();
    let url = format!("{}/calendars", api_base.trim_end_matches('/'));
    let payload = serde_json::json!({
        "summary": summary,
        "description": description,
    });
    let res = client
        .post(&url)
        .bearer_auth(access_token)
        .header("Content-Type", "application/json")
        .json(&payload)
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Calendar create failed: {} ({})", status, text);
    }
    let calendar: CalendarEntry = serde_json::from_str(&text)?;
    Ok(calendar)
}

/// Insert a single event into a calendar.
pub async fn insert_event(
    api_base: &str,
    access_token: &str,
    calendar_id: &str,
    event: &CalendarEventRecord,
) -> Result<InsertedEvent> {
    let client = Client::new();
    let url = format!(
        "{}/calendars/{}/events",
        api_base.trim_end_matches('/'),
        urlencoding::encode(calendar_id)
    );
    let res = client
        .post(&url)
        .bearer_auth(access_token)
        .header("Content-Type", "application/json")
        .json(event)
        .send()
        .await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Event insert failed: {} ({})", status, text);
    }
    let inserted: InsertedEvent = serde_json::from_str(&text)?;
    Ok(inserted)
}
