use std::fs;
use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use crate::ai::extract::ExtractedEvent;
use crate::auth::{AuthManager, CredentialState};
use crate::core::db::{async_db, initialize_db};
use crate::google::gcal::CALENDAR_API_BASE;
use crate::schedule::normalize::normalize_events;
use crate::sync::{refresh_expired_credential, sync_events};

pub async fn run(file: &str, label: Option<String>, db_path: &str) -> Result<()> {
    let client_id = std::env::var("SYLLASYNC_GOOGLE_CLIENT_ID")
        .expect("Set SYLLASYNC_GOOGLE_CLIENT_ID in your environment");
    let client_secret = std::env::var("SYLLASYNC_GOOGLE_CLIENT_SECRET")
        .expect("Set SYLLASYNC_GOOGLE_CLIENT_SECRET in your environment");
    let redirect_uri = std::env::var("SYLLASYNC_GOOGLE_REDIRECT_URI")
        .unwrap_or_else(|_| "urn:ietf:wg:oauth:2.0:oob".to_string());

    let raw = fs::read_to_string(file)?;
    let events: Vec<ExtractedEvent> = serde_json::from_str(&raw)?;
    let normalized = normalize_events(events);
    for rejected in &normalized.rejected {
        eprintln!(
            "Skipping event with {}: {} {}",
            rejected.reason, rejected.event.date, rejected.event.description
        );
    }

    let label = label.unwrap_or_else(|| {
        Path::new(file)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("")
            .to_string()
    });

    let db = async_db(db_path).await.expect("Failed to connect to db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to initialize db");
        Ok(())
    })
    .await?;
    let manager = AuthManager::new(db, &client_id, &redirect_uri);

    let now_ms = Utc::now().timestamp_millis();
    let credential_state = match manager.credential(now_ms).await? {
        CredentialState::Expired(credential) => {
            refresh_expired_credential(&manager, &client_id, &client_secret, credential, now_ms)
                .await
        }
        other => other,
    };

    let result = sync_events(
        CALENDAR_API_BASE,
        credential_state,
        &normalized.events,
        &label,
    )
    .await?;

    println!(
        "Synced {} of {} events into calendar {}",
        result.success_count, result.total_events, result.calendar_id
    );
    for outcome in &result.outcomes {
        match (&outcome.success, &outcome.error) {
            (true, _) => println!("  ok    {}", outcome.summary),
            (false, Some(error)) => println!("  fail  {} ({})", outcome.summary, error),
            (false, None) => println!("  fail  {}", outcome.summary),
        }
    }

    Ok(())
}
