//! Router for the calendar sync API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use chrono::Utc;
use http::StatusCode;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::auth::{AuthManager, CredentialState};
use crate::sync::{SyncError, refresh_expired_credential, sync_events};

type SharedState = Arc<RwLock<AppState>>;

async fn sync_handler(
    State(state): State<SharedState>,
    Json(req): Json<public::SyncRequest>,
) -> Result<Json<public::SyncResponse>, ApiError> {
    let (db, config, review_label) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (
            shared_state.db.clone(),
            shared_state.config.clone(),
            shared_state
                .review
                .as_ref()
                .map(|review| review.calendar_label()),
        )
    };

    let manager = AuthManager::new(db, &config.google_client_id, &config.google_redirect_uri);
    let now_ms = Utc::now().timestamp_millis();

    // A token bundle in the request wins over the stored slot
    let credential_state = match req.tokens {
        Some(credential) if credential.is_expired(now_ms) => CredentialState::Expired(credential),
        Some(credential) => CredentialState::Valid(credential),
        None => manager.credential(now_ms).await?,
    };
    let credential_state = match credential_state {
        CredentialState::Expired(credential) => {
            refresh_expired_credential(
                &manager,
                &config.google_client_id,
                &config.google_client_secret,
                credential,
                now_ms,
            )
            .await
        }
        other => other,
    };

    let label = req
        .course_name
        .or(review_label)
        .unwrap_or_default();

    let result = sync_events(
        &config.calendar_api_base,
        credential_state,
        &req.events,
        &label,
    )
    .await
    .map_err(|err| match err {
        SyncError::AuthMissing | SyncError::AuthExpired => {
            ApiError::new(StatusCode::UNAUTHORIZED, err)
        }
        other => ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, other),
    })?;

    Ok(Json(result.into()))
}

/// Create the calendar router
pub fn router() -> Router<SharedState> {
    Router::new().route("/events", axum::routing::post(sync_handler))
}
