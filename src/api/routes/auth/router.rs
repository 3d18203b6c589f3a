//! Router for the Google authorization redirect flow

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Redirect};
use axum_extra::extract::Query;
use chrono::Utc;

use super::public;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::auth::{AuthManager, AuthReturnParams};
use crate::google::oauth;
use crate::schedule::session::ReviewSession;

type SharedState = Arc<RwLock<AppState>>;

/// Kick off the consent redirect. Any active review session is
/// snapshotted first so the external round trip cannot lose it.
async fn google_connect(State(state): State<SharedState>) -> Result<Redirect, ApiError> {
    let (db, client_id, redirect_uri, pending) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (
            shared_state.db.clone(),
            shared_state.config.google_client_id.clone(),
            shared_state.config.google_redirect_uri.clone(),
            shared_state
                .review
                .as_ref()
                .map(|review| review.pending_snapshot()),
        )
    };

    let manager = AuthManager::new(db, &client_id, &redirect_uri);
    let url = manager.begin_authorization(pending.as_ref()).await?;
    Ok(Redirect::temporary(&url))
}

/// Finish the redirect flow: exchange the code, persist the
/// credential, restore any pending review snapshot, and bounce back to
/// the app with the token bundle (or an error flag) in the query.
async fn google_callback(
    State(state): State<SharedState>,
    Query(params): Query<public::CallbackParams>,
) -> Result<Redirect, ApiError> {
    let (db, config) = {
        let shared_state = state.read().expect("Unable to read shared state");
        (shared_state.db.clone(), shared_state.config.clone())
    };
    let app_url = config.app_url.trim_end_matches('/').to_string();
    let error_redirect = format!("{}/?auth_error=true", app_url);

    let code = match (params.code, params.error) {
        (Some(code), None) if !code.is_empty() => code,
        (_, error) => {
            // Denied or malformed return: nothing is persisted
            tracing::warn!(
                "Google authorization returned without a code: {}",
                error.unwrap_or_else(|| "missing code".to_string())
            );
            return Ok(Redirect::temporary(&error_redirect));
        }
    };

    let token = match oauth::exchange_code_for_token(
        &config.google_client_id,
        &config.google_client_secret,
        &code,
        &config.google_redirect_uri,
    )
    .await
    {
        Ok(token) => token,
        Err(err) => {
            tracing::error!("Error exchanging authorization code for tokens: {}", err);
            return Ok(Redirect::temporary(&error_redirect));
        }
    };

    let manager = AuthManager::new(db, &config.google_client_id, &config.google_redirect_uri);
    let expiry_ms = token
        .expires_in
        .map(|secs| Utc::now().timestamp_millis() + secs * 1000);
    let bundle = AuthReturnParams {
        access_token: Some(token.access_token),
        refresh_token: token.refresh_token,
        scope: token.scope,
        token_type: token.token_type,
        expiry_ms,
        error: None,
    };
    let credential = match manager.complete_authorization(bundle).await {
        Ok(credential) => credential,
        Err(err) => {
            tracing::error!("Failed to complete authorization: {}", err);
            return Ok(Redirect::temporary(&error_redirect));
        }
    };

    // Restore the review work that was parked across the redirect
    if let Some(pending) = manager.take_pending().await? {
        state.write().expect("Unable to write shared state").review =
            Some(ReviewSession::from_snapshot(pending));
    }

    let mut url = format!(
        "{}/?auth_success=true&access_token={}&scope={}&token_type={}",
        app_url,
        urlencoding::encode(&credential.access_token),
        urlencoding::encode(&credential.scope),
        urlencoding::encode(&credential.token_type),
    );
    if let Some(refresh_token) = &credential.refresh_token {
        url.push_str(&format!(
            "&refresh_token={}",
            urlencoding::encode(refresh_token)
        ));
    }
    if let Some(expiry) = credential.expiry_ms {
        url.push_str(&format!("&expiry_date={}", expiry));
    }

    Ok(Redirect::temporary(&url))
}

/// Create the auth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/google", axum::routing::get(google_connect))
        .route("/google/callback", axum::routing::get(google_callback))
}
