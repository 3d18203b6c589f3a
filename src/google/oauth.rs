//! Google OAuth2 client for the authorization-code flow used to
//! delegate calendar access.

use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Scopes required to create calendars and insert events.
pub const CALENDAR_SCOPES: &str =
    "https://www.googleapis.com/auth/calendar https://www.googleapis.com/auth/calendar.events";

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<i64>,
}

/// Consent URL for the redirect flow. `access_type=offline` requests a
/// refresh token and `prompt=consent` guarantees one is issued again
/// on repeat authorizations.
pub fn consent_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        AUTH_ENDPOINT,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(CALENDAR_SCOPES)
    )
}

async fn token_request(endpoint: &str, params: &[(&str, &str)]) -> Result<TokenResponse> {
    let client = Client::new();
    let res = client.post(endpoint).form(params).send().await?;
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    if !status.is_success() {
        anyhow::bail!("Token request failed: {} ({})", status, text);
    }
    let token: TokenResponse = serde_json::from_str(&text)?;
    Ok(token)
}

/// Exchange the authorization code delivered by the redirect for a
/// token bundle.
pub async fn exchange_code_for_token(
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    token_request(
        TOKEN_ENDPOINT,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

/// Trade a refresh token for a fresh access token. Callers make at
/// most one attempt and fail closed on error.
pub async fn refresh_access_token(
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<TokenResponse> {
    token_request(
        TOKEN_ENDPOINT,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await
}
