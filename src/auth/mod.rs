//! Lifecycle of the delegated Google Calendar credential: acquisition
//! via the consent redirect, single-slot persistence, lazy expiry, and
//! carrying review work across the redirect round trip.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_rusqlite::Connection;

use crate::core::kv;
use crate::google::oauth;
use crate::schedule::session::PendingSyncState;

/// Stored token bundle for the single connected Google account. The
/// wire names match what the authorization callback hands back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub scope: String,
    pub token_type: String,
    #[serde(rename = "expiry_date", skip_serializing_if = "Option::is_none")]
    pub expiry_ms: Option<i64>,
}

impl Credential {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        match self.expiry_ms {
            Some(expiry) => now_ms > expiry,
            None => false,
        }
    }
}

/// What a read of the credential slot found. An expired credential is
/// handed back once (so the caller can see a refresh token) and the
/// slot is evicted, forcing re-authentication on the next read.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialState {
    Missing,
    Expired(Credential),
    Valid(Credential),
}

/// Parameters delivered by the authorization provider's redirect back
/// into the app: either a credential bundle or an error indicator.
#[derive(Debug, Clone, Default)]
pub struct AuthReturnParams {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
    pub expiry_ms: Option<i64>,
    pub error: Option<String>,
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthFlowError {
    #[error("Google authorization failed: {0}")]
    Denied(String),
}

/// Manages the credential slot and the pre-redirect review snapshot.
pub struct AuthManager {
    db: Connection,
    client_id: String,
    redirect_uri: String,
}

impl AuthManager {
    pub fn new(db: Connection, client_id: &str, redirect_uri: &str) -> Self {
        Self {
            db,
            client_id: client_id.to_string(),
            redirect_uri: redirect_uri.to_string(),
        }
    }

    /// Start the redirect flow. When a review session is active its
    /// snapshot is written first so the round trip cannot lose work.
    /// Returns the consent URL to navigate to.
    pub async fn begin_authorization(
        &self,
        pending: Option<&PendingSyncState>,
    ) -> Result<String> {
        if let Some(pending) = pending {
            kv::set(&self.db, kv::KEY_PENDING_SYNC, pending).await?;
        }
        Ok(oauth::consent_url(&self.client_id, &self.redirect_uri))
    }

    /// Finish the redirect flow with the returned parameters. On
    /// success the credential replaces any prior one; on error nothing
    /// is persisted.
    pub async fn complete_authorization(
        &self,
        params: AuthReturnParams,
    ) -> Result<Credential, AuthFlowError> {
        if let Some(error) = params.error {
            return Err(AuthFlowError::Denied(error));
        }
        let access_token = match params.access_token {
            Some(token) if !token.is_empty() => token,
            _ => return Err(AuthFlowError::Denied("no access token returned".to_string())),
        };

        let credential = Credential {
            access_token,
            refresh_token: params.refresh_token,
            scope: params.scope.unwrap_or_default(),
            token_type: params.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expiry_ms: params.expiry_ms,
        };
        self.store_credential(&credential)
            .await
            .map_err(|err| AuthFlowError::Denied(err.to_string()))?;
        Ok(credential)
    }

    /// Persist a credential into the single slot, replacing any prior
    /// one. Also used after a successful refresh at sync time.
    pub async fn store_credential(&self, credential: &Credential) -> Result<()> {
        kv::set(&self.db, kv::KEY_GOOGLE_TOKENS, credential).await
    }

    /// Read the stored credential, evaluating expiry lazily. A
    /// credential past its expiry is evicted and reported as expired;
    /// the read after that finds nothing.
    pub async fn credential(&self, now_ms: i64) -> Result<CredentialState> {
        let stored: Option<Credential> = kv::get(&self.db, kv::KEY_GOOGLE_TOKENS).await?;
        match stored {
            None => Ok(CredentialState::Missing),
            Some(credential) if credential.is_expired(now_ms) => {
                kv::delete(&self.db, kv::KEY_GOOGLE_TOKENS).await?;
                Ok(CredentialState::Expired(credential))
            }
            Some(credential) => Ok(CredentialState::Valid(credential)),
        }
    }

    /// Restore and delete the pre-redirect snapshot, if one exists.
    pub async fn take_pending(&self) -> Result<Option<PendingSyncState>> {
        let pending: Option<PendingSyncState> =
            kv::get(&self.db, kv::KEY_PENDING_SYNC).await?;
        if pending.is_some() {
            kv::delete(&self.db, kv::KEY_PENDING_SYNC).await?;
        }
        Ok(pending)
    }

    /// Drop the stored credential, returning to the unauthenticated
    /// state.
    pub async fn disconnect(&self) -> Result<()> {
        kv::delete(&self.db, kv::KEY_GOOGLE_TOKENS).await
    }
}
