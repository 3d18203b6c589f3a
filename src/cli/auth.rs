use anyhow::Result;
use chrono::Utc;
use std::io::{self, Write};

use crate::auth::{AuthManager, AuthReturnParams};
use crate::core::db::{async_db, initialize_db};
use crate::google::oauth::exchange_code_for_token;

pub async fn run(db_path: &str) -> Result<()> {
    let client_id = std::env::var("SYLLASYNC_GOOGLE_CLIENT_ID")
        .expect("Set SYLLASYNC_GOOGLE_CLIENT_ID in your environment");
    let client_secret = std::env::var("SYLLASYNC_GOOGLE_CLIENT_SECRET")
        .expect("Set SYLLASYNC_GOOGLE_CLIENT_SECRET in your environment");
    let redirect_uri = std::env::var("SYLLASYNC_GOOGLE_REDIRECT_URI")
        .unwrap_or_else(|_| "urn:ietf:wg:oauth:2.0:oob".to_string());

    let db = async_db(db_path).await.expect("Failed to connect to db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to initialize db");
        Ok(())
    })
    .await?;

    let manager = AuthManager::new(db, &client_id, &redirect_uri);
    let auth_url = manager.begin_authorization(None).await?;
    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        auth_url
    );
    print!("Paste the authorization code shown by Google here: ");
    io::stdout().flush().unwrap();
    let mut code = String::new();
    io::stdin()
        .read_line(&mut code)
        .expect("Failed to read code");
    let code = code.trim();

    let token = exchange_code_for_token(&client_id, &client_secret, code, &redirect_uri).await?;
    let expiry_ms = token
        .expires_in
        .map(|secs| Utc::now().timestamp_millis() + secs * 1000);
    let credential = manager
        .complete_authorization(AuthReturnParams {
            access_token: Some(token.access_token),
            refresh_token: token.refresh_token,
            scope: token.scope,
            token_type: token.token_type,
            expiry_ms,
            error: None,
        })
        .await?;

    if credential.refresh_token.is_some() {
        println!("Google Calendar connected. Refresh token saved to DB.");
    } else {
        println!("Google Calendar connected (no refresh token returned).");
    }

    Ok(())
}
