//! Test utilities for integration tests
use std::env;
use std::fs;
use std::sync::{Arc, RwLock};
use std::time::SystemTime;

use axum::Router;
use chrono::NaiveDate;

use syllasync::api::AppState;
use syllasync::api::app;
use syllasync::core::AppConfig;
use syllasync::core::db::{async_db, initialize_db};

/// Creates a test application router with a temporary database.
///
/// The LLM and calendar API endpoints point at an unroutable local
/// address so any accidental outbound call fails fast instead of
/// leaving the sandbox.
pub async fn test_app() -> Router {
    // Create a unique directory for the test with a randomly
    // generated name using a timestamp to avoid collisions
    let temp_dir = env::temp_dir();
    let ts = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
        .to_string();
    let dir = temp_dir.join(ts);
    fs::create_dir_all(&dir).expect("Failed to create base directory");

    let db_path = dir.join("db");
    fs::create_dir_all(&db_path).expect("Failed to create db directory");
    let db_path_str = db_path.to_str().unwrap();

    let db = async_db(db_path_str)
        .await
        .expect("Failed to connect to async db");
    db.call(|conn| {
        initialize_db(conn).expect("Failed to initialize db");
        Ok(())
    })
    .await
    .unwrap();

    let app_config = AppConfig {
        storage_path: dir.display().to_string(),
        db_path: db_path_str.to_string(),
        app_url: String::from("http://127.0.0.1:2222"),
        llm_api_hostname: String::from("http://127.0.0.1:1"),
        llm_api_key: String::from("test-api-key"),
        llm_model: String::from("gpt-4.1-mini"),
        google_client_id: String::from("test_client_id"),
        google_client_secret: String::from("test_client_secret"),
        google_redirect_uri: String::from("http://127.0.0.1:2222/api/auth/google/callback"),
        calendar_api_base: String::from("http://127.0.0.1:1"),
        anchor_date: NaiveDate::from_ymd_opt(2025, 8, 24),
    };
    let app_state = AppState::new(db, app_config);
    app(Arc::new(RwLock::new(app_state)))
}
