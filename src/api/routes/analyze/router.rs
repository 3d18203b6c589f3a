//! Router for the syllabus analysis API

use std::sync::{Arc, RwLock};

use axum::{Router, extract::State, response::Json};
use chrono::Utc;
use http::StatusCode;

use super::public;
use crate::ai::flow::analyze_syllabus;
use crate::api::public::ApiError;
use crate::api::state::AppState;
use crate::openai::LlmClient;
use crate::schedule::session::ReviewSession;

type SharedState = Arc<RwLock<AppState>>;

async fn analyze_handler(
    State(state): State<SharedState>,
    Json(req): Json<public::AnalyzeRequest>,
) -> Result<Json<public::AnalyzeResponse>, ApiError> {
    if req.syllabus_text.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            anyhow::anyhow!("No syllabus text provided"),
        ));
    }

    let (llm, anchor) = {
        let shared_state = state.read().expect("Unable to read shared state");
        let config = &shared_state.config;
        (
            LlmClient::new(&config.llm_api_hostname, &config.llm_api_key, &config.llm_model),
            config.anchor_date,
        )
    };

    // The anchor only falls back to the wall clock at this outermost
    // edge; the pipeline itself never reads the clock
    let anchor = anchor.unwrap_or_else(|| Utc::now().date_naive());

    let events = analyze_syllabus(&llm, &req.syllabus_text, anchor)
        .await
        .map_err(|err| ApiError::new(StatusCode::BAD_GATEWAY, err))?;

    let file_name = req.file_name.unwrap_or_else(|| "syllabus".to_string());
    state.write().expect("Unable to write shared state").review =
        Some(ReviewSession::new(&file_name, events.clone()));

    Ok(Json(public::AnalyzeResponse { file_name, events }))
}

/// Create the syllabus analysis router
pub fn router() -> Router<SharedState> {
    Router::new().route("/analyze", axum::routing::post(analyze_handler))
}
