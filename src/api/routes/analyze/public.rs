//! Public types for the syllabus analysis API
use serde::{Deserialize, Serialize};

use crate::ai::extract::ExtractedEvent;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    pub syllabus_text: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub file_name: String,
    pub events: Vec<ExtractedEvent>,
}
