use std::env;

use chrono::NaiveDate;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub storage_path: String,
    pub db_path: String,
    pub app_url: String,
    pub llm_api_hostname: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub calendar_api_base: String,
    // Fixed anchor date for year disambiguation. When unset, callers
    // use today's date at the call site.
    pub anchor_date: Option<NaiveDate>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "127.0.0.1";
        let port = "2222";
        let storage_path = env::var("SYLLASYNC_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/db", storage_path.trim_end_matches('/'));
        let app_url =
            env::var("SYLLASYNC_APP_URL").unwrap_or(format!("http://{}:{}", host, port));
        let llm_api_hostname = env::var("SYLLASYNC_LLM_HOST")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let llm_api_key =
            env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
        let llm_model =
            env::var("SYLLASYNC_LLM_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());
        let google_client_id = env::var("SYLLASYNC_GOOGLE_CLIENT_ID")
            .expect("Missing SYLLASYNC_GOOGLE_CLIENT_ID");
        let google_client_secret = env::var("SYLLASYNC_GOOGLE_CLIENT_SECRET")
            .expect("Missing SYLLASYNC_GOOGLE_CLIENT_SECRET");
        let google_redirect_uri = env::var("SYLLASYNC_GOOGLE_REDIRECT_URI")
            .unwrap_or(format!("{}/api/auth/google/callback", app_url));
        let calendar_api_base = env::var("SYLLASYNC_CALENDAR_API_BASE")
            .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string());
        let anchor_date = env::var("SYLLASYNC_ANCHOR_DATE")
            .ok()
            .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok());

        Self {
            storage_path,
            db_path,
            app_url,
            llm_api_hostname,
            llm_api_key,
            llm_model,
            google_client_id,
            google_client_secret,
            google_redirect_uri,
            calendar_api_base,
            anchor_date,
        }
    }
}
