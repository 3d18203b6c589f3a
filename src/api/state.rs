use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::schedule::session::ReviewSession;

pub struct AppState {
    // Working copy of the most recently analyzed syllabus
    pub review: Option<ReviewSession>,
    pub db: Connection,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Self {
        Self {
            review: None,
            db,
            config,
        }
    }
}
