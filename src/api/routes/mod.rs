use std::sync::{Arc, RwLock};

use axum::Router;

use crate::api::state::AppState;

pub mod analyze {
    pub mod public;
    pub mod router;
}

pub mod auth {
    pub mod public;
    pub mod router;
}

pub mod calendar {
    pub mod public;
    pub mod router;
}

type SharedState = Arc<RwLock<AppState>>;

pub fn router() -> Router<SharedState> {
    Router::new()
        .nest("/syllabus", analyze::router::router())
        .nest("/auth", auth::router::router())
        .nest("/calendar", calendar::router::router())
}
