pub mod public;
pub mod routes;
pub mod server;
pub mod state;

pub use public::ApiError;
pub use server::app;
pub use state::AppState;
