//! Public types for the Google authorization API
use serde::Deserialize;

/// Parameters Google sends back to the callback route: either an
/// authorization code or an error indicator.
#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
