use crate::api::server;
use crate::core::AppConfig;

pub async fn run(host: String, port: String) {
    let config = AppConfig::default();
    server::serve(host, port, config).await;
}
