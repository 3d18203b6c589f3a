use anyhow::Result;
use syllasync::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
