//! Document-to-text boundary. The pipeline only ever sees plain text;
//! converting richer formats happens behind this trait.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<String>;
}

/// Reads UTF-8 text documents as-is.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String> {
        let text = String::from_utf8(bytes.to_vec())?;
        Ok(text)
    }
}
