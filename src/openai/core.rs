use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Message {
    role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Client for an OpenAI-compatible chat completions API.
#[derive(Clone, Debug)]
pub struct LlmClient {
    pub api_hostname: String,
    pub api_key: String,
    pub model: String,
}

impl LlmClient {
    pub fn new(api_hostname: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Request a completion constrained to a JSON schema and decode the
    /// message content into `T`. Any response that does not conform to
    /// the schema is an error, never repaired.
    pub async fn structured_completion<T: DeserializeOwned>(
        &self,
        messages: &[Message],
        schema_name: &str,
        schema: Value,
    ) -> Result<T, Error> {
        let payload = json!({
            "model": self.model,
            "messages": messages,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "schema": schema,
                    "strict": true,
                },
            },
        });
        let url = format!(
            "{}/v1/chat/completions",
            self.api_hostname.trim_end_matches("/")
        );
        let response = reqwest::Client::new()
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(120))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        if !status.is_success() {
            anyhow::bail!("Completion request failed: {} ({})", status, text);
        }

        let body: Value = serde_json::from_str(&text)?;
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(anyhow!("Missing content in completion response"))?;
        let decoded = serde_json::from_str::<T>(content)?;
        Ok(decoded)
    }
}
