use std::env;
use std::fs;

use anyhow::Result;
use chrono::{NaiveDate, Utc};

use crate::ai::flow::analyze_syllabus;
use crate::document::{PlainTextExtractor, TextExtractor};
use crate::openai::LlmClient;

pub async fn run(file: &str, json: bool) -> Result<()> {
    let bytes = fs::read(file)?;
    let text = PlainTextExtractor.extract(&bytes).await?;

    let api_hostname =
        env::var("SYLLASYNC_LLM_HOST").unwrap_or_else(|_| "https://api.openai.com".to_string());
    let api_key =
        env::var("OPENAI_API_KEY").unwrap_or_else(|_| "thiswontworkforopenai".to_string());
    let model = env::var("SYLLASYNC_LLM_MODEL").unwrap_or_else(|_| "gpt-4.1-mini".to_string());
    let llm = LlmClient::new(&api_hostname, &api_key, &model);

    let anchor = env::var("SYLLASYNC_ANCHOR_DATE")
        .ok()
        .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive());

    let events = analyze_syllabus(&llm, &text, anchor).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    println!("{} events found in {}\n", events.len(), file);
    for event in &events {
        println!("{}  {:<12}  {}", event.date, event.r#type, event.description);
    }

    Ok(())
}
