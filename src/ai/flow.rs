//! Two-phase syllabus analysis: infer the academic context first,
//! then extract events with that context applied.

use chrono::NaiveDate;

use super::InferenceFailure;
use super::context::infer_academic_context;
use super::extract::{ExtractedEvent, extract_events};
use crate::openai::LlmClient;
use crate::schedule::normalize::normalize_events;

/// Analyze syllabus text into a chronologically sorted event list.
/// The phases are strictly sequential: extraction depends on the
/// inferred context. Entries the normalizer rejects are logged and
/// dropped, never repaired.
pub async fn analyze_syllabus(
    llm: &LlmClient,
    syllabus_text: &str,
    anchor: NaiveDate,
) -> Result<Vec<ExtractedEvent>, InferenceFailure> {
    let ctx = infer_academic_context(llm, syllabus_text, anchor).await?;
    tracing::debug!(
        year = %ctx.year,
        semester = ?ctx.semester,
        confidence = ?ctx.confidence,
        "Inferred academic context"
    );

    let events = extract_events(llm, syllabus_text, &ctx, anchor).await?;
    let normalized = normalize_events(events);
    for rejected in &normalized.rejected {
        tracing::warn!(
            reason = rejected.reason,
            date = %rejected.event.date,
            "Rejected extracted event"
        );
    }

    Ok(normalized.events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_analyze_syllabus_two_phases() {
        let mut server = mockito::Server::new_async().await;

        // Phase 1 and phase 2 target the same endpoint and are told
        // apart by the schema name in the request payload
        let context_body = r#"{
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "{\"year\":\"2024\",\"semester\":\"Fall\",\"confidence\":\"Medium\",\"evidence\":\"Academic Year 2024-2025\"}"
                },
                "finish_reason": "stop"
            }]
        }"#;
        let context_mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::Regex("academic_context".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(context_body)
            .create();

        let events_content = r#"{\"events\":[{\"date\":\"2024-11-23\",\"type\":\"holiday\",\"description\":\"Thanksgiving Break begins\"},{\"date\":\"2024-09-10\",\"type\":\"assignment\",\"description\":\"Project Proposal Due\"},{\"date\":\"not-a-date\",\"type\":\"test\",\"description\":\"Garbled\"}]}"#;
        let events_body = format!(
            r#"{{"choices": [{{"index": 0, "message": {{"role": "assistant", "content": "{events_content}"}}, "finish_reason": "stop"}}]}}"#
        );
        let events_mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::Regex("syllabus_events".to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(events_body)
            .create();

        let llm = LlmClient::new(server.url().as_str(), "test-key", "gpt-4.1-mini");
        let anchor = NaiveDate::from_ymd_opt(2024, 8, 24).unwrap();
        let events = analyze_syllabus(&llm, "Academic Year 2024-2025 ...", anchor)
            .await
            .unwrap();

        context_mock.assert();
        events_mock.assert();

        // Sorted ascending, invalid entry rejected
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].date, "2024-09-10");
        assert_eq!(events[1].date, "2024-11-23");
    }

    #[tokio::test]
    async fn test_analyze_syllabus_phase_one_failure_short_circuits() {
        let mut server = mockito::Server::new_async().await;

        let context_mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::Regex("academic_context".to_string()))
            .with_status(503)
            .with_body("overloaded")
            .create();

        // No extraction call may be made when phase one fails
        let events_mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(Matcher::Regex("syllabus_events".to_string()))
            .expect(0)
            .create();

        let llm = LlmClient::new(server.url().as_str(), "test-key", "gpt-4.1-mini");
        let anchor = NaiveDate::from_ymd_opt(2024, 8, 24).unwrap();
        let result = analyze_syllabus(&llm, "some syllabus", anchor).await;

        context_mock.assert();
        events_mock.assert();
        assert!(result.is_err());
    }
}
