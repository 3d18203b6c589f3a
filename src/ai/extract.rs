//! Second inference phase: extract dated events from a syllabus using
//! the previously inferred academic context.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::InferenceFailure;
use super::context::{AcademicContext, Semester};
use crate::openai::{LlmClient, Message, Role};

/// A single dated syllabus event. Dates are calendar dates in
/// YYYY-MM-DD form; the category label is free-form ("assignment",
/// "test", "holiday", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractedEvent {
    pub date: String,
    pub r#type: String,
    pub description: String,
}

/// Structured-output APIs require an object root, so the event array
/// is wrapped in a single `events` property on the wire.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExtractedEvents {
    events: Vec<ExtractedEvent>,
}

/// The year an event in the given month belongs to, derived from the
/// inferred context. For a Fall (or unknown) context the inferred year
/// is the Fall-side of the academic year: August-December stay in it,
/// January-July roll into the following year. A Spring or Summer
/// context already names the event-bearing year, and no month may
/// regress to an earlier year than the inferred one.
pub fn year_for_month(month: u32, ctx: &AcademicContext) -> Option<i32> {
    let base = ctx.base_year()?;
    match ctx.semester {
        Semester::Fall | Semester::Unknown => match month {
            8..=12 => Some(base),
            1..=7 => Some(base + 1),
            _ => None,
        },
        Semester::Spring | Semester::Summer => match month {
            1..=12 => Some(base),
            _ => None,
        },
    }
}

fn events_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "events": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "date": {
                            "type": "string",
                            "description": "The date of the event (YYYY-MM-DD)."
                        },
                        "type": {
                            "type": "string",
                            "description": "The type of event (e.g., 'assignment', 'test', 'holiday')."
                        },
                        "description": {
                            "type": "string",
                            "description": "A brief description of the event."
                        }
                    },
                    "required": ["date", "type", "description"],
                    "additionalProperties": false,
                }
            }
        },
        "required": ["events"],
        "additionalProperties": false,
    })
}

pub(crate) fn extraction_instructions(ctx: &AcademicContext, anchor: NaiveDate) -> String {
    let today = anchor.format("%B %-d, %Y");
    let semester = match ctx.semester {
        Semester::Fall => "Fall",
        Semester::Spring => "Spring",
        Semester::Summer => "Summer",
        Semester::Unknown => "Unknown",
    };
    // Concrete year-per-month rules derived from the context so the
    // model never has to do the arithmetic itself
    let fall_year = year_for_month(11, ctx);
    let spring_year = year_for_month(2, ctx);
    let summer_year = year_for_month(6, ctx);
    let year_rules = match (fall_year, spring_year, summer_year) {
        (Some(fall), Some(spring), Some(summer)) => format!(
            r#"- Fall events (August-December): use {fall} (e.g., "November 15" means {fall}-11-15)
- Spring events (January-May): use {spring} (e.g., "February 10" means {spring}-02-10)
- Summer events (June-July): use {summer} (e.g., "June 5" means {summer}-06-05)"#
        ),
        _ => format!("- Use {} for all dates without an explicit year", ctx.year),
    };

    format!(
        r#"Extract every academic event from this syllabus using the detected academic context.

**CURRENT CONTEXT: Today is {today}**

**DETECTED ACADEMIC CONTEXT:**
- Primary Year: {year}
- Semester: {semester}
- Evidence: {evidence}

**INSTRUCTIONS:**
- Extract every date associated with assignments, tests, quizzes, projects, presentations, holidays, or academic events
- Format all dates as YYYY-MM-DD
- For dates without an explicit year, assign the year by month:
{year_rules}
- NEVER use a year before {year} unless that event's own text states an explicit year
- Emit a multi-day range (e.g., "November 23-27") as two events of the same type, one for the start date and one for the end date"#,
        year = ctx.year,
        evidence = ctx.evidence,
    )
}

/// Extract dated events from the syllabus text. Schema-violating
/// output from the model is a failure, never repaired locally.
pub async fn extract_events(
    llm: &LlmClient,
    syllabus_text: &str,
    ctx: &AcademicContext,
    anchor: NaiveDate,
) -> Result<Vec<ExtractedEvent>, InferenceFailure> {
    let messages = vec![
        Message::new(Role::System, &extraction_instructions(ctx, anchor)),
        Message::new(Role::User, syllabus_text),
    ];
    let response: ExtractedEvents = llm
        .structured_completion(&messages, "syllabus_events", events_schema())
        .await
        .map_err(InferenceFailure)?;
    Ok(response.events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::context::Confidence;

    fn fall_ctx(year: &str) -> AcademicContext {
        AcademicContext {
            year: year.to_string(),
            semester: Semester::Fall,
            confidence: Confidence::High,
            evidence: format!("Fall {year}"),
        }
    }

    #[test]
    fn test_year_for_month_fall_context() {
        let ctx = fall_ctx("2024");
        // August-December belong to the Fall year
        for month in 8..=12 {
            assert_eq!(year_for_month(month, &ctx), Some(2024));
        }
        // January-May belong to the Spring year (Fall year + 1)
        for month in 1..=5 {
            assert_eq!(year_for_month(month, &ctx), Some(2025));
        }
        // June-July belong to the Summer year
        for month in 6..=7 {
            assert_eq!(year_for_month(month, &ctx), Some(2025));
        }
    }

    #[test]
    fn test_year_for_month_is_total_for_real_months() {
        let ctx = fall_ctx("2025");
        for month in 1..=12 {
            assert!(year_for_month(month, &ctx).is_some());
        }
        assert_eq!(year_for_month(0, &ctx), None);
        assert_eq!(year_for_month(13, &ctx), None);
    }

    #[test]
    fn test_year_for_month_never_regresses_before_inferred_year() {
        let contexts = [
            fall_ctx("2024"),
            AcademicContext {
                semester: Semester::Spring,
                ..fall_ctx("2026")
            },
            AcademicContext {
                semester: Semester::Summer,
                ..fall_ctx("2026")
            },
            AcademicContext {
                semester: Semester::Unknown,
                ..fall_ctx("2025")
            },
        ];
        for ctx in &contexts {
            let base = ctx.base_year().unwrap();
            for month in 1..=12 {
                assert!(year_for_month(month, ctx).unwrap() >= base);
            }
        }
    }

    #[test]
    fn test_year_for_month_academic_year_range() {
        let ctx = AcademicContext {
            year: "2024-2025".to_string(),
            ..fall_ctx("2024")
        };
        assert_eq!(year_for_month(11, &ctx), Some(2024));
        assert_eq!(year_for_month(2, &ctx), Some(2025));
    }

    #[test]
    fn test_year_for_month_unparseable_year() {
        let ctx = AcademicContext {
            year: "unknown".to_string(),
            ..fall_ctx("2025")
        };
        assert_eq!(year_for_month(9, &ctx), None);
    }

    #[test]
    fn test_extraction_instructions_include_context() {
        let ctx = fall_ctx("2024");
        let anchor = NaiveDate::from_ymd_opt(2024, 8, 24).unwrap();
        let instructions = extraction_instructions(&ctx, anchor);
        assert!(instructions.contains("Primary Year: 2024"));
        assert!(instructions.contains("Semester: Fall"));
        assert!(instructions.contains("use 2024 (e.g., \"November 15\" means 2024-11-15)"));
        assert!(instructions.contains("use 2025 (e.g., \"February 10\" means 2025-02-10)"));
        assert!(instructions.contains("NEVER use a year before 2024"));
    }

    #[test]
    fn test_event_deserialization_rejects_unknown_fields() {
        let raw = r#"{"date":"2024-09-10","type":"assignment","description":"Proposal","extra":1}"#;
        assert!(serde_json::from_str::<ExtractedEvent>(raw).is_err());
    }

    #[tokio::test]
    async fn test_extract_events() {
        let mut server = mockito::Server::new_async().await;

        let content = r#"{\"events\":[{\"date\":\"2024-09-10\",\"type\":\"assignment\",\"description\":\"Project Proposal Due\"},{\"date\":\"2024-11-23\",\"type\":\"holiday\",\"description\":\"Thanksgiving Break begins\"},{\"date\":\"2024-11-27\",\"type\":\"holiday\",\"description\":\"Thanksgiving Break ends\"}]}"#;
        let response_body = format!(
            r#"{{"choices": [{{"index": 0, "message": {{"role": "assistant", "content": "{content}"}}, "finish_reason": "stop"}}]}}"#
        );

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response_body)
            .create();

        let llm = LlmClient::new(server.url().as_str(), "test-key", "gpt-4.1-mini");
        let ctx = fall_ctx("2024");
        let anchor = NaiveDate::from_ymd_opt(2024, 8, 24).unwrap();
        let events = extract_events(&llm, "syllabus text", &ctx, anchor)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[0],
            ExtractedEvent {
                date: "2024-09-10".to_string(),
                r#type: "assignment".to_string(),
                description: "Project Proposal Due".to_string(),
            }
        );
        // A multi-day range arrives as two boundary events of the same type
        assert_eq!(events[1].r#type, "holiday");
        assert_eq!(events[2].r#type, "holiday");
        assert_eq!(events[1].date, "2024-11-23");
        assert_eq!(events[2].date, "2024-11-27");
    }

    #[tokio::test]
    async fn test_extract_events_schema_violation() {
        let mut server = mockito::Server::new_async().await;

        // A bare array instead of the wrapped object is non-conformant
        let response_body = r#"{
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "[{\"date\":\"2024-09-10\",\"type\":\"assignment\",\"description\":\"Proposal\"}]"
                },
                "finish_reason": "stop"
            }]
        }"#;

        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response_body)
            .create();

        let llm = LlmClient::new(server.url().as_str(), "test-key", "gpt-4.1-mini");
        let ctx = fall_ctx("2024");
        let anchor = NaiveDate::from_ymd_opt(2024, 8, 24).unwrap();
        let result = extract_events(&llm, "syllabus text", &ctx, anchor).await;

        mock.assert();
        assert!(result.is_err());
    }
}
