//! First inference phase: determine the academic year and semester
//! for a syllabus before any dates are extracted.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::InferenceFailure;
use crate::openai::{LlmClient, Message, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    Fall,
    Spring,
    Summer,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Best-guess academic context for a document. Produced once per
/// document and consumed only by the event extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcademicContext {
    pub year: String,
    pub semester: Semester,
    pub confidence: Confidence,
    pub evidence: String,
}

impl AcademicContext {
    /// The inferred year as a number, when it parses. The leading four
    /// digits are used so an academic-year range like "2025-2026"
    /// resolves to its Fall-side year.
    pub fn base_year(&self) -> Option<i32> {
        self.year.get(0..4)?.parse().ok()
    }
}

/// Resolve a year-less semester mention against the anchor date: the
/// anchor year while the anchor month falls inside the semester's
/// window (Fall = Aug-Dec, Spring = Jan-May, Summer = Jun-Jul),
/// otherwise the following year. An unknown semester resolves like
/// Fall, the start of the academic year.
pub fn semester_year(semester: Semester, anchor: NaiveDate) -> i32 {
    let month = anchor.month();
    let window = match semester {
        Semester::Fall | Semester::Unknown => 8..=12,
        Semester::Spring => 1..=5,
        Semester::Summer => 6..=7,
    };
    if window.contains(&month) {
        anchor.year()
    } else {
        anchor.year() + 1
    }
}

fn context_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "year": {
                "type": "string",
                "description": "The primary academic year identified from the syllabus (e.g., '2025')."
            },
            "semester": {
                "type": "string",
                "enum": ["Fall", "Spring", "Summer", "Unknown"],
                "description": "The semester, if identified."
            },
            "confidence": {
                "type": "string",
                "enum": ["High", "Medium", "Low"],
                "description": "Confidence in the year determination."
            },
            "evidence": {
                "type": "string",
                "description": "The text or context that led to this year determination."
            }
        },
        "required": ["year", "semester", "confidence", "evidence"],
        "additionalProperties": false,
    })
}

pub(crate) fn year_detection_instructions(anchor: NaiveDate) -> String {
    let today = anchor.format("%B %-d, %Y");
    let fall = semester_year(Semester::Fall, anchor);
    let spring = semester_year(Semester::Spring, anchor);
    let summer = semester_year(Semester::Summer, anchor);

    format!(
        r#"You are an expert at analyzing academic syllabi to determine the correct academic year and semester.

**CURRENT CONTEXT: Today is {today}**

**Your task:** Carefully analyze the syllabus text to identify the academic year and semester.

**Look for these indicators (in order of priority):**
1. **Explicit semester/year statements**: "Fall {fall}", "Spring {spring}", "Summer {summer}"
2. **Academic year ranges**: "Academic Year {fall}-{next}", "AY {fall}-{next_short:02}"
3. **Course scheduling**: course header lines that pair a term with a year
4. **Full dates with years**: any complete dates mentioned in the body
5. **Document metadata**: copyright dates, "Last updated" dates
6. **Calendar references**: academic calendar years mentioned

**If the semester is mentioned without a year, resolve it against today's date:**
- "Fall" means Fall {fall}
- "Spring" means Spring {spring}
- "Summer" means Summer {summer}
- With no semester indicators at all, default to the {fall}-{next} academic year
- Never default to a year before {fall} unless the syllabus states one explicitly

Set confidence to High when the year is stated explicitly, Medium when inferred from dates in the body, and Low when defaulted from today's date. Quote the text that led to the determination as the evidence."#,
        next = fall + 1,
        next_short = (fall + 1) % 100,
    )
}

/// Infer the academic context for the given syllabus text. The anchor
/// date resolves ambiguous, year-less semester mentions and is always
/// passed in by the caller, never read from the wall clock here.
pub async fn infer_academic_context(
    llm: &LlmClient,
    syllabus_text: &str,
    anchor: NaiveDate,
) -> Result<AcademicContext, InferenceFailure> {
    let messages = vec![
        Message::new(Role::System, &year_detection_instructions(anchor)),
        Message::new(Role::User, syllabus_text),
    ];
    llm.structured_completion(&messages, "academic_context", context_schema())
        .await
        .map_err(InferenceFailure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_semester_year_inside_window() {
        // Anchor inside the window resolves to the anchor year
        assert_eq!(semester_year(Semester::Fall, date(2025, 8, 24)), 2025);
        assert_eq!(semester_year(Semester::Fall, date(2025, 12, 1)), 2025);
        assert_eq!(semester_year(Semester::Spring, date(2026, 3, 10)), 2026);
        assert_eq!(semester_year(Semester::Summer, date(2025, 6, 15)), 2025);
    }

    #[test]
    fn test_semester_year_outside_window() {
        // Anchor outside the window resolves to the following year
        assert_eq!(semester_year(Semester::Spring, date(2025, 8, 24)), 2026);
        assert_eq!(semester_year(Semester::Summer, date(2025, 8, 24)), 2026);
        assert_eq!(semester_year(Semester::Fall, date(2026, 2, 1)), 2027);
        assert_eq!(semester_year(Semester::Summer, date(2025, 12, 31)), 2026);
    }

    #[test]
    fn test_unknown_semester_resolves_like_fall() {
        assert_eq!(semester_year(Semester::Unknown, date(2025, 9, 1)), 2025);
        assert_eq!(semester_year(Semester::Unknown, date(2025, 2, 1)), 2026);
    }

    #[test]
    fn test_base_year() {
        let ctx = AcademicContext {
            year: "2025".to_string(),
            semester: Semester::Fall,
            confidence: Confidence::High,
            evidence: "Fall 2025".to_string(),
        };
        assert_eq!(ctx.base_year(), Some(2025));

        let ranged = AcademicContext {
            year: "2025-2026".to_string(),
            ..ctx.clone()
        };
        assert_eq!(ranged.base_year(), Some(2025));

        let garbled = AcademicContext {
            year: "TBD".to_string(),
            ..ctx
        };
        assert_eq!(garbled.base_year(), None);
    }

    #[test]
    fn test_year_detection_instructions_resolve_anchor_years() {
        let instructions = year_detection_instructions(date(2025, 8, 24));
        assert!(instructions.contains("Today is August 24, 2025"));
        assert!(instructions.contains(r#""Fall" means Fall 2025"#));
        assert!(instructions.contains(r#""Spring" means Spring 2026"#));
        assert!(instructions.contains(r#""Summer" means Summer 2026"#));
        assert!(instructions.contains("default to the 2025-2026 academic year"));
    }

    #[test]
    fn test_context_deserialization_rejects_unknown_fields() {
        let raw = r#"{
            "year": "2025",
            "semester": "Fall",
            "confidence": "High",
            "evidence": "Fall 2025",
            "extra": "nope"
        }"#;
        assert!(serde_json::from_str::<AcademicContext>(raw).is_err());
    }

    #[test]
    fn test_context_deserialization_rejects_bad_enum() {
        let raw = r#"{
            "year": "2025",
            "semester": "Winter",
            "confidence": "High",
            "evidence": "Winter 2025"
        }"#;
        assert!(serde_json::from_str::<AcademicContext>(raw).is_err());
    }

    #[tokio::test]
    async fn test_infer_academic_context() {
        let mut server = mockito::Server::new_async().await;

        let response_body = r#"{
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "{\"year\":\"2025\",\"semester\":\"Fall\",\"confidence\":\"High\",\"evidence\":\"ENGR 1300 - Fall 2025\"}"
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
        let ctx = infer_academic_context(&llm, "ENGR 1300 - Fall 2025", date(2025, 8, 24))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(ctx.year, "2025");
        assert_eq!(ctx.semester, Semester::Fall);
        assert_eq!(ctx.confidence, Confidence::High);
    }

    #[tokio::test]
    async fn test_infer_academic_context_schema_violation() {
        let mut server = mockito::Server::new_async().await;

        // Valid JSON, wrong shape: no fabricated fallback year
        let response_body = r#"{
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "{\"academicYear\":\"2025\"}"
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
        let result = infer_academic_context(&llm, "some syllabus", date(2025, 8, 24)).await;

        mock.assert();
        assert!(result.is_err());
    }
}
