use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;

use super::{NormalizedAnswer, ResolutionState};

/// Strings longer than this are taken to be record identifiers rather
/// than literal answer text. The web app's store keys are 24+ character
/// strings while legacy free-text answers are almost always shorter, so
/// length is the only signal the data leaves us.
pub const REFERENCE_ID_THRESHOLD: usize = 20;

/// One element of a question's raw answer collection, after
/// classification. Three historical shapes are still in circulation.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerReference {
    /// Legacy free-text answer; correctness comes from the parent
    /// question's `correctAnswer` field.
    Legacy(String),
    /// Bare identifier of an answer record stored separately.
    Reference(String),
    /// Inline record with its text embedded.
    Inline {
        id: Option<String>,
        text: String,
        is_correct: bool,
        question_id: Option<String>,
        updated_at: Option<DateTime<Utc>>,
        version: Option<i64>,
    },
}

/// Turn a question's raw answer collection into uniform entries.
///
/// Pure and synchronous. Malformed or empty input degrades to an empty
/// set instead of failing the question view. Output length always
/// equals input length and source order is preserved, so display labels
/// (A, B, C, ...) stay stable.
pub fn normalize(
    raw: &Value,
    legacy_correct: Option<&str>,
    question_id: &str,
) -> Vec<NormalizedAnswer> {
    let Some(items) = raw.as_array() else {
        if !raw.is_null() {
            debug!(
                "🧹 Answer collection of question {} is not an array, treating as empty",
                question_id
            );
        }
        return Vec::new();
    };

    // Collection-level rule first: a set where every element looks like
    // a store key is the pure-reference shape. Checked before the
    // per-element rules so mixed collections fall through to those.
    let all_references = !items.is_empty()
        && items
            .iter()
            .all(|v| matches!(v.as_str(), Some(s) if is_reference_id(s)));

    items
        .iter()
        .enumerate()
        .map(|(position, value)| {
            let reference = if all_references {
                AnswerReference::Reference(value.as_str().unwrap_or_default().to_string())
            } else {
                classify(value)
            };
            entry_from(reference, legacy_correct, question_id, position)
        })
        .collect()
}

fn is_reference_id(value: &str) -> bool {
    value.chars().count() > REFERENCE_ID_THRESHOLD
}

/// Classify a single raw element into one of the three known shapes.
/// Anything unrecognized degrades to a legacy-text entry of its
/// rendered form so that no element is ever dropped.
pub fn classify(value: &Value) -> AnswerReference {
    match value {
        Value::Object(fields) => match fields.get("text").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => AnswerReference::Inline {
                id: fields
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                text: text.to_string(),
                is_correct: is_truthy(fields.get("isCorrect")),
                question_id: fields
                    .get("parentQuestionId")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                updated_at: fields
                    .get("timestamp")
                    .and_then(Value::as_str)
                    .and_then(|s| s.parse().ok()),
                version: fields.get("version").and_then(Value::as_i64),
            },
            _ => AnswerReference::Legacy(value.to_string()),
        },
        Value::String(s) if is_reference_id(s) => AnswerReference::Reference(s.clone()),
        Value::String(s) => AnswerReference::Legacy(s.clone()),
        other => AnswerReference::Legacy(other.to_string()),
    }
}

// The web API has stored correctness as a bool in some rows and as a
// 0/1 number in others.
fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1) || n.as_f64() == Some(1.0),
        _ => false,
    }
}

fn entry_from(
    reference: AnswerReference,
    legacy_correct: Option<&str>,
    question_id: &str,
    position: usize,
) -> NormalizedAnswer {
    match reference {
        AnswerReference::Reference(id) => NormalizedAnswer {
            id,
            text: String::new(),
            is_correct: false,
            question_id: question_id.to_string(),
            state: ResolutionState::Unresolved,
            persisted: true,
            updated_at: None,
            version: None,
        },
        AnswerReference::Legacy(text) => NormalizedAnswer {
            // The legacy shape has no separate identifier; the text is
            // the key. Empty text falls back to the list position so
            // the id invariant holds.
            id: if text.is_empty() {
                format!("answer-{}", position)
            } else {
                text.clone()
            },
            is_correct: legacy_correct == Some(text.as_str()),
            text,
            question_id: question_id.to_string(),
            state: ResolutionState::Resolved,
            persisted: true,
            updated_at: None,
            version: None,
        },
        AnswerReference::Inline {
            id,
            text,
            is_correct,
            question_id: record_question_id,
            updated_at,
            version,
        } => NormalizedAnswer {
            id: id.unwrap_or_else(|| text.clone()),
            text,
            is_correct,
            question_id: record_question_id.unwrap_or_else(|| question_id.to_string()),
            state: ResolutionState::Resolved,
            persisted: true,
            updated_at,
            version,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_and_malformed_collections_degrade_to_empty() {
        assert!(normalize(&json!([]), None, "q-1").is_empty());
        assert!(normalize(&Value::Null, None, "q-1").is_empty());
        assert!(normalize(&json!({"oops": true}), None, "q-1").is_empty());
        assert!(normalize(&json!("not a list"), None, "q-1").is_empty());
    }

    #[test]
    fn test_legacy_texts_resolve_against_the_correct_answer_field() {
        let entries = normalize(&json!(["Paris", "London"]), Some("Paris"), "q-1");

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "Paris");
        assert!(entries[0].is_correct);
        assert!(entries[0].resolved());
        assert_eq!(entries[1].text, "London");
        assert!(!entries[1].is_correct);
        assert!(entries[1].resolved());
    }

    #[test]
    fn test_all_long_strings_become_unresolved_references() {
        let entries = normalize(
            &json!([
                "64f1c2aa9be4d10012ab9001",
                "64f1c2aa9be4d10012ab9002",
                "64f1c2aa9be4d10012ab9003"
            ]),
            None,
            "q-1",
        );

        assert_eq!(entries.len(), 3);
        for entry in &entries {
            assert_eq!(entry.state, ResolutionState::Unresolved);
            assert_eq!(entry.text, "");
            assert!(!entry.is_correct);
        }
        assert_eq!(entries[0].id, "64f1c2aa9be4d10012ab9001");
    }

    #[test]
    fn test_inline_objects_with_numeric_correctness_flag() {
        let entries = normalize(&json!([{"id": "a1", "text": "4", "isCorrect": 1}]), None, "q-1");

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "a1");
        assert_eq!(entries[0].text, "4");
        assert!(entries[0].is_correct);
        assert!(entries[0].resolved());
    }

    #[test]
    fn test_inline_objects_carry_their_record_fields() {
        let entries = normalize(
            &json!([{
                "id": "a7",
                "text": "Photosynthesis",
                "isCorrect": true,
                "parentQuestionId": "q-9",
                "timestamp": "2024-03-01T10:00:00Z",
                "version": 3
            }]),
            None,
            "q-1",
        );

        assert_eq!(entries[0].question_id, "q-9");
        assert!(entries[0].updated_at.is_some());
        assert_eq!(entries[0].version, Some(3));
    }

    #[test]
    fn test_mixed_collections_classify_per_element() {
        let entries = normalize(
            &json!([
                "Paris",
                "64f1c2aa9be4d10012ab90aa",
                {"id": "a2", "text": "Berlin", "isCorrect": false}
            ]),
            Some("Paris"),
            "q-1",
        );

        assert_eq!(entries.len(), 3);
        assert!(entries[0].resolved());
        assert!(entries[0].is_correct);
        assert_eq!(entries[1].state, ResolutionState::Unresolved);
        assert_eq!(entries[1].id, "64f1c2aa9be4d10012ab90aa");
        assert!(entries[2].resolved());
        assert_eq!(entries[2].text, "Berlin");
    }

    #[test]
    fn test_order_and_length_are_preserved() {
        let raw = json!(["C", "A", "B", "A"]);
        let entries = normalize(&raw, None, "q-1");

        assert_eq!(entries.len(), 4);
        let texts: Vec<&str> = entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["C", "A", "B", "A"]);
    }

    #[test]
    fn test_duplicate_identifiers_stay_duplicated() {
        let entries = normalize(
            &json!(["64f1c2aa9be4d10012ab90aa", "64f1c2aa9be4d10012ab90aa"]),
            None,
            "q-1",
        );

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, entries[1].id);
    }

    #[test]
    fn test_unrecognized_values_degrade_to_rendered_text() {
        let entries = normalize(&json!([42, true, {"broken": "shape"}]), None, "q-1");

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].text, "42");
        assert_eq!(entries[1].text, "true");
        assert_eq!(entries[2].text, "{\"broken\":\"shape\"}");
        assert!(entries.iter().all(|e| e.resolved()));
    }

    #[test]
    fn test_object_with_empty_text_is_not_treated_as_inline() {
        let entries = normalize(&json!([{"id": "a1", "text": ""}]), None, "q-1");

        assert_eq!(entries.len(), 1);
        assert!(entries[0].resolved());
        // Rendered form, not the inline shape.
        assert!(entries[0].text.contains("a1"));
    }

    #[test]
    fn test_empty_string_answers_get_a_positional_id() {
        let entries = normalize(&json!(["", "Oslo"]), None, "q-1");

        assert_eq!(entries[0].id, "answer-0");
        assert_eq!(entries[1].id, "Oslo");
    }

    #[test]
    fn test_exactly_threshold_length_is_still_text() {
        let text = "a".repeat(REFERENCE_ID_THRESHOLD);
        let entries = normalize(&json!([text.clone()]), None, "q-1");

        assert!(entries[0].resolved());
        assert_eq!(entries[0].text, text);
    }
}
