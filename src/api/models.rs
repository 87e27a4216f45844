use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Full answer record as the web API stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRecord {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default, rename = "parentQuestionId")]
    pub question_id: String,
    #[serde(default, rename = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub version: Option<i64>,
}

/// Question record as served by the web API. The `answers` payload is
/// kept raw because three historical shapes are still in circulation;
/// the normalizer sorts them out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRecord {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub answers: serde_json::Value,
    /// Free-text correct answer from the oldest data shape.
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub game_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAnswerRequest {
    #[validate(length(min = 1, max = 500))]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnswerRequest {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
    pub is_correct: bool,
    #[serde(rename = "parentQuestionId")]
    pub question_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UpdateAck {
    #[serde(default)]
    pub success: bool,
}
