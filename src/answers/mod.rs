pub mod normalizer;
pub mod panel;

mod editor;
mod resolver;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::models::AnswerRecord;
use crate::api::StoreError;

/// Where an answer entry sits in its loading lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionState {
    /// Only a bare identifier is known; no fetch is in flight.
    Unresolved,
    /// A fetch for the full record is in flight.
    Pending,
    /// Full text and correctness are loaded and displayable.
    Resolved,
}

/// One answer option of a question, after normalization. Every entry in
/// a question view has this shape regardless of which historical data
/// shape it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAnswer {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
    pub question_id: String,
    pub state: ResolutionState,
    /// False for answers added client-side that have not been saved yet.
    pub persisted: bool,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: Option<i64>,
}

impl NormalizedAnswer {
    pub fn resolved(&self) -> bool {
        self.state == ResolutionState::Resolved
    }

    pub(crate) fn apply_record(&mut self, record: &AnswerRecord) {
        self.id = record.id.clone();
        self.text = record.text.clone();
        self.is_correct = record.is_correct;
        if !record.question_id.is_empty() {
            self.question_id = record.question_id.clone();
        }
        self.updated_at = record.updated_at;
        self.version = record.version;
    }
}

/// Per-entry notifications for the rendering layer. Events are scoped
/// to a single entry; siblings never appear in the same event.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AnswerEvent {
    EntryUpdated {
        generation: u64,
        position: usize,
        answer: NormalizedAnswer,
    },
    EntryError {
        generation: u64,
        position: usize,
        message: String,
    },
}

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("No answer at position {0}")]
    UnknownEntry(usize),
    #[error("Answer at position {0} is not yet loaded")]
    NotLoaded(usize),
    #[error("Answer at position {0} has not been saved yet")]
    Draft(usize),
    #[error("Answer at position {0} is already saved")]
    NotDraft(usize),
    #[error("Invalid answer payload: {0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
