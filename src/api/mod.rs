pub mod client;
pub mod models;

pub use client::ApiClient;
pub use models::{AnswerRecord, CreateAnswerRequest, QuestionRecord, UpdateAnswerRequest};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Request rejected: {0}")]
    Validation(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Transport failure: {0}")]
    Transport(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// The quiz web API, reduced to the record operations the answer panel
/// needs. The session token is a parameter on every call so the panel
/// never depends on ambient auth state.
#[async_trait]
pub trait AnswerStore: Send + Sync {
    async fn fetch_answer(&self, token: &str, id: &str) -> Result<AnswerRecord>;

    async fn update_answer(
        &self,
        token: &str,
        id: &str,
        changes: &UpdateAnswerRequest,
    ) -> Result<()>;

    async fn create_answer(&self, token: &str, request: &CreateAnswerRequest)
        -> Result<AnswerRecord>;

    async fn list_answers(&self, token: &str, question_id: &str) -> Result<Vec<AnswerRecord>>;

    async fn fetch_question(&self, token: &str, id: &str) -> Result<QuestionRecord>;
}
