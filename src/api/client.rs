use std::time::Duration;

use async_trait::async_trait;
use log::{error, info, warn};
use once_cell::sync::Lazy;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::models::{
    AnswerRecord, CreateAnswerRequest, QuestionRecord, UpdateAck, UpdateAnswerRequest,
};
use super::{AnswerStore, Result, StoreError};
use crate::config::ApiConfig;

// Shared connection pool, reused by every client handle in the process.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .expect("Failed to build HTTP client")
});

/// HTTP client for the quiz web API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!("⚠️ Could not build a dedicated HTTP client ({}), reusing the shared one", e);
                HTTP_CLIENT.clone()
            });

        Self {
            client,
            base_url: config.base_url.clone(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            return response.json::<T>().await.map_err(|e| {
                error!("Failed to decode {} response: {}", context, e);
                StoreError::Transport(format!("invalid response body: {}", e))
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(context.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Unauthorized,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Validation(body)
            }
            _ => StoreError::Transport(format!("{}: {}", status, body)),
        })
    }
}

#[async_trait]
impl AnswerStore for ApiClient {
    async fn fetch_answer(&self, token: &str, id: &str) -> Result<AnswerRecord> {
        let response = self
            .client
            .get(self.endpoint(&format!("/answers/{}", id)))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Self::decode(response, &format!("answer {}", id)).await
    }

    async fn update_answer(
        &self,
        token: &str,
        id: &str,
        changes: &UpdateAnswerRequest,
    ) -> Result<()> {
        let response = self
            .client
            .patch(self.endpoint(&format!("/answers/{}", id)))
            .header("Authorization", format!("Bearer {}", token))
            .json(changes)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let ack: UpdateAck = Self::decode(response, &format!("answer {}", id)).await?;
        if !ack.success {
            return Err(StoreError::Validation(format!(
                "update of answer {} was not acknowledged",
                id
            )));
        }

        info!("💾 Answer {} updated", id);
        Ok(())
    }

    async fn create_answer(
        &self,
        token: &str,
        request: &CreateAnswerRequest,
    ) -> Result<AnswerRecord> {
        let response = self
            .client
            .post(self.endpoint("/answers"))
            .header("Authorization", format!("Bearer {}", token))
            .json(request)
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        let record: AnswerRecord =
            Self::decode(response, &format!("question {}", request.question_id)).await?;
        info!("💾 Answer {} created for question {}", record.id, request.question_id);
        Ok(record)
    }

    async fn list_answers(&self, token: &str, question_id: &str) -> Result<Vec<AnswerRecord>> {
        let response = self
            .client
            .get(self.endpoint(&format!("/questions/{}/answers", question_id)))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Self::decode(response, &format!("answers of question {}", question_id)).await
    }

    async fn fetch_question(&self, token: &str, id: &str) -> Result<QuestionRecord> {
        let response = self
            .client
            .get(self.endpoint(&format!("/questions/{}", id)))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Self::decode(response, &format!("question {}", id)).await
    }
}
