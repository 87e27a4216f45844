pub mod answers;
pub mod api;
pub mod config;

pub use answers::normalizer::{normalize, AnswerReference, REFERENCE_ID_THRESHOLD};
pub use answers::panel::AnswerPanel;
pub use answers::{AnswerEvent, NormalizedAnswer, PanelError, ResolutionState};
pub use api::client::ApiClient;
pub use api::models::{AnswerRecord, CreateAnswerRequest, QuestionRecord, UpdateAnswerRequest};
pub use api::{AnswerStore, StoreError};
pub use config::ApiConfig;
