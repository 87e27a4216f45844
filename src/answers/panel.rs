use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::normalizer::normalize;
use super::resolver;
use super::{AnswerEvent, NormalizedAnswer, PanelError, ResolutionState};
use crate::api::models::QuestionRecord;
use crate::api::AnswerStore;

pub(super) struct PanelState {
    pub answers: Vec<NormalizedAnswer>,
    /// Bumped on every question load. Async work captures the value it
    /// started under and discards its result if the panel has moved on.
    pub generation: u64,
    pub question_id: String,
}

pub(super) struct PanelShared {
    pub store: Arc<dyn AnswerStore>,
    pub token: String,
    pub state: Mutex<PanelState>,
    pub events: UnboundedSender<AnswerEvent>,
}

impl PanelShared {
    pub fn emit(&self, event: AnswerEvent) {
        // The rendering side owns the receiver; if it hung up there is
        // nobody left to notify.
        let _ = self.events.send(event);
    }
}

/// View state for one question's answer list. Owns the normalized
/// entries, spawns one resolution task per bare reference, and feeds
/// per-entry events to the rendering layer.
#[derive(Clone)]
pub struct AnswerPanel {
    pub(super) shared: Arc<PanelShared>,
}

impl AnswerPanel {
    pub fn new(
        store: Arc<dyn AnswerStore>,
        token: impl Into<String>,
    ) -> (Self, UnboundedReceiver<AnswerEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let panel = AnswerPanel {
            shared: Arc::new(PanelShared {
                store,
                token: token.into(),
                state: Mutex::new(PanelState {
                    answers: Vec::new(),
                    generation: 0,
                    question_id: String::new(),
                }),
                events,
            }),
        };
        (panel, receiver)
    }

    /// Replace the panel's contents with a freshly normalized answer
    /// set for `question` and start resolving every bare reference.
    /// Results of resolutions still in flight for the previous question
    /// are discarded when they arrive.
    pub fn load_question(&self, question: &QuestionRecord) -> Vec<NormalizedAnswer> {
        let answers = normalize(
            &question.answers,
            question.correct_answer.as_deref(),
            &question.id,
        );
        let total = answers.len();

        let (generation, pending) = {
            let mut state = self.shared.state.lock();
            state.generation += 1;
            state.question_id = question.id.clone();
            state.answers = answers;
            let pending: Vec<(usize, String)> = state
                .answers
                .iter()
                .enumerate()
                .filter(|(_, a)| a.state == ResolutionState::Unresolved)
                .map(|(position, a)| (position, a.id.clone()))
                .collect();
            (state.generation, pending)
        };

        info!(
            "📋 Question {} loaded: {} answers, {} to resolve",
            question.id,
            total,
            pending.len()
        );

        for (position, id) in pending {
            resolver::spawn_resolution(self.shared.clone(), generation, position, id);
        }

        self.snapshot()
    }

    /// Manual retry for one entry. A no-op unless the entry is
    /// currently unresolved with no fetch in flight.
    pub fn resolve(&self, position: usize) -> Result<(), PanelError> {
        let (generation, id) = {
            let state = self.shared.state.lock();
            let entry = state
                .answers
                .get(position)
                .ok_or(PanelError::UnknownEntry(position))?;
            if entry.state != ResolutionState::Unresolved {
                debug!(
                    "Answer at position {} is {:?}, nothing to resolve",
                    position, entry.state
                );
                return Ok(());
            }
            (state.generation, entry.id.clone())
        };

        resolver::spawn_resolution(self.shared.clone(), generation, position, id);
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<NormalizedAnswer> {
        self.shared.state.lock().answers.clone()
    }

    pub fn generation(&self) -> u64 {
        self.shared.state.lock().generation
    }
}
