use log::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::panel::AnswerPanel;
use super::{AnswerEvent, NormalizedAnswer, PanelError, ResolutionState};
use crate::api::models::{CreateAnswerRequest, UpdateAnswerRequest};

impl AnswerPanel {
    /// Persist a change to one answer's text and/or correctness flag
    /// and mirror it in memory on success. On failure the in-memory
    /// entry is left exactly as it was. Only loaded, saved entries can
    /// be edited; drafts go through `save_answer` instead.
    pub async fn submit_edit(
        &self,
        position: usize,
        changes: UpdateAnswerRequest,
    ) -> Result<(), PanelError> {
        let (generation, id) = {
            let state = self.shared.state.lock();
            let entry = state
                .answers
                .get(position)
                .ok_or(PanelError::UnknownEntry(position))?;
            if entry.state != ResolutionState::Resolved {
                return Err(PanelError::NotLoaded(position));
            }
            if !entry.persisted {
                return Err(PanelError::Draft(position));
            }
            (state.generation, entry.id.clone())
        };

        changes
            .validate()
            .map_err(|e| PanelError::Invalid(e.to_string()))?;

        match self
            .shared
            .store
            .update_answer(&self.shared.token, &id, &changes)
            .await
        {
            Ok(()) => {
                let mut state = self.shared.state.lock();
                if state.generation != generation {
                    debug!(
                        "🗑️ Edit of answer {} landed after its question view was replaced, discarding",
                        id
                    );
                    return Ok(());
                }
                let Some(entry) = state.answers.get_mut(position) else {
                    return Ok(());
                };
                if let Some(text) = changes.text {
                    entry.text = text;
                }
                if let Some(is_correct) = changes.is_correct {
                    entry.is_correct = is_correct;
                }
                let answer = entry.clone();
                drop(state);
                self.shared.emit(AnswerEvent::EntryUpdated {
                    generation,
                    position,
                    answer,
                });
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ Edit of answer {} rejected: {}", id, e);
                self.shared.emit(AnswerEvent::EntryError {
                    generation,
                    position,
                    message: e.to_string(),
                });
                Err(PanelError::Store(e))
            }
        }
    }

    /// Append a draft answer to the current question. Drafts live only
    /// in this panel until saved; their placeholder id must never reach
    /// the store's update path.
    pub fn add_answer(&self, text: impl Into<String>, is_correct: bool) -> usize {
        let mut state = self.shared.state.lock();
        let entry = NormalizedAnswer {
            id: format!("local-{}", Uuid::new_v4()),
            text: text.into(),
            is_correct,
            question_id: state.question_id.clone(),
            state: ResolutionState::Resolved,
            persisted: false,
            updated_at: None,
            version: None,
        };
        state.answers.push(entry.clone());
        let position = state.answers.len() - 1;
        let generation = state.generation;
        drop(state);

        self.shared.emit(AnswerEvent::EntryUpdated {
            generation,
            position,
            answer: entry,
        });
        position
    }

    /// Create the backing record for a draft entry. On success the
    /// server-assigned id, timestamp and version replace the local
    /// placeholder and the entry becomes editable.
    pub async fn save_answer(&self, position: usize) -> Result<(), PanelError> {
        let (generation, request) = {
            let state = self.shared.state.lock();
            let entry = state
                .answers
                .get(position)
                .ok_or(PanelError::UnknownEntry(position))?;
            if entry.persisted {
                return Err(PanelError::NotDraft(position));
            }
            let request = CreateAnswerRequest {
                text: entry.text.clone(),
                is_correct: entry.is_correct,
                question_id: entry.question_id.clone(),
            };
            (state.generation, request)
        };

        request
            .validate()
            .map_err(|e| PanelError::Invalid(e.to_string()))?;

        match self
            .shared
            .store
            .create_answer(&self.shared.token, &request)
            .await
        {
            Ok(record) => {
                let mut state = self.shared.state.lock();
                if state.generation != generation {
                    debug!(
                        "🗑️ Created answer {} after its question view was replaced, dropping the draft",
                        record.id
                    );
                    return Ok(());
                }
                let Some(entry) = state.answers.get_mut(position) else {
                    return Ok(());
                };
                entry.apply_record(&record);
                entry.state = ResolutionState::Resolved;
                entry.persisted = true;
                let answer = entry.clone();
                drop(state);
                info!("💾 Draft answer saved as {}", answer.id);
                self.shared.emit(AnswerEvent::EntryUpdated {
                    generation,
                    position,
                    answer,
                });
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ Could not save draft answer: {}", e);
                self.shared.emit(AnswerEvent::EntryError {
                    generation,
                    position,
                    message: e.to_string(),
                });
                Err(PanelError::Store(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::super::testing::{question, wait_for, MockStore};
    use super::*;

    fn edit(text: Option<&str>, is_correct: Option<bool>) -> UpdateAnswerRequest {
        UpdateAnswerRequest {
            text: text.map(str::to_string),
            is_correct,
        }
    }

    #[tokio::test]
    async fn test_edits_round_trip_through_the_store() {
        let store = Arc::new(MockStore::new());
        store.insert("a1", "Pari", false);

        let (panel, _events) = AnswerPanel::new(store.clone(), "token");
        panel.load_question(&question(
            "q-1",
            json!([{"id": "a1", "text": "Pari", "isCorrect": false}]),
        ));

        panel
            .submit_edit(0, edit(Some("Paris"), Some(true)))
            .await
            .unwrap();

        let answers = panel.snapshot();
        assert_eq!(answers[0].text, "Paris");
        assert!(answers[0].is_correct);
        assert!(answers[0].resolved());
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_edits_against_unloaded_entries_never_reach_the_store() {
        let store = Arc::new(MockStore::new());

        let (panel, _events) = AnswerPanel::new(store.clone(), "token");
        panel.load_question(&question("q-1", json!(["64f1c2aa9be4d10012ab9404"])));

        wait_for(&panel, |answers| {
            answers[0].state == ResolutionState::Unresolved
        })
        .await;

        let result = panel.submit_edit(0, edit(Some("Paris"), None)).await;
        assert!(matches!(result, Err(PanelError::NotLoaded(0))));
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_a_rejected_edit_leaves_the_entry_unchanged() {
        let store = Arc::new(MockStore::new());
        store.reject_updates();

        let (panel, mut events) = AnswerPanel::new(store.clone(), "token");
        panel.load_question(&question(
            "q-1",
            json!([{"id": "a1", "text": "Paris", "isCorrect": true}]),
        ));
        while events.try_recv().is_ok() {}

        let result = panel.submit_edit(0, edit(Some("Lyon"), Some(false))).await;
        assert!(matches!(result, Err(PanelError::Store(_))));

        let answers = panel.snapshot();
        assert_eq!(answers[0].text, "Paris");
        assert!(answers[0].is_correct);
        assert!(matches!(
            events.try_recv(),
            Ok(AnswerEvent::EntryError { position: 0, .. })
        ));
    }

    #[tokio::test]
    async fn test_edits_to_one_entry_never_touch_its_siblings() {
        let store = Arc::new(MockStore::new());
        store.insert("a1", "Paris", true);
        store.insert("a2", "London", false);

        let (panel, _events) = AnswerPanel::new(store.clone(), "token");
        panel.load_question(&question(
            "q-1",
            json!([
                {"id": "a1", "text": "Paris", "isCorrect": true},
                {"id": "a2", "text": "London", "isCorrect": false}
            ]),
        ));

        panel.submit_edit(0, edit(Some("Lutetia"), None)).await.unwrap();

        let answers = panel.snapshot();
        assert_eq!(answers[0].text, "Lutetia");
        assert_eq!(answers[1].text, "London");
        assert!(!answers[1].is_correct);
    }

    #[tokio::test]
    async fn test_empty_text_is_rejected_before_the_store_is_contacted() {
        let store = Arc::new(MockStore::new());

        let (panel, _events) = AnswerPanel::new(store.clone(), "token");
        panel.load_question(&question(
            "q-1",
            json!([{"id": "a1", "text": "Paris", "isCorrect": true}]),
        ));

        let result = panel.submit_edit(0, edit(Some(""), None)).await;
        assert!(matches!(result, Err(PanelError::Invalid(_))));
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_drafts_must_be_saved_before_they_can_be_edited() {
        let store = Arc::new(MockStore::new());

        let (panel, _events) = AnswerPanel::new(store.clone(), "token");
        panel.load_question(&question("q-1", json!(["Paris"])));

        let position = panel.add_answer("Madrid", false);
        let answers = panel.snapshot();
        assert!(answers[position].id.starts_with("local-"));
        assert!(!answers[position].persisted);

        let result = panel.submit_edit(position, edit(Some("Rome"), None)).await;
        assert!(matches!(result, Err(PanelError::Draft(_))));
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);

        panel.save_answer(position).await.unwrap();
        let answers = panel.snapshot();
        assert_eq!(answers[position].id, "srv-1");
        assert!(answers[position].persisted);

        panel
            .submit_edit(position, edit(Some("Rome"), None))
            .await
            .unwrap();
        assert_eq!(panel.snapshot()[position].text, "Rome");
    }

    #[tokio::test]
    async fn test_saving_a_persisted_entry_is_rejected() {
        let store = Arc::new(MockStore::new());

        let (panel, _events) = AnswerPanel::new(store.clone(), "token");
        panel.load_question(&question(
            "q-1",
            json!([{"id": "a1", "text": "Paris", "isCorrect": true}]),
        ));

        let result = panel.save_answer(0).await;
        assert!(matches!(result, Err(PanelError::NotDraft(0))));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_an_edit_landing_after_a_reload_is_discarded() {
        let store = Arc::new(MockStore::gated());
        store.insert("a1", "Paris", true);

        let (panel, _events) = AnswerPanel::new(store.clone(), "token");
        panel.load_question(&question(
            "q-1",
            json!([{"id": "a1", "text": "Paris", "isCorrect": true}]),
        ));

        let editing = {
            let panel = panel.clone();
            tokio::spawn(async move { panel.submit_edit(0, edit(Some("Lyon"), None)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // The question is reloaded while the update is still in flight.
        panel.load_question(&question("q-2", json!(["Madrid"])));
        store.release(1);

        editing.await.unwrap().unwrap();
        assert_eq!(panel.snapshot()[0].text, "Madrid");
    }
}
