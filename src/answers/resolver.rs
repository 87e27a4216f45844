use std::sync::Arc;

use log::{debug, warn};

use super::panel::PanelShared;
use super::{AnswerEvent, ResolutionState};

/// Fetch the full record behind one bare reference and write it into
/// its slot. One task per entry: sibling entries keep their own loading
/// state and an error here never touches them. Two entries holding the
/// same id fetch it twice; both land on the same value.
pub(super) fn spawn_resolution(
    shared: Arc<PanelShared>,
    generation: u64,
    position: usize,
    id: String,
) {
    // Claim the slot before the task runs so a second spawn for the
    // same position sees Pending and backs off.
    {
        let mut state = shared.state.lock();
        if state.generation != generation {
            return;
        }
        match state.answers.get_mut(position) {
            Some(entry) if entry.state == ResolutionState::Unresolved => {
                entry.state = ResolutionState::Pending;
            }
            _ => return,
        }
    }

    tokio::spawn(async move {
        let fetched = shared.store.fetch_answer(&shared.token, &id).await;

        let mut state = shared.state.lock();
        if state.generation != generation {
            debug!(
                "🗑️ Resolution of answer {} arrived after its question view was replaced, discarding",
                id
            );
            return;
        }
        let Some(entry) = state.answers.get_mut(position) else {
            return;
        };

        match fetched {
            Ok(record) => {
                entry.apply_record(&record);
                entry.state = ResolutionState::Resolved;
                let answer = entry.clone();
                drop(state);
                shared.emit(AnswerEvent::EntryUpdated {
                    generation,
                    position,
                    answer,
                });
            }
            Err(e) => {
                warn!("⚠️ Could not resolve answer {}: {}", id, e);
                entry.state = ResolutionState::Unresolved;
                drop(state);
                shared.emit(AnswerEvent::EntryError {
                    generation,
                    position,
                    message: e.to_string(),
                });
            }
        }
    });
}
