use std::sync::Arc;

use quiz_spec::RenderPayload;

/// Receives a fresh render payload after every session change.
pub trait QuizListener: Send + Sync {
    fn on_change(&self, payload: &RenderPayload);
}

impl<F> QuizListener for F
where
    F: Fn(&RenderPayload) + Send + Sync,
{
    fn on_change(&self, payload: &RenderPayload) {
        self(payload)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Arc<dyn QuizListener>)>,
}

impl Listeners {
    pub(crate) fn add(&mut self, listener: Arc<dyn QuizListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn notify(&self, payload: &RenderPayload) {
        for (_, listener) in &self.entries {
            listener.on_change(payload);
        }
    }
}
