use serde::{Deserialize, Serialize};

use crate::answers::{AnswerStore, ValidationError};
use crate::spec::Catalog;

/// Position of a quiz run within its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuizState {
    InProgress { index: usize },
    Completed,
}

impl Default for QuizState {
    fn default() -> Self {
        QuizState::InProgress { index: 0 }
    }
}

/// Outcome of a successful forward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { index: usize },
    Completed,
}

impl QuizState {
    /// Starts at a restored index, clamped into the catalog.
    pub fn resume(catalog: &Catalog, index: usize) -> Self {
        QuizState::InProgress {
            index: index.min(catalog.last_index()),
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self {
            QuizState::InProgress { index } => Some(*index),
            QuizState::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, QuizState::Completed)
    }

    /// Index to persist: the last question once completed.
    pub fn snapshot_index(&self, catalog: &Catalog) -> usize {
        self.index().unwrap_or_else(|| catalog.last_index())
    }

    /// Moves forward if the current question is complete.
    ///
    /// Advancing from `Completed` is a no-op that reports `Transition::Completed` again.
    pub fn advance(
        &self,
        catalog: &Catalog,
        answers: &AnswerStore,
    ) -> Result<(QuizState, Transition), ValidationError> {
        let index = match self {
            QuizState::InProgress { index } => *index,
            QuizState::Completed => return Ok((QuizState::Completed, Transition::Completed)),
        };

        answers.check(catalog.at(index))?;

        if index >= catalog.last_index() {
            Ok((QuizState::Completed, Transition::Completed))
        } else {
            let next = index + 1;
            Ok((QuizState::InProgress { index: next }, Transition::Moved { index: next }))
        }
    }

    /// Previous position, or `None` at the first question.
    pub fn retreat(&self, catalog: &Catalog) -> Option<QuizState> {
        match self {
            QuizState::InProgress { index: 0 } => None,
            QuizState::InProgress { index } => Some(QuizState::InProgress { index: index - 1 }),
            QuizState::Completed => Some(QuizState::InProgress {
                index: catalog.last_index(),
            }),
        }
    }
}
