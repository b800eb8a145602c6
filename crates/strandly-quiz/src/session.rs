use std::sync::Arc;

use quiz_spec::{
    AnswerStore, AnswerValue, Catalog, HairProfile, QuestionSpec, RenderPayload, ValidationError,
    build_render_payload, classify,
};
use quiz_store::epoch_millis;
use tracing::{debug, info};

pub use quiz_spec::{QuizState, Transition};

use crate::clock::Clock;
use crate::error::QuizError;
use crate::listener::{ListenerId, Listeners, QuizListener};
use crate::snapshot::{ProgressSnapshot, SnapshotStore};
use crate::sync::{SubmissionMetadata, SubmissionResult, SyncClient, new_session_id};

/// Local results plus the submission outcome of a finished quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizOutcome {
    pub profile: HairProfile,
    pub submission: SubmissionResult,
}

/// One user's pass through the catalog.
///
/// All mutations take `&mut self`, so they are strictly ordered. Each
/// successful one clears `last_error`, writes a full progress snapshot and
/// notifies listeners.
pub struct QuizSession {
    catalog: Catalog,
    answers: AnswerStore,
    state: QuizState,
    last_error: Option<ValidationError>,
    session_id: String,
    outcome: Option<QuizOutcome>,
    snapshots: SnapshotStore,
    sync: SyncClient,
    clock: Arc<dyn Clock>,
    listeners: Listeners,
}

impl QuizSession {
    /// Resumes fresh persisted progress, or starts at the first question.
    pub fn restore(
        catalog: Catalog,
        snapshots: SnapshotStore,
        sync: SyncClient,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now();
        let (answers, state, session_id) = match snapshots.load_progress(now) {
            Some(snapshot) => {
                let state = QuizState::resume(&catalog, snapshot.current_question_index);
                debug!(index = state.snapshot_index(&catalog), "resuming quiz progress");
                (
                    AnswerStore::restore(&catalog, snapshot.answers),
                    state,
                    snapshot.session_id.unwrap_or_else(|| new_session_id(now)),
                )
            }
            None => (AnswerStore::new(), QuizState::default(), new_session_id(now)),
        };

        Self {
            catalog,
            answers,
            state,
            last_error: None,
            session_id,
            outcome: None,
            snapshots,
            sync,
            clock,
            listeners: Listeners::default(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn state(&self) -> QuizState {
        self.state
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn last_error(&self) -> Option<&ValidationError> {
        self.last_error.as_ref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// `None` once the quiz is completed.
    pub fn current_question(&self) -> Option<&QuestionSpec> {
        self.state.index().map(|index| self.catalog.at(index))
    }

    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    /// Previously computed results that are still inside their retention window.
    pub fn stored_results(&self) -> Option<HairProfile> {
        self.snapshots.load_results(self.clock.now())
    }

    pub fn render(&self) -> RenderPayload {
        build_render_payload(
            &self.catalog,
            &self.answers,
            &self.state,
            self.last_error.as_ref(),
        )
    }

    pub fn subscribe(&mut self, listener: Arc<dyn QuizListener>) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn set_answer(&mut self, question_id: &str, value: AnswerValue) -> Result<(), QuizError> {
        self.ensure_editable()?;
        let question = self.question(question_id)?;
        self.answers
            .set(&question, value)
            .map_err(|error| self.reject(error))?;
        self.last_error = None;
        self.commit();
        debug!(question_id, "answer set");
        Ok(())
    }

    pub fn set_text(&mut self, question_id: &str, text: &str) -> Result<(), QuizError> {
        self.set_answer(question_id, AnswerValue::one(text))
    }

    /// Flips a multiple-choice label and returns whether it is now selected.
    pub fn toggle_choice(&mut self, question_id: &str, label: &str) -> Result<bool, QuizError> {
        self.ensure_editable()?;
        let question = self.question(question_id)?;
        let selected = self
            .answers
            .toggle(&question, label)
            .map_err(|error| self.reject(error))?;
        self.last_error = None;
        self.commit();
        debug!(question_id, label, selected, "choice toggled");
        Ok(selected)
    }

    /// Moves to the next question, or to `Completed` from the last one.
    ///
    /// After `Transition::Completed` the caller runs [`QuizSession::finish`], or
    /// uses [`QuizSession::advance_and_finish`] to do both.
    pub fn advance(&mut self) -> Result<Transition, QuizError> {
        self.ensure_idle()?;
        let (next, transition) = self
            .state
            .advance(&self.catalog, &self.answers)
            .map_err(|error| self.reject(error))?;
        self.state = next;
        self.last_error = None;
        self.commit();
        match transition {
            Transition::Moved { index } => debug!(index, "advanced"),
            Transition::Completed => info!(session_id = %self.session_id, "all questions answered"),
        }
        Ok(transition)
    }

    /// Advances and, when that completes the quiz, runs [`QuizSession::finish`].
    ///
    /// Returns the outcome only on the step that submitted.
    pub async fn advance_and_finish(&mut self) -> Result<Option<QuizOutcome>, QuizError> {
        match self.advance()? {
            Transition::Moved { .. } => Ok(None),
            Transition::Completed => self.finish().await.map(Some),
        }
    }

    /// Steps back one question without validating anything.
    pub fn retreat(&mut self) -> Result<(), QuizError> {
        self.ensure_idle()?;
        let previous = self.state.retreat(&self.catalog).ok_or(QuizError::AtStart)?;
        self.state = previous;
        self.last_error = None;
        self.commit();
        debug!(index = self.state.snapshot_index(&self.catalog), "retreated");
        Ok(())
    }

    /// Classifies and submits a completed quiz.
    ///
    /// Results are stored locally before submission. Progress is cleared
    /// once the submission yields a correlation id.
    pub async fn finish(&mut self) -> Result<QuizOutcome, QuizError> {
        if !self.state.is_completed() {
            return Err(QuizError::NotCompleted);
        }

        let profile = classify(&self.answers, self.clock.now());
        self.snapshots.save_results(&profile);

        let metadata = SubmissionMetadata::new(self.session_id.clone());
        let submission = self.sync.submit(&self.answers, &metadata).await?;
        self.snapshots.clear_progress();

        info!(
            correlation_id = %submission.correlation_id,
            remote = submission.is_remote(),
            hair_type = %profile.hair_type.code,
            damage = profile.damage_level.as_str(),
            "quiz finished"
        );

        let outcome = QuizOutcome {
            profile,
            submission,
        };
        self.outcome = Some(outcome.clone());
        self.notify();
        Ok(outcome)
    }

    /// Forgets everything and returns to the first question.
    pub fn restart(&mut self) -> Result<(), QuizError> {
        self.ensure_idle()?;
        self.sync.clear();
        self.answers.clear();
        self.state = QuizState::default();
        self.last_error = None;
        self.outcome = None;
        self.session_id = new_session_id(self.clock.now());
        self.commit();
        info!(session_id = %self.session_id, "quiz restarted");
        Ok(())
    }

    fn question(&self, question_id: &str) -> Result<QuestionSpec, QuizError> {
        self.catalog
            .question(question_id)
            .cloned()
            .ok_or_else(|| QuizError::UnknownQuestion(question_id.to_string()))
    }

    fn ensure_idle(&self) -> Result<(), QuizError> {
        if self.sync.is_in_flight() {
            return Err(QuizError::SubmissionInFlight);
        }
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), QuizError> {
        self.ensure_idle()?;
        if self.state.is_completed() {
            return Err(QuizError::AlreadyCompleted);
        }
        Ok(())
    }

    /// Keeps state as is, records the error and shows it to listeners.
    fn reject(&mut self, error: ValidationError) -> QuizError {
        debug!(
            question_id = error.question_id.as_deref().unwrap_or(""),
            code = error.code().unwrap_or(""),
            "rejected"
        );
        self.last_error = Some(error.clone());
        self.notify();
        QuizError::Validation(error)
    }

    fn commit(&self) {
        self.snapshots.save_progress(&ProgressSnapshot {
            current_question_index: self.state.snapshot_index(&self.catalog),
            answers: self.answers.as_map().clone(),
            timestamp: epoch_millis(self.clock.now()),
            session_id: Some(self.session_id.clone()),
        });
        self.notify();
    }

    fn notify(&self) {
        if self.listeners.is_empty() {
            return;
        }
        self.listeners.notify(&self.render());
    }
}
