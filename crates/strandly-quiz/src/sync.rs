use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use quiz_spec::AnswerStore;
use quiz_store::epoch_millis;
use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{QuizError, TransportError};
use crate::snapshot::SnapshotStore;
use crate::transport::{QuizApi, SUBMIT_PATH};

pub const CLIENT_NAME: &str = concat!("strandly-quiz/", env!("CARGO_PKG_VERSION"));

/// What to do when the backend cannot accept a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Mint a `local_<epoch ms>` id and keep the payload in storage.
    #[default]
    LocalId,
    /// Return the transport error to the caller.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Remote,
    LocalFallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    pub correlation_id: String,
    pub status: SubmissionStatus,
    pub warning: Option<String>,
}

impl SubmissionResult {
    pub fn is_remote(&self) -> bool {
        self.status == SubmissionStatus::Remote
    }
}

/// Client context sent alongside the answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionMetadata {
    pub session_id: String,
    pub client: String,
    pub platform: String,
}

impl SubmissionMetadata {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            client: CLIENT_NAME.to_string(),
            platform: std::env::consts::OS.to_string(),
        }
    }
}

/// `session_<epoch ms>_<9 random chars>`.
pub fn new_session_id(now: OffsetDateTime) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("session_{}_{}", epoch_millis(now), &random[..9])
}

/// Submission body: answers flattened next to the session metadata.
pub fn build_payload(
    answers: &AnswerStore,
    metadata: &SubmissionMetadata,
    submitted_at: OffsetDateTime,
) -> Result<Map<String, Value>, QuizError> {
    let mut payload = answers.to_json_map();
    payload.insert(
        "sessionId".into(),
        Value::String(metadata.session_id.clone()),
    );
    payload.insert(
        "submittedAt".into(),
        Value::String(submitted_at.format(&Rfc3339)?),
    );
    payload.insert(
        "clientInfo".into(),
        json!({ "client": metadata.client, "platform": metadata.platform }),
    );
    Ok(payload)
}

/// Releases the single-flight flag when dropped.
pub(crate) struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag: flag.clone() })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Sends completed answers to the backend and tracks the resulting correlation id.
#[derive(Clone)]
pub struct SyncClient {
    api: Arc<dyn QuizApi>,
    snapshots: SnapshotStore,
    clock: Arc<dyn Clock>,
    timeout: Duration,
    policy: FallbackPolicy,
    in_flight: Arc<AtomicBool>,
}

impl SyncClient {
    pub fn new(
        api: Arc<dyn QuizApi>,
        snapshots: SnapshotStore,
        clock: Arc<dyn Clock>,
        timeout: Duration,
    ) -> Self {
        Self {
            api,
            snapshots,
            clock,
            timeout,
            policy: FallbackPolicy::default(),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_policy(mut self, policy: FallbackPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn submit(
        &self,
        answers: &AnswerStore,
        metadata: &SubmissionMetadata,
    ) -> Result<SubmissionResult, QuizError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(QuizError::SubmissionInFlight)?;

        let now = self.clock.now();
        let payload = build_payload(answers, metadata, now)?;

        let outcome = match tokio::time::timeout(self.timeout, self.api.submit_quiz(&payload)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                endpoint: SUBMIT_PATH.to_string(),
                seconds: self.timeout.as_secs(),
            }),
        };
        let outcome = outcome.and_then(|response| {
            let quiz_id = response.quiz_id.trim().to_string();
            if quiz_id.is_empty() {
                Err(TransportError::Decode {
                    endpoint: SUBMIT_PATH.to_string(),
                    message: "empty quizId".to_string(),
                })
            } else {
                Ok(quiz_id)
            }
        });

        match outcome {
            Ok(quiz_id) => {
                self.snapshots.save_quiz_id(&quiz_id);
                self.snapshots.clear_answers_backup();
                info!(correlation_id = %quiz_id, "quiz submitted");
                Ok(SubmissionResult {
                    correlation_id: quiz_id,
                    status: SubmissionStatus::Remote,
                    warning: None,
                })
            }
            Err(err) => match self.policy {
                FallbackPolicy::Fail => {
                    warn!(error = %err, "quiz submission failed");
                    Err(QuizError::Transport(err))
                }
                FallbackPolicy::LocalId => {
                    let local_id = format!("local_{}", epoch_millis(now));
                    self.snapshots.save_answers_backup(&payload);
                    self.snapshots.save_quiz_id(&local_id);
                    warn!(
                        correlation_id = %local_id,
                        error = %err,
                        "quiz submission failed, continuing with a local id"
                    );
                    Ok(SubmissionResult {
                        correlation_id: local_id,
                        status: SubmissionStatus::LocalFallback,
                        warning: Some(err.to_string()),
                    })
                }
            },
        }
    }

    /// Stored correlation id from the last submission.
    pub fn correlation_id(&self) -> Option<String> {
        self.snapshots.quiz_id()
    }

    /// Forgets progress, results, the payload backup and the correlation id.
    pub fn clear(&self) {
        self.snapshots.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_have_the_expected_shape() {
        let id = new_session_id(OffsetDateTime::UNIX_EPOCH + time::Duration::milliseconds(42));
        let parts: Vec<_> = id.split('_').collect();
        assert_eq!(parts[0], "session");
        assert_eq!(parts[1], "42");
        assert_eq!(parts[2].len(), 9);
    }

    #[test]
    fn guard_is_exclusive_until_dropped() {
        let flag = Arc::new(AtomicBool::new(false));
        let first = InFlightGuard::acquire(&flag).expect("free");
        assert!(InFlightGuard::acquire(&flag).is_none());
        drop(first);
        assert!(InFlightGuard::acquire(&flag).is_some());
    }
}
