//! Persisted quiz progress and results.

use std::collections::BTreeMap;
use std::sync::Arc;

use quiz_spec::{AnswerValue, HairProfile};
use quiz_store::{JsonStoreExt, KeyValueStore, from_epoch_millis, is_fresh};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

pub const PROGRESS_KEY: &str = "strandly_quiz_progress";
pub const RESULTS_KEY: &str = "strandly_quiz_results";
pub const QUIZ_ID_KEY: &str = "strandly_quiz_id";
pub const ANSWERS_BACKUP_KEY: &str = "strandly_quiz_answers";

/// Full progress state as written after every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub current_question_index: usize,
    pub answers: BTreeMap<String, AnswerValue>,
    /// Epoch milliseconds.
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Typed access to the quiz keys of a shared [`KeyValueStore`].
///
/// Storage failures are logged and swallowed; the quiz keeps working from memory.
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn KeyValueStore>,
    progress_ttl: Duration,
    results_ttl: Duration,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn KeyValueStore>, progress_ttl: Duration, results_ttl: Duration) -> Self {
        Self {
            store,
            progress_ttl,
            results_ttl,
        }
    }

    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Latest progress if still inside the expiry window; stale snapshots are removed.
    pub fn load_progress(&self, now: OffsetDateTime) -> Option<ProgressSnapshot> {
        let snapshot: ProgressSnapshot = self.read(PROGRESS_KEY)?;
        let fresh = from_epoch_millis(snapshot.timestamp)
            .is_some_and(|saved_at| is_fresh(saved_at, self.progress_ttl, now));
        if !fresh {
            debug!(timestamp = snapshot.timestamp, "discarding expired quiz progress");
            self.remove(PROGRESS_KEY);
            return None;
        }
        Some(snapshot)
    }

    pub fn save_progress(&self, snapshot: &ProgressSnapshot) {
        self.write(PROGRESS_KEY, snapshot);
    }

    pub fn clear_progress(&self) {
        self.remove(PROGRESS_KEY);
    }

    pub fn load_results(&self, now: OffsetDateTime) -> Option<HairProfile> {
        let profile: HairProfile = self.read(RESULTS_KEY)?;
        if !is_fresh(profile.created_at, self.results_ttl, now) {
            debug!(created_at = %profile.created_at, "discarding expired quiz results");
            self.remove(RESULTS_KEY);
            return None;
        }
        Some(profile)
    }

    pub fn save_results(&self, profile: &HairProfile) {
        self.write(RESULTS_KEY, profile);
    }

    pub fn clear_results(&self) {
        self.remove(RESULTS_KEY);
    }

    pub fn quiz_id(&self) -> Option<String> {
        match self.store.get(QUIZ_ID_KEY) {
            Ok(id) => id.filter(|id| !id.trim().is_empty()),
            Err(err) => {
                warn!(key = QUIZ_ID_KEY, error = %err, "failed to read quiz id");
                None
            }
        }
    }

    pub fn save_quiz_id(&self, quiz_id: &str) {
        if let Err(err) = self.store.set(QUIZ_ID_KEY, quiz_id) {
            warn!(key = QUIZ_ID_KEY, error = %err, "failed to persist quiz id");
        }
    }

    pub fn clear_quiz_id(&self) {
        self.remove(QUIZ_ID_KEY);
    }

    pub fn answers_backup(&self) -> Option<Map<String, Value>> {
        self.read(ANSWERS_BACKUP_KEY)
    }

    pub fn save_answers_backup(&self, payload: &Map<String, Value>) {
        self.write(ANSWERS_BACKUP_KEY, payload);
    }

    pub fn clear_answers_backup(&self) {
        self.remove(ANSWERS_BACKUP_KEY);
    }

    /// Removes every quiz key.
    pub fn clear_all(&self) {
        for key in [PROGRESS_KEY, RESULTS_KEY, QUIZ_ID_KEY, ANSWERS_BACKUP_KEY] {
            self.remove(key);
        }
    }

    fn read<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.store.get_json(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "failed to read stored quiz data");
                None
            }
        }
    }

    fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = self.store.set_json(key, value) {
            warn!(key, error = %err, "failed to persist quiz data");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(err) = self.store.remove(key) {
            warn!(key, error = %err, "failed to remove stored quiz data");
        }
    }
}
