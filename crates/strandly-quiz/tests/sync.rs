mod common;

use std::sync::Arc;

use serde_json::Value;

use common::{FakeApi, Harness, START, SubmitBehavior, answer_first};
use strandly_quiz::quiz_spec::{AnswerStore, AnswerValue, builtin_catalog};
use strandly_quiz::quiz_store::{JsonStoreExt, KeyValueStore, epoch_millis};
use strandly_quiz::snapshot::{ANSWERS_BACKUP_KEY, QUIZ_ID_KEY};
use strandly_quiz::{FallbackPolicy, QuizError, SubmissionMetadata, SubmissionStatus};

fn sample_answers() -> AnswerStore {
    let catalog = builtin_catalog();
    let mut answers = AnswerStore::new();
    answers
        .set(catalog.at(2), AnswerValue::one("wavy"))
        .expect("texture");
    answers
}

#[tokio::test]
async fn unreachable_backend_degrades_to_a_local_id() {
    let harness = Harness::new(Arc::new(FakeApi::with(SubmitBehavior::Reject(503))));
    let result = harness
        .runtime
        .sync()
        .submit(&sample_answers(), &SubmissionMetadata::new("session_1"))
        .await
        .expect("fallback never fails");

    assert_eq!(result.status, SubmissionStatus::LocalFallback);
    assert_eq!(result.correlation_id, format!("local_{}", epoch_millis(START)));
    assert!(result.warning.as_deref().is_some_and(|w| w.contains("503")));

    let backup: serde_json::Map<String, Value> = harness
        .store
        .get_json(ANSWERS_BACKUP_KEY)
        .expect("read")
        .expect("payload kept");
    assert_eq!(backup["hair-texture"], "wavy");
    assert_eq!(backup["sessionId"], "session_1");
    assert_eq!(
        harness.runtime.sync().correlation_id(),
        Some(result.correlation_id)
    );
}

#[tokio::test]
async fn fail_policy_surfaces_the_transport_error() {
    let runtime = Harness::new(Arc::new(FakeApi::with(SubmitBehavior::Reject(500))))
        .runtime
        .with_fallback_policy(FallbackPolicy::Fail);
    let err = runtime
        .sync()
        .submit(&sample_answers(), &SubmissionMetadata::new("session_1"))
        .await
        .expect_err("policy is fail");
    assert!(matches!(err, QuizError::Transport(_)));
    assert_eq!(runtime.sync().correlation_id(), None);
}

#[tokio::test]
async fn server_id_replaces_a_previous_local_id() {
    let harness = Harness::new(Arc::new(FakeApi::with(SubmitBehavior::Reject(502))));
    let sync = harness.runtime.sync();
    let metadata = SubmissionMetadata::new("session_1");

    let local = sync.submit(&sample_answers(), &metadata).await.expect("fallback");
    assert!(local.correlation_id.starts_with("local_"));

    harness
        .api
        .set_submit(SubmitBehavior::Accept("quiz_777".to_string()));
    let remote = sync.submit(&sample_answers(), &metadata).await.expect("remote");
    assert_eq!(remote.status, SubmissionStatus::Remote);
    assert_eq!(
        harness.store.get(QUIZ_ID_KEY).expect("read").as_deref(),
        Some("quiz_777")
    );
    assert!(!harness.store.contains_key(ANSWERS_BACKUP_KEY));
}

#[tokio::test]
async fn concurrent_submission_is_rejected() {
    let harness = Harness::new(Arc::new(FakeApi::with(SubmitBehavior::WaitForRelease(
        "quiz_1".to_string(),
    ))));
    let sync = harness.runtime.sync().clone();
    let answers = sample_answers();
    let metadata = SubmissionMetadata::new("session_1");

    let first = sync.submit(&answers, &metadata);
    let second = async {
        let result = sync.submit(&answers, &metadata).await;
        assert!(sync.is_in_flight());
        harness.api.release();
        result
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.expect("first completes").correlation_id, "quiz_1");
    assert!(matches!(second, Err(QuizError::SubmissionInFlight)));
    assert!(!sync.is_in_flight());
    assert_eq!(harness.api.submission_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_backend_times_out_into_the_fallback() {
    let harness = Harness::new(Arc::new(FakeApi::with(SubmitBehavior::Hang)));
    let result = harness
        .runtime
        .sync()
        .submit(&sample_answers(), &SubmissionMetadata::new("session_1"))
        .await
        .expect("fallback");
    assert_eq!(result.status, SubmissionStatus::LocalFallback);
    assert!(result.warning.as_deref().is_some_and(|w| w.contains("timed out")));
    assert!(!harness.runtime.sync().is_in_flight());
}

#[tokio::test]
async fn finishing_offline_still_yields_results_and_an_id() {
    let harness = Harness::new(Arc::new(FakeApi::with(SubmitBehavior::Reject(503))));
    let mut session = harness.session();
    answer_first(&mut session, 10);

    let outcome = session.finish().await.expect("finish offline");
    assert_eq!(outcome.submission.status, SubmissionStatus::LocalFallback);
    assert!(outcome.submission.correlation_id.starts_with("local_"));
    assert!(session.stored_results().is_some());
    assert!(harness.store.contains_key(ANSWERS_BACKUP_KEY));
}

#[test]
fn clear_forgets_all_quiz_keys() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    for key in [
        "strandly_quiz_progress",
        "strandly_quiz_results",
        "strandly_quiz_id",
        "strandly_quiz_answers",
    ] {
        harness.store.set(key, "{}").expect("seed");
    }
    harness.store.set("unrelated", "keep").expect("seed");

    harness.runtime.sync().clear();
    assert_eq!(harness.store.len(), 1);
    assert!(harness.store.contains_key("unrelated"));
}
