mod common;

use std::sync::{Arc, Mutex};

use time::Duration;

use common::{FakeApi, Harness, answer_first};
use strandly_quiz::quiz_spec::{AnswerValue, DamageLevel, Porosity, RenderPayload, RenderStatus};
use strandly_quiz::quiz_store::{JsonStoreExt, KeyValueStore};
use strandly_quiz::snapshot::{PROGRESS_KEY, QUIZ_ID_KEY, RESULTS_KEY};
use strandly_quiz::{
    ProgressSnapshot, QuizError, QuizState, SubmissionStatus, Transition,
};

#[test]
fn unanswered_last_question_blocks_completion() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();

    answer_first(&mut session, 9);
    assert_eq!(session.state(), QuizState::InProgress { index: 9 });

    let err = session.advance().expect_err("email missing");
    assert!(matches!(err, QuizError::Validation(_)));
    assert_eq!(session.state(), QuizState::InProgress { index: 9 });
    assert_eq!(
        session.last_error().and_then(|e| e.question_id.as_deref()),
        Some("email")
    );
}

#[test]
fn invalid_email_blocks_and_valid_email_completes() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();
    answer_first(&mut session, 9);

    session.set_text("email", "sam@").expect("free text is accepted");
    let err = session.advance().expect_err("bad email");
    match err {
        QuizError::Validation(error) => assert_eq!(error.code(), Some("invalid_email")),
        other => panic!("unexpected error {other:?}"),
    }

    session.set_text("email", "sam@example.com").expect("set");
    assert!(session.last_error().is_none());
    assert_eq!(session.advance().expect("advance"), Transition::Completed);
    assert_eq!(session.state(), QuizState::Completed);
    assert!(session.current_question().is_none());
}

#[test]
fn retreat_never_validates_and_stops_at_the_start() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();

    assert!(matches!(session.retreat(), Err(QuizError::AtStart)));
    assert_eq!(session.state(), QuizState::InProgress { index: 0 });

    answer_first(&mut session, 3);
    session.retreat().expect("retreat");
    session.retreat().expect("retreat");
    assert_eq!(session.state(), QuizState::InProgress { index: 1 });
    assert_eq!(session.answers().text("hair-texture"), Some("curly"));
}

#[test]
fn retreat_from_completed_returns_to_the_last_question() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();
    answer_first(&mut session, 10);
    assert_eq!(session.state(), QuizState::Completed);

    assert!(matches!(
        session.set_text("email", "other@example.com"),
        Err(QuizError::AlreadyCompleted)
    ));
    session.retreat().expect("retreat");
    assert_eq!(session.state(), QuizState::InProgress { index: 9 });
}

#[test]
fn every_mutation_persists_a_full_snapshot() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();

    session
        .set_answer("hair-concern", AnswerValue::one("oiliness"))
        .expect("set");
    let stored: ProgressSnapshot = harness
        .store
        .get_json(PROGRESS_KEY)
        .expect("read")
        .expect("snapshot written");
    assert_eq!(stored.current_question_index, 0);
    assert_eq!(
        stored.answers.get("hair-concern"),
        Some(&AnswerValue::one("oiliness"))
    );
    assert_eq!(stored.session_id.as_deref(), Some(session.session_id()));

    session.advance().expect("advance");
    let stored: ProgressSnapshot = harness
        .store
        .get_json(PROGRESS_KEY)
        .expect("read")
        .expect("snapshot written");
    assert_eq!(stored.current_question_index, 1);
}

#[test]
fn restored_session_matches_the_persisted_one() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();
    answer_first(&mut session, 6);
    session
        .toggle_choice("chemical-treatments", "bleach")
        .expect("toggle");
    session
        .toggle_choice("chemical-treatments", "color")
        .expect("toggle");

    harness.clock.advance(Duration::hours(23));
    let restored = harness.session();
    assert_eq!(restored.state(), QuizState::InProgress { index: 6 });
    assert_eq!(restored.answers(), session.answers());
    assert_eq!(restored.session_id(), session.session_id());
}

#[test]
fn expired_progress_is_not_restored() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();
    answer_first(&mut session, 4);

    harness.clock.advance(Duration::hours(25));
    let fresh = harness.session();
    assert_eq!(fresh.state(), QuizState::InProgress { index: 0 });
    assert!(fresh.answers().is_empty());
    assert_ne!(fresh.session_id(), session.session_id());
    assert_eq!(harness.store.get(PROGRESS_KEY).expect("read"), None);
}

#[test]
fn corrupt_progress_starts_a_fresh_session() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    harness
        .store
        .set(PROGRESS_KEY, "{\"currentQuestionIndex\":")
        .expect("seed");

    let session = harness.session();
    assert_eq!(session.state(), QuizState::InProgress { index: 0 });
    assert!(!harness.store.contains_key(PROGRESS_KEY));
}

#[test]
fn progress_stamped_in_the_future_is_not_restored() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    harness
        .store
        .set_json(
            PROGRESS_KEY,
            &serde_json::json!({
                "currentQuestionIndex": 3,
                "answers": { "hair-texture": "wavy" },
                "timestamp": strandly_quiz::quiz_store::epoch_millis(common::START + Duration::days(30)),
            }),
        )
        .expect("seed");

    let session = harness.session();
    assert_eq!(session.state(), QuizState::InProgress { index: 0 });
    assert!(session.answers().is_empty());
    assert!(!harness.store.contains_key(PROGRESS_KEY));
}

#[test]
fn restored_index_is_clamped_into_the_catalog() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    harness
        .store
        .set_json(
            PROGRESS_KEY,
            &serde_json::json!({
                "currentQuestionIndex": 40,
                "answers": { "hair-texture": "wavy", "hair-concern": "frizz" },
                "timestamp": strandly_quiz::quiz_store::epoch_millis(common::START),
            }),
        )
        .expect("seed");

    let session = harness.session();
    assert_eq!(session.state(), QuizState::InProgress { index: 9 });
    assert_eq!(session.answers().len(), 1);
    assert_eq!(session.answers().text("hair-texture"), Some("wavy"));
}

#[test]
fn listeners_receive_payloads_after_changes_and_rejections() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();
    let seen: Arc<Mutex<Vec<RenderPayload>>> = Arc::default();
    let sink = seen.clone();
    let id = session.subscribe(Arc::new(move |payload: &RenderPayload| {
        sink.lock().unwrap().push(payload.clone());
    }));

    let _ = session.advance();
    session
        .set_answer("hair-concern", AnswerValue::one("damage"))
        .expect("set");
    session.advance().expect("advance");

    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen[0].error.is_some());
        assert_eq!(seen[1].status, RenderStatus::Ready);
        assert!(seen[1].error.is_none());
        assert_eq!(seen[2].index, 1);
    }

    assert!(session.unsubscribe(id));
    session.retreat().expect("retreat");
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[test]
fn unknown_question_is_rejected() {
    let harness = Harness::new(FakeApi::accepting("quiz_1"));
    let mut session = harness.session();
    assert!(matches!(
        session.set_text("favourite-color", "blue"),
        Err(QuizError::UnknownQuestion(_))
    ));
}

#[tokio::test]
async fn finish_classifies_submits_and_clears_progress() {
    let harness = Harness::new(FakeApi::accepting("quiz_42"));
    let mut session = harness.session();
    answer_first(&mut session, 10);

    let outcome = session.finish().await.expect("finish");
    assert_eq!(outcome.submission.status, SubmissionStatus::Remote);
    assert_eq!(outcome.submission.correlation_id, "quiz_42");
    assert_eq!(outcome.profile.hair_type.code, "3");
    assert_eq!(outcome.profile.porosity, Porosity::High);
    assert_eq!(outcome.profile.damage_level, DamageLevel::Severe);
    assert_eq!(outcome.profile.created_at, common::START);

    assert_eq!(harness.store.get(PROGRESS_KEY).expect("read"), None);
    assert_eq!(
        harness.store.get(QUIZ_ID_KEY).expect("read").as_deref(),
        Some("quiz_42")
    );
    assert_eq!(session.stored_results(), Some(outcome.profile.clone()));

    let payload = harness.api.last_submission().expect("submitted");
    assert_eq!(payload["hair-texture"], "curly");
    assert_eq!(payload["chemical-treatments"], serde_json::json!(["color"]));
    assert_eq!(payload["sessionId"], session.session_id());
    assert_eq!(payload["submittedAt"], "2026-03-01T09:00:00Z");
}

#[tokio::test]
async fn advance_and_finish_submits_on_the_completing_step() {
    let harness = Harness::new(FakeApi::accepting("quiz_42"));
    let mut session = harness.session();
    answer_first(&mut session, 8);

    session
        .toggle_choice("lifestyle-factors", "swimming")
        .expect("toggle");
    assert_eq!(session.advance_and_finish().await.expect("advance"), None);
    assert_eq!(harness.api.submission_count(), 0);

    session.set_text("email", "sam@example.com").expect("set");
    let outcome = session
        .advance_and_finish()
        .await
        .expect("finish")
        .expect("completed on this step");
    assert_eq!(outcome.submission.correlation_id, "quiz_42");
    assert_eq!(session.state(), QuizState::Completed);
    assert_eq!(harness.api.submission_count(), 1);
    assert_eq!(harness.store.get(PROGRESS_KEY).expect("read"), None);
}

#[tokio::test]
async fn finish_requires_completion() {
    let harness = Harness::new(FakeApi::accepting("quiz_42"));
    let mut session = harness.session();
    assert!(matches!(session.finish().await, Err(QuizError::NotCompleted)));
    assert_eq!(harness.api.submission_count(), 0);
}

#[tokio::test]
async fn results_expire_after_a_week() {
    let harness = Harness::new(FakeApi::accepting("quiz_42"));
    let mut session = harness.session();
    answer_first(&mut session, 10);
    session.finish().await.expect("finish");

    harness.clock.advance(Duration::days(6));
    assert!(session.stored_results().is_some());
    harness.clock.advance(Duration::days(2));
    assert!(session.stored_results().is_none());
    assert!(!harness.store.contains_key(RESULTS_KEY));
}

#[tokio::test]
async fn restart_clears_everything() {
    let harness = Harness::new(FakeApi::accepting("quiz_42"));
    let mut session = harness.session();
    answer_first(&mut session, 10);
    session.finish().await.expect("finish");
    let old_session = session.session_id().to_string();

    session.restart().expect("restart");
    assert_eq!(session.state(), QuizState::InProgress { index: 0 });
    assert!(session.answers().is_empty());
    assert!(session.outcome().is_none());
    assert_ne!(session.session_id(), old_session);
    assert!(!harness.store.contains_key(QUIZ_ID_KEY));
    assert!(!harness.store.contains_key(RESULTS_KEY));
    assert!(harness.store.contains_key(PROGRESS_KEY));
}
