#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::macros::datetime;
use tokio::sync::Notify;

use strandly_quiz::quiz_spec::CatalogSpec;
use strandly_quiz::quiz_store::{KeyValueStore, MemoryStore};
use strandly_quiz::{
    CheckoutSession, FixedClock, PaymentIntent, PaymentVerification, QuizApi, QuizConfig,
    QuizRuntime, QuizSession, SubmitResponse, TransportError,
};

pub const START: OffsetDateTime = datetime!(2026-03-01 09:00 UTC);

#[derive(Debug, Clone)]
pub enum SubmitBehavior {
    Accept(String),
    Reject(u16),
    Hang,
    WaitForRelease(String),
}

/// In-process backend with scripted responses.
pub struct FakeApi {
    pub submit: Mutex<SubmitBehavior>,
    pub submissions: Mutex<Vec<Map<String, Value>>>,
    pub catalog: Mutex<Option<CatalogSpec>>,
    pub intent_fails: AtomicBool,
    pub hold_intents: AtomicBool,
    pub intent_calls: AtomicUsize,
    pub checkout_calls: AtomicUsize,
    pub verify_status: Mutex<String>,
    release: Notify,
    intent_release: Notify,
}

impl FakeApi {
    pub fn accepting(quiz_id: &str) -> Arc<Self> {
        Arc::new(Self::with(SubmitBehavior::Accept(quiz_id.to_string())))
    }

    pub fn with(behavior: SubmitBehavior) -> Self {
        Self {
            submit: Mutex::new(behavior),
            submissions: Mutex::new(Vec::new()),
            catalog: Mutex::new(None),
            intent_fails: AtomicBool::new(false),
            hold_intents: AtomicBool::new(false),
            intent_calls: AtomicUsize::new(0),
            checkout_calls: AtomicUsize::new(0),
            verify_status: Mutex::new("completed".to_string()),
            release: Notify::new(),
            intent_release: Notify::new(),
        }
    }

    pub fn set_submit(&self, behavior: SubmitBehavior) {
        *self.submit.lock().unwrap() = behavior;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }

    pub fn release_intent(&self) {
        self.intent_release.notify_one();
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }

    pub fn last_submission(&self) -> Option<Map<String, Value>> {
        self.submissions.lock().unwrap().last().cloned()
    }
}

fn unreachable_backend(endpoint: &str) -> TransportError {
    TransportError::Status {
        endpoint: endpoint.to_string(),
        status: 503,
        body: "service unavailable".to_string(),
    }
}

#[async_trait]
impl QuizApi for FakeApi {
    async fn fetch_catalog(&self) -> Result<CatalogSpec, TransportError> {
        self.catalog
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| unreachable_backend("/api/quiz/questions"))
    }

    async fn submit_quiz(&self, payload: &Map<String, Value>) -> Result<SubmitResponse, TransportError> {
        self.submissions.lock().unwrap().push(payload.clone());
        let behavior = self.submit.lock().unwrap().clone();
        match behavior {
            SubmitBehavior::Accept(quiz_id) => Ok(SubmitResponse { quiz_id }),
            SubmitBehavior::Reject(status) => Err(TransportError::Status {
                endpoint: "/api/quiz/submit".to_string(),
                status,
                body: "nope".to_string(),
            }),
            SubmitBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(unreachable_backend("/api/quiz/submit"))
            }
            SubmitBehavior::WaitForRelease(quiz_id) => {
                self.release.notified().await;
                Ok(SubmitResponse { quiz_id })
            }
        }
    }

    async fn create_checkout(&self, quiz_id: &str) -> Result<CheckoutSession, TransportError> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            session_id: format!("cs_{quiz_id}"),
            url: format!("https://checkout.example.test/{quiz_id}"),
            mock: true,
        })
    }

    async fn create_payment_intent(
        &self,
        quiz_id: &str,
        _amount_cents: u32,
        _currency: &str,
    ) -> Result<PaymentIntent, TransportError> {
        self.intent_calls.fetch_add(1, Ordering::SeqCst);
        if self.hold_intents.load(Ordering::SeqCst) {
            self.intent_release.notified().await;
        }
        if self.intent_fails.load(Ordering::SeqCst) {
            return Err(unreachable_backend("/api/payment/create-intent"));
        }
        Ok(PaymentIntent {
            client_secret: format!("pi_{quiz_id}_secret"),
        })
    }

    async fn verify_payment(
        &self,
        _session_id: &str,
        _quiz_id: &str,
    ) -> Result<PaymentVerification, TransportError> {
        Ok(PaymentVerification {
            success: true,
            status: Some(self.verify_status.lock().unwrap().clone()),
        })
    }

    async fn health(&self) -> Result<Value, TransportError> {
        Ok(json!({ "status": "ok" }))
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub runtime: QuizRuntime,
}

impl Harness {
    pub fn new(api: Arc<FakeApi>) -> Self {
        Self::with_store(api, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(api: Arc<FakeApi>, store: Arc<MemoryStore>) -> Self {
        let clock = Arc::new(FixedClock::new(START));
        let runtime = QuizRuntime::new(
            QuizConfig::default(),
            api.clone(),
            store.clone() as Arc<dyn KeyValueStore>,
            clock.clone(),
        );
        Self {
            api,
            store,
            clock,
            runtime,
        }
    }

    pub fn session(&self) -> QuizSession {
        self.runtime
            .session_with(strandly_quiz::quiz_spec::builtin_catalog())
    }
}

/// Answers and advances through questions `0..count` of the built-in catalog.
pub fn answer_first(session: &mut QuizSession, count: usize) {
    let answers: [(&str, Value); 10] = [
        ("hair-concern", json!("damage")),
        ("wash-frequency", json!("weekly")),
        ("hair-texture", json!("curly")),
        ("hair-thickness", json!("medium")),
        ("hair-porosity", json!("sinks quickly")),
        ("scalp-feel", json!("balanced")),
        ("chemical-treatments", json!(["color"])),
        ("heat-styling", json!("daily")),
        ("lifestyle-factors", json!(["stress"])),
        ("email", json!("sam@example.com")),
    ];
    for (id, value) in answers.into_iter().take(count) {
        let value = serde_json::from_value(value).expect("answer value");
        session.set_answer(id, value).expect("valid answer");
        session.advance().expect("advance");
    }
}
