use std::time::Duration;

use async_trait::async_trait;
use quiz_spec::CatalogSpec;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;
use url::Url;

use crate::config::{ConfigError, QuizConfig};
use crate::error::TransportError;

pub const QUESTIONS_PATH: &str = "/api/quiz/questions";
pub const SUBMIT_PATH: &str = "/api/quiz/submit";
pub const CREATE_CHECKOUT_PATH: &str = "/api/payment/create-checkout";
pub const CREATE_INTENT_PATH: &str = "/api/payment/create-intent";
pub const VERIFY_PATH: &str = "/api/payment/verify";
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub quiz_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSession {
    pub session_id: String,
    pub url: String,
    #[serde(default)]
    pub mock: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentVerification {
    pub success: bool,
    #[serde(default)]
    pub status: Option<String>,
}

impl PaymentVerification {
    pub fn is_completed(&self) -> bool {
        self.success && self.status.as_deref() == Some("completed")
    }
}

/// Backend operations the quiz core depends on.
#[async_trait]
pub trait QuizApi: Send + Sync {
    async fn fetch_catalog(&self) -> Result<CatalogSpec, TransportError>;
    async fn submit_quiz(&self, payload: &Map<String, Value>) -> Result<SubmitResponse, TransportError>;
    async fn create_checkout(&self, quiz_id: &str) -> Result<CheckoutSession, TransportError>;
    async fn create_payment_intent(
        &self,
        quiz_id: &str,
        amount_cents: u32,
        currency: &str,
    ) -> Result<PaymentIntent, TransportError>;
    async fn verify_payment(
        &self,
        session_id: &str,
        quiz_id: &str,
    ) -> Result<PaymentVerification, TransportError>;
    async fn health(&self) -> Result<Value, TransportError>;
}

/// `reqwest` implementation of [`QuizApi`].
#[derive(Debug, Clone)]
pub struct HttpQuizApi {
    base_url: Url,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl HttpQuizApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|source| TransportError::Network {
                endpoint: base_url.to_string(),
                source,
            })?;

        Ok(Self {
            base_url,
            timeout,
            http_client,
        })
    }

    pub fn from_config(config: &QuizConfig) -> Result<Self, HttpSetupError> {
        let base_url = config.api_base_url()?;
        Ok(Self::new(base_url, config.request_timeout())?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        Ok(self.base_url.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.endpoint(path)?;
        debug!(endpoint = %url, "GET");
        let request = self.http_client.get(url.clone());
        self.send(url, request).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, TransportError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        debug!(endpoint = %url, "POST");
        let request = self.http_client.post(url.clone()).json(body);
        self.send(url, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: Url,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TransportError> {
        let endpoint = url.path().to_string();
        let response = request.send().await.map_err(|source| {
            if source.is_timeout() {
                TransportError::Timeout {
                    endpoint: endpoint.clone(),
                    seconds: self.timeout.as_secs(),
                }
            } else {
                TransportError::Network {
                    endpoint: endpoint.clone(),
                    source,
                }
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| TransportError::Network {
                endpoint: endpoint.clone(),
                source,
            })?;

        if !status.is_success() {
            return Err(TransportError::Status {
                endpoint,
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|err| TransportError::Decode {
            endpoint,
            message: err.to_string(),
        })
    }
}

/// Errors building an [`HttpQuizApi`] from configuration.
#[derive(Debug, thiserror::Error)]
pub enum HttpSetupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[async_trait]
impl QuizApi for HttpQuizApi {
    async fn fetch_catalog(&self) -> Result<CatalogSpec, TransportError> {
        self.get_json(QUESTIONS_PATH).await
    }

    async fn submit_quiz(&self, payload: &Map<String, Value>) -> Result<SubmitResponse, TransportError> {
        self.post_json(SUBMIT_PATH, payload).await
    }

    async fn create_checkout(&self, quiz_id: &str) -> Result<CheckoutSession, TransportError> {
        self.post_json(CREATE_CHECKOUT_PATH, &json!({ "quizId": quiz_id }))
            .await
    }

    async fn create_payment_intent(
        &self,
        quiz_id: &str,
        amount_cents: u32,
        currency: &str,
    ) -> Result<PaymentIntent, TransportError> {
        self.post_json(
            CREATE_INTENT_PATH,
            &json!({ "quizId": quiz_id, "amount": amount_cents, "currency": currency }),
        )
        .await
    }

    async fn verify_payment(
        &self,
        session_id: &str,
        quiz_id: &str,
    ) -> Result<PaymentVerification, TransportError> {
        self.post_json(
            VERIFY_PATH,
            &json!({ "sessionId": session_id, "quizId": quiz_id }),
        )
        .await
    }

    async fn health(&self) -> Result<Value, TransportError> {
        self.get_json(HEALTH_PATH).await
    }
}
