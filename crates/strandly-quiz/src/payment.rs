use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tracing::{info, warn};

use crate::config::{CheckoutPolicy, PaymentConfig};
use crate::error::PaymentError;
use crate::snapshot::SnapshotStore;
use crate::sync::InFlightGuard;
use crate::transport::{PaymentVerification, QuizApi};

/// What the payment UI should do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStart {
    /// Confirm an embedded card payment with this secret.
    Intent { client_secret: String },
    /// Redirect to a hosted checkout page.
    Session {
        session_id: String,
        url: String,
        mock: bool,
    },
}

/// Hands the quiz correlation id to the payment backend.
#[derive(Clone)]
pub struct PaymentFlow {
    api: Arc<dyn QuizApi>,
    snapshots: SnapshotStore,
    config: PaymentConfig,
    in_flight: Arc<AtomicBool>,
}

impl PaymentFlow {
    pub fn new(api: Arc<dyn QuizApi>, snapshots: SnapshotStore, config: PaymentConfig) -> Self {
        Self {
            api,
            snapshots,
            config,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &PaymentConfig {
        &self.config
    }

    /// Starts a payment for `quiz_id`, or for the stored correlation id when `None`.
    pub async fn start(&self, quiz_id: Option<&str>) -> Result<CheckoutStart, PaymentError> {
        let _guard = InFlightGuard::acquire(&self.in_flight).ok_or(PaymentError::InFlight)?;
        let quiz_id = self.resolve_quiz_id(quiz_id)?;

        if self.config.checkout_policy == CheckoutPolicy::IntentThenCheckout {
            match self
                .api
                .create_payment_intent(&quiz_id, self.config.amount_cents, &self.config.currency)
                .await
            {
                Ok(intent) => {
                    info!(quiz_id = %quiz_id, "payment intent created");
                    return Ok(CheckoutStart::Intent {
                        client_secret: intent.client_secret,
                    });
                }
                Err(err) => {
                    warn!(quiz_id = %quiz_id, error = %err, "payment intent failed, trying checkout session");
                }
            }
        }

        let session = self.api.create_checkout(&quiz_id).await?;
        info!(
            quiz_id = %quiz_id,
            session_id = %session.session_id,
            mock = session.mock,
            "checkout session created"
        );
        Ok(CheckoutStart::Session {
            session_id: session.session_id,
            url: session.url,
            mock: session.mock,
        })
    }

    /// Confirms a payment. A completed payment ends the quiz lifecycle.
    pub async fn verify(
        &self,
        session_id: &str,
        quiz_id: Option<&str>,
    ) -> Result<PaymentVerification, PaymentError> {
        let quiz_id = self.resolve_quiz_id(quiz_id)?;
        let verification = self.api.verify_payment(session_id, &quiz_id).await?;

        if verification.is_completed() {
            info!(quiz_id = %quiz_id, session_id, "payment verified");
            self.snapshots.clear_quiz_id();
            self.snapshots.clear_progress();
        } else {
            warn!(
                quiz_id = %quiz_id,
                session_id,
                status = verification.status.as_deref().unwrap_or("unknown"),
                "payment not completed"
            );
        }
        Ok(verification)
    }

    fn resolve_quiz_id(&self, quiz_id: Option<&str>) -> Result<String, PaymentError> {
        quiz_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .or_else(|| self.snapshots.quiz_id())
            .ok_or(PaymentError::MissingQuizId)
    }
}
