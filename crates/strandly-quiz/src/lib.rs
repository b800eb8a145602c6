#![allow(missing_docs)]

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod listener;
pub mod logging;
pub mod payment;
pub mod runtime;
pub mod session;
pub mod snapshot;
pub mod sync;
pub mod transport;

pub use catalog::{CatalogLoader, CatalogSource};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CheckoutPolicy, ConfigError, PaymentConfig, QuizConfig};
pub use error::{PaymentError, QuizError, TransportError};
pub use listener::{ListenerId, QuizListener};
pub use payment::{CheckoutStart, PaymentFlow};
pub use runtime::QuizRuntime;
pub use session::{QuizOutcome, QuizSession, QuizState, Transition};
pub use snapshot::{ProgressSnapshot, SnapshotStore};
pub use sync::{
    FallbackPolicy, SubmissionMetadata, SubmissionResult, SubmissionStatus, SyncClient,
    build_payload, new_session_id,
};
pub use transport::{
    CheckoutSession, HttpQuizApi, HttpSetupError, PaymentIntent, PaymentVerification, QuizApi,
    SubmitResponse,
};

pub use quiz_spec;
pub use quiz_store;
