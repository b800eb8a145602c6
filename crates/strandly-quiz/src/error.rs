use quiz_spec::ValidationError;
use thiserror::Error;

/// Failures talking to the quiz backend.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },
    #[error("request to {endpoint} timed out after {seconds}s")]
    Timeout { endpoint: String, seconds: u64 },
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("already at the first question")]
    AtStart,
    #[error("quiz is already completed")]
    AlreadyCompleted,
    #[error("quiz is not completed yet")]
    NotCompleted,
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("submission failed: {0}")]
    Transport(#[from] TransportError),
    #[error("failed to format submission time: {0}")]
    Timestamp(#[from] time::error::Format),
}

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("no quiz id available for payment")]
    MissingQuizId,
    #[error("a payment request is already in flight")]
    InFlight,
    #[error("payment request failed: {0}")]
    Transport(#[from] TransportError),
}
