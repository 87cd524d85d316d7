//! Error types shared across the client.

use thiserror::Error;

/// Configuration validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Failures crossing the case API boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to initialize the HTTP client: {source}")]
    Init {
        #[source]
        source: reqwest::Error,
    },

    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}: {detail}")]
    Status {
        endpoint: String,
        status: u16,
        detail: String,
    },

    #[error("failed to decode the response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("case {case_id} not found")]
    CaseNotFound { case_id: i64 },

    #[error("upload of '{filename}' exceeds the configured limit ({size} > {limit} bytes)")]
    UploadTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },
}

/// Rejections raised at the chat input boundary, before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("question must not be empty")]
    EmptyQuestion,

    #[error("a question is already awaiting its answer")]
    QuestionPending,
}

/// Failures raised by workspace session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no case is open in this workspace")]
    NoActiveCase,

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
