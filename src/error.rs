use crate::models::common::ApiResult;
use thiserror::Error;

/// Errors raised while signing a request. No request is sent when one occurs.
#[derive(Error, Debug)]
pub enum SignError {
    #[error("method is required")]
    MissingMethod,

    #[error("path is required")]
    MissingPath,

    #[error("access_id and access_key are required")]
    MissingCredentials,

    #[error("failed to generate nonce: {0}")]
    Nonce(String),

    #[error("failed to decode access_key: {0}")]
    InvalidAccessKey(#[from] base64::DecodeError),

    #[error("failed to compute signature: {0}")]
    Digest(String),

    #[error("invalid value for header {0}")]
    InvalidHeader(String),
}

/// Every way a call to the open API can fail.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("failed to generate auth header: {0}")]
    Signing(#[from] SignError),

    #[error("invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to marshal request body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-200 HTTP status.
    #[error("http error {status} on {path}: {message}")]
    HttpStatus {
        status: u16,
        path: String,
        message: String,
    },

    /// 200 response whose body is not a result envelope.
    #[error("failed to parse response JSON from {path}: {source}")]
    MalformedResponse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// 200 response whose envelope carries a non-200 code.
    #[error("business error {code} on {path}: {message}")]
    Business {
        code: i64,
        path: String,
        message: String,
    },
}

impl SdkError {
    /// True when the upstream service answered and rejected the call.
    pub fn is_business(&self) -> bool {
        matches!(self, SdkError::Business { .. })
    }

    /// True when no usable response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, SdkError::Transport(_))
    }
}

/// A failed call: the populated result envelope together with the error that
/// produced it.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct CallError<T> {
    pub result: ApiResult<T>,
    #[source]
    pub error: SdkError,
}

impl<T> CallError<T> {
    pub fn new(result: ApiResult<T>, error: impl Into<SdkError>) -> Self {
        Self {
            result,
            error: error.into(),
        }
    }

    pub fn into_parts(self) -> (ApiResult<T>, SdkError) {
        (self.result, self.error)
    }
}

pub type CallResult<T> = Result<ApiResult<T>, CallError<T>>;
