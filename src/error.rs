use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};

/// Result type for provider construction.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a [`Provider`](crate::Provider).
///
/// Errors happening during flag resolution are never returned as `Error`; they are reported
/// through [`ResolutionResult`](crate::ResolutionResult) instead.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Endpoint is not a valid URL.
    #[error("invalid endpoint configuration")]
    InvalidEndpoint(#[source] url::ParseError),

    /// Endpoint is a valid URL that cannot carry a path, like `mailto:` or `data:` URLs.
    #[error("endpoint cannot be used as a base URL")]
    EndpointCannotBeABase,

    /// API key contains characters that are not allowed in an HTTP header.
    #[error("invalid api_key configuration")]
    InvalidApiKey,

    /// The default HTTP transport could not be initialized.
    #[error(transparent)]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Network(Arc::new(value.without_url()))
    }
}

/// Closed set of error kinds reported to the calling evaluation framework.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The flag does not exist on the remote service.
    FlagNotFound,
    /// The resolved value does not have the type requested by the caller.
    TypeMismatch,
    /// The evaluation context has no targeting key. Detected locally.
    TargetingKeyMissing,
    /// The response body could not be decoded. Detected locally.
    ParseError,
    /// Anything else: transport failures, authorization failures, unexpected status codes.
    General,
}

impl ErrorKind {
    /// Wire representation of the error code.
    pub fn as_code(self) -> &'static str {
        match self {
            ErrorKind::FlagNotFound => "FLAG_NOT_FOUND",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::TargetingKeyMissing => "TARGETING_KEY_MISSING",
            ErrorKind::ParseError => "PARSE_ERROR",
            ErrorKind::General => "GENERAL",
        }
    }

    /// Map an error code returned by the remote service to a kind.
    ///
    /// Returns `None` for an empty code. Unrecognized codes map to [`ErrorKind::General`].
    pub fn from_code(code: &str) -> Option<ErrorKind> {
        let kind = match code {
            "" => return None,
            "FLAG_NOT_FOUND" => ErrorKind::FlagNotFound,
            "TYPE_MISMATCH" => ErrorKind::TypeMismatch,
            "TARGETING_KEY_MISSING" => ErrorKind::TargetingKeyMissing,
            "PARSE_ERROR" => ErrorKind::ParseError,
            _ => ErrorKind::General,
        };
        Some(kind)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

/// A classified failure of a single flag resolution.
///
/// The `Display` output is the string surfaced to callers: `error code: {CODE}: {message}`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("error code: {kind}: {message}")]
pub struct ResolutionError {
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// Human-readable description of the failure.
    pub message: String,
}

impl ResolutionError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        ResolutionError {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn targeting_key_missing() -> Self {
        Self::new(
            ErrorKind::TargetingKeyMissing,
            "no targetingKey provided in the evaluation context",
        )
    }

    pub(crate) fn flag_not_found(flag_key: &str) -> Self {
        Self::new(
            ErrorKind::FlagNotFound,
            format!("flag {flag_key} was not found"),
        )
    }

    pub(crate) fn type_mismatch(flag_key: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("unexpected type for flag {flag_key}"),
        )
    }

    pub(crate) fn parse_error(flag_key: &str, body: &[u8]) -> Self {
        Self::new(
            ErrorKind::ParseError,
            format!(
                "impossible to parse response for flag {flag_key}: {}",
                String::from_utf8_lossy(body)
            ),
        )
    }

    pub(crate) fn general(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::General, message)
    }
}
