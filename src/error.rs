//! Error types for thumbnail generation and region editing.

use std::fmt;
use std::time::Duration;

/// Maximum length of a service error body kept in an error message.
#[cfg(feature = "gemini")]
const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Which boundary call a wrapped failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    /// Initial thumbnail generation from a source photo.
    Generate,
    /// Region edit of an existing thumbnail.
    Edit,
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate => write!(f, "Failed to generate thumbnail"),
            Self::Edit => write!(f, "Failed to edit thumbnail"),
        }
    }
}

/// Errors that can occur while generating or editing thumbnails.
#[derive(Debug, thiserror::Error)]
pub enum ThumbError {
    /// Source image could not be loaded or decoded.
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    /// The service responded without any usable image payload.
    #[error("no image data found in the response")]
    NoImageInResponse,

    /// A boundary failure, prefixed with the action that triggered it.
    #[error("{action}: {source}")]
    ServiceRequest {
        action: ServiceAction,
        source: Box<ThumbError>,
    },

    /// API key missing or invalid.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    /// Content was blocked by safety filters.
    #[error("content blocked: {0}")]
    ContentBlocked(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The service answered with a shape we do not understand.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// An edit submission was refused before anything was sent.
    #[error("edit not submitted: {0}")]
    SubmitRejected(&'static str),

    /// The workflow is not in a phase that allows the requested action.
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        action: &'static str,
        phase: &'static str,
    },

    /// Network or HTTP error.
    #[cfg(feature = "gemini")]
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to decode base64 data.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ThumbError {
    /// Wraps a boundary failure with the action prefix shown to users.
    ///
    /// Decode failures of the caller's own image are not service failures
    /// and pass through untouched, as do errors that are already wrapped.
    pub fn for_action(self, action: ServiceAction) -> Self {
        match self {
            Self::ImageDecode(_) | Self::ServiceRequest { .. } => self,
            other => Self::ServiceRequest {
                action,
                source: Box::new(other),
            },
        }
    }

    /// Returns the innermost error, looking through action wrappers.
    pub fn root(&self) -> &ThumbError {
        match self {
            Self::ServiceRequest { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns true if this error is likely transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self.root() {
            Self::RateLimited { .. } => true,
            #[cfg(feature = "gemini")]
            Self::Network(_) => true,
            _ => false,
        }
    }

    /// Returns the suggested retry delay, if available.
    pub fn retry_after(&self) -> Option<Duration> {
        match self.root() {
            Self::RateLimited { retry_after } => *retry_after,
            #[cfg(feature = "gemini")]
            Self::Network(_) => Some(Duration::from_secs(2)),
            _ => None,
        }
    }
}

/// Result type alias for thumbnail operations.
pub type Result<T> = std::result::Result<T, ThumbError>;

/// Reads a `Retry-After` header expressed in whole seconds.
#[cfg(feature = "gemini")]
pub(crate) fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Reduces a raw error body to something fit for a user-facing message.
///
/// Google-style JSON errors (`{"error": {"message": ...}}`) are unwrapped to
/// their message; anything else is whitespace-collapsed and truncated.
#[cfg(feature = "gemini")]
pub(crate) fn sanitize_error_message(text: &str) -> String {
    let extracted = serde_json::from_str::<serde_json::Value>(text)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        });
    let text = extracted.unwrap_or_else(|| text.to_string());

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_ERROR_MESSAGE_LEN {
        return collapsed;
    }
    let mut truncated: String = collapsed.chars().take(MAX_ERROR_MESSAGE_LEN).collect();
    truncated.push_str("...");
    truncated
}
