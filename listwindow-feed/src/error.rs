use thiserror::Error;

const NETWORK_MESSAGE: &str = "Network error or CORS issue. Please try again later.";
const RATE_LIMIT_MESSAGE: &str = "GitHub rate limit exceeded. Please try again later.";

/// Why a page request failed, classified by the data-source layer.
///
/// The feed never inspects the kind; it only surfaces the error and refuses to advance its page
/// state. The `Display` text is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Transport or CORS failure; no HTTP status was received.
    #[error("{message}")]
    Network { message: String },

    #[error("{message}")]
    NotFound { message: String },

    #[error("{message}")]
    RateLimited { message: String },

    #[error("{message}")]
    ValidationFailed { message: String },

    /// Any other non-success status.
    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{message}")]
    Unknown { message: String },
}

impl FetchError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: non_empty_or(message.into(), NETWORK_MESSAGE),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: non_empty_or(message.into(), "Request failed"),
        }
    }

    /// Classifies a failed response by status code and upstream message.
    ///
    /// - `0` is a network failure.
    /// - `403` is a rate limit only when the message mentions "rate limit"; otherwise it is an
    ///   ordinary upstream error.
    /// - `404` and `422` map to their own kinds.
    /// - A success status is not a classifiable failure and becomes `Unknown`.
    ///
    /// Empty upstream messages are replaced by a default for the kind.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            0 => Self::network(message),
            403 if message.to_ascii_lowercase().contains("rate limit") => Self::RateLimited {
                message: RATE_LIMIT_MESSAGE.to_owned(),
            },
            404 => Self::NotFound {
                message: non_empty_or(message, "Resource not found"),
            },
            422 => Self::ValidationFailed {
                message: non_empty_or(message, "Validation failed"),
            },
            200..=299 => Self::unknown(message),
            _ => {
                let fallback = format!("GitHub API error: {status}");
                Self::Upstream {
                    status,
                    message: non_empty_or(message, &fallback),
                }
            }
        }
    }

    /// Classifies a failed response from its status and raw body.
    ///
    /// The upstream message is read from a JSON `{"message": "..."}` body when present; any other
    /// body is ignored.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_owned))
            .unwrap_or_default();
        Self::from_status(status, message)
    }

    /// HTTP-status-like code: `0` for network failures, `500` for unclassified ones.
    pub fn status(&self) -> u16 {
        match self {
            Self::Network { .. } => 0,
            Self::NotFound { .. } => 404,
            Self::RateLimited { .. } => 403,
            Self::ValidationFailed { .. } => 422,
            Self::Upstream { status, .. } => *status,
            Self::Unknown { .. } => 500,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Network { message }
            | Self::NotFound { message }
            | Self::RateLimited { message }
            | Self::ValidationFailed { message }
            | Self::Upstream { message, .. }
            | Self::Unknown { message } => message,
        }
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_owned()
    } else {
        message
    }
}

/// Errors from persisting search history.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to encode history: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}
