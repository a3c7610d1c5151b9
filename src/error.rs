use std::time::Duration;

/// Which side of a composed cancellation signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortCause {
    /// The caller cancelled the operation.
    Caller,
    /// The internal deadline elapsed first.
    Timeout { timeout: Duration },
}

impl std::fmt::Display for AbortCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortCause::Caller => write!(f, "cancelled by caller"),
            AbortCause::Timeout { timeout } => {
                write!(f, "timed out after {}ms", timeout.as_millis())
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeasibilityError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Request aborted: {0}")]
    Aborted(AbortCause),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Endpoint not enabled: {0}")]
    Unsupported(&'static str),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FeasibilityError {
    /// True when the failure looks like an authorization rejection: a 401/403
    /// status, or a server message mentioning one of them or an ownership
    /// restriction.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            FeasibilityError::Http { status, message } => {
                matches!(status, 401 | 403) || message_indicates_auth(message)
            }
            FeasibilityError::Network(message) => message_indicates_auth(message),
            _ => false,
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, FeasibilityError::Aborted(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, FeasibilityError::Aborted(AbortCause::Timeout { .. }))
    }

    pub fn is_server_error(&self) -> bool {
        matches!(self, FeasibilityError::Http { status, .. } if *status >= 500)
    }
}

fn message_indicates_auth(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["401", "403", "restricted", "owner"]
        .iter()
        .any(|needle| lower.contains(needle))
}

pub type Result<T> = std::result::Result<T, FeasibilityError>;
