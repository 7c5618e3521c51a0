use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why an org lookup or repository listing failed.
///
/// None of these aborts a batch. A failed lookup classifies the owner as an
/// individual; a failed listing becomes that owner's failure reason.
#[derive(Debug, Error)]
pub enum HostError {
    /// The host answered with an error we do not classify further.
    #[error("host request failed: {message}")]
    Api { message: String },

    /// The request quota is spent until `reset_at`.
    #[error("request quota exhausted until {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    /// The configured token was missing or rejected.
    #[error("token rejected by host")]
    AuthRequired,

    /// No such account, organization, or repository.
    #[error("{resource} does not exist on host")]
    NotFound { resource: String },
}

impl HostError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }
}

/// First line of an error's message.
///
/// Owner failure reasons in the tally and in progress events are kept to
/// one line.
pub fn short_error_message(e: &impl std::error::Error) -> String {
    let full = e.to_string();
    full.lines().next().unwrap_or(&full).to_string()
}

pub type Result<T> = std::result::Result<T, HostError>;
