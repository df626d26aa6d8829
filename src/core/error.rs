use std::error::Error;
use std::fmt;

use crate::core::models::ProviderKind;

pub const EMPTY_TRANSCRIPT_MESSAGE: &str = "messages array with at least one entry is required";
pub const LAST_MESSAGE_MESSAGE: &str = "Last message must be a non-empty user message";

/// Failures surfaced by the chat router. Degraded-but-successful replies are
/// not errors; see [`crate::core::reply::ChatReply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The submitted transcript was rejected before reaching any provider.
    InvalidInput(String),

    /// The provider selected for the request has no credential configured.
    MissingCredential {
        provider: ProviderKind,
        env_var: &'static str,
    },

    /// The upstream call failed at the transport level or returned a
    /// non-success status.
    Upstream {
        provider: ProviderKind,
        status: Option<u16>,
        details: String,
    },
}

impl RelayError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        RelayError::InvalidInput(message.into())
    }

    pub fn missing_credential(provider: ProviderKind) -> Self {
        RelayError::MissingCredential {
            provider,
            env_var: provider.credential_env_var(),
        }
    }

    pub fn upstream(provider: ProviderKind, status: Option<u16>, details: impl Into<String>) -> Self {
        RelayError::Upstream {
            provider,
            status,
            details: details.into(),
        }
    }

    /// HTTP status code the server answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::InvalidInput(_) => 400,
            RelayError::MissingCredential { .. } | RelayError::Upstream { .. } => 500,
        }
    }

    /// Fixed, user-facing summary. Provider text is kept in [`Self::details`].
    pub fn message(&self) -> String {
        match self {
            RelayError::InvalidInput(message) => message.clone(),
            RelayError::MissingCredential { env_var, .. } => format!("Missing {env_var}"),
            RelayError::Upstream { provider, .. } => {
                format!("Failed to fetch response from {}", provider.display_name())
            }
        }
    }

    pub fn details(&self) -> Option<String> {
        match self {
            RelayError::Upstream {
                status: Some(status),
                details,
                ..
            } => Some(format!("{status}: {details}")),
            RelayError::Upstream {
                status: None,
                details,
                ..
            } => Some(details.clone()),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, RelayError::InvalidInput(_))
    }
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.details() {
            Some(details) => write!(f, "{} ({details})", self.message()),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl Error for RelayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_names_the_variable() {
        let err = RelayError::missing_credential(ProviderKind::Gemini);
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Missing GOOGLE_API_KEY");
        assert!(err.details().is_none());
    }

    #[test]
    fn upstream_error_keeps_status_and_body_in_details() {
        let err = RelayError::upstream(ProviderKind::OpenRouter, Some(429), "rate limited");
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.message(), "Failed to fetch response from OpenRouter");
        assert_eq!(err.details().as_deref(), Some("429: rate limited"));
    }

    #[test]
    fn invalid_input_is_a_client_error() {
        let err = RelayError::invalid_input(LAST_MESSAGE_MESSAGE);
        assert!(err.is_client_error());
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), LAST_MESSAGE_MESSAGE);
    }
}
