//! Error types for LearnLens

use thiserror::Error;

/// Result type alias using LearnLens's Error
pub type Result<T> = std::result::Result<T, Error>;

/// LearnLens error types
///
/// Error kinds are kept distinct internally even though the HTTP boundary
/// collapses them into a single generic message for the client.
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (E001-E099)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Badge '{0}' not found")]
    BadgeNotFound(String),

    #[error("Organization '{0}' not found")]
    OrganizationNotFound(String),

    // Network errors (E100-E199)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("LLM API error: {0}")]
    Llm(String),

    #[error("Rate limited. Retry after {0} seconds.")]
    RateLimited(u64),

    // Database errors (E400-E499)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    Config(String),

    // Generic errors
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the stable error code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "E001",
            Self::BadgeNotFound(_) => "E002",
            Self::OrganizationNotFound(_) => "E003",
            Self::Network(_) => "E100",
            Self::Llm(_) => "E101",
            Self::RateLimited(_) => "E102",
            Self::Database(_) => "E400",
            Self::Config(_) => "E600",
            Self::Other(_) | Self::Io(_) => "E9999",
        }
    }

    /// Whether this error was caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::BadgeNotFound(_) | Self::OrganizationNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_stable() {
        assert_eq!(Error::InvalidInput("x".into()).code(), "E001");
        assert_eq!(Error::Llm("x".into()).code(), "E101");
        assert_eq!(Error::RateLimited(30).code(), "E102");
        assert_eq!(Error::Config("x".into()).code(), "E600");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(Error::InvalidInput("no query".into()).is_client_error());
        assert!(!Error::Llm("boom".into()).is_client_error());
        assert!(!Error::Other("boom".into()).is_client_error());
    }

    #[test]
    fn test_display_messages() {
        let err = Error::InvalidInput("No query provided".into());
        assert_eq!(err.to_string(), "Invalid input: No query provided");

        let err = Error::RateLimited(60);
        assert!(err.to_string().contains("60 seconds"));
    }
}
