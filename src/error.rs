/// Application-level errors
///
/// A catalog lookup that finds nothing is not an error; it surfaces as `None` or an empty list.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Synthesis failed: {0}")]
    Synthesis(String),

    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the failure was caused by the caller's input rather than a collaborator
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
