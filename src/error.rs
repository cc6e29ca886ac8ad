/// Errors surfaced to HTTP callers. Every failure collapses into one of these
/// kinds, each with its own status code (see `response.rs`).
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    ValidationFailed(String),
    Persistence(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(message)
            | Self::ValidationFailed(message)
            | Self::Persistence(message) => message.as_str(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::ValidationFailed(_) => "validation_failed",
            Self::Persistence(_) => "persistence_error",
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}
