#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("a sponsor store is already registered for email: {0}")]
    DuplicateEmail(String),

    #[error("guide not found: {0}")]
    NotFound(String),

    #[error("seed data error: {0}")]
    Seed(String),
}
