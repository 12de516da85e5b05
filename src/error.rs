use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Task not found")]
    NotFound,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    Service { message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn service(message: impl Into<String>) -> Self {
        AppError::Service {
            message: message.into(),
        }
    }
}
