use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Invalid return URL: {0}")]
    InvalidReturnUrl(#[from] url::ParseError),
    #[error("Registration could not be saved for this session")]
    SessionUnavailable,
    #[error("Registration for {0} is already completed")]
    AlreadyCompleted(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Mail relay error: {0}")]
    Relay(#[from] reqwest::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, RegistrationError>;
