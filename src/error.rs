use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("SERIALIZATION: {0}")]
    Serialization(String),
    #[error("STORAGE: {0}")]
    Storage(String),
    #[error("NOTIFICATION: {0}")]
    Notification(String),
    #[error("INVALID_GOAL: {0}ml is not one of the allowed goals")]
    InvalidGoal(u32),
    #[error("INVALID_AMOUNT: intake must be a positive amount of milliliters")]
    InvalidAmount,
    #[error("CONFIG: {0}")]
    Config(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
