use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("User profile not found: {0}")]
    UserNotFound(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Balance of {0} is out of range")]
    BalanceOutOfRange(String),

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}
