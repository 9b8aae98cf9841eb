use thiserror::Error;

#[derive(Error, Debug)]
pub enum MessagingError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Message not found")]
    NotFound,

    /// The message already reached a final state (sent, failed, or cancelled)
    #[error("Message is already {0}")]
    AlreadyFinal(String),

    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

pub type MessagingResult<T> = Result<T, MessagingError>;
