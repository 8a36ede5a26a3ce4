use crate::key_status::KeyStatus;

/// Core errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid key status transition from {from} to {to}")]
    InvalidStatusTransition { from: KeyStatus, to: KeyStatus },

    #[error("invalid key status code: {0}")]
    InvalidStatusCode(String),

    #[error("invalid key id: {0}")]
    InvalidKeyId(String),

    #[error("validation error: {0}")]
    ValidationError(String),
}
