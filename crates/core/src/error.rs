#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: &'static str },
}
