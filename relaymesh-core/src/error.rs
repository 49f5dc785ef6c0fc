use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed signal message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid room link '{link}': {reason}")]
    InvalidLink { link: String, reason: String },
}
