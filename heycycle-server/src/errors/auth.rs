use super::{CipherError, TransportError};

/// No usable token is available. Stops the control loop.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token request rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Token request failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to encrypt credentials: {0}")]
    Cipher(#[from] CipherError),

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}
