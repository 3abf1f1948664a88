#[derive(Debug, thiserror::Error)]
pub enum CipherError {
    #[error("App key must provide {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Cipher text is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Cipher text has invalid padding")]
    Padding,

    #[error("Plain text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
