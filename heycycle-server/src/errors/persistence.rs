use std::path::PathBuf;

/// Database or token file failure. Logged and swallowed by the control loop.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed token cache {path}: {source}")]
    Decode {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to encode token cache: {0}")]
    Encode(#[from] toml::ser::Error),
}
