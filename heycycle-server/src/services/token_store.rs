use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::errors::PersistenceError;
use crate::models::Token;

/// Key-value file holding the last issued token.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when nothing has been cached yet.
    pub async fn load(&self) -> Result<Option<Token>, PersistenceError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let token = toml::from_str(&content).map_err(|source| PersistenceError::Decode {
            path: self.path.clone(),
            source,
        })?;

        Ok(Some(token))
    }

    /// Replaces whatever was cached before.
    pub async fn save(&self, token: &Token) -> Result<(), PersistenceError> {
        let content = toml::to_string(token)?;

        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| PersistenceError::Io {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!("token data updated in {}", self.path.display());

        Ok(())
    }
}
