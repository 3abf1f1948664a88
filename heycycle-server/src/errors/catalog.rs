use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read steps from {path}: {source}")]
    Read { path: PathBuf, source: csv::Error },

    #[error("Failed to write steps to {path}: {source}")]
    Write { path: PathBuf, source: csv::Error },

    #[error("Invalid duration {value:?} for step {description:?}")]
    InvalidDuration { description: String, value: String },

    #[error("No steps found in {0}")]
    Empty(PathBuf),
}
