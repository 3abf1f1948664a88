use axum::http::StatusCode;

use super::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("Cycle is already running.")]
    AlreadyRunning,

    #[error("No cycle is currently running.")]
    NotRunning,

    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("Cycle worker failed: {0}")]
    Worker(String),
}

impl CycleError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CycleError::AlreadyRunning => StatusCode::CONFLICT,
            CycleError::NotRunning => StatusCode::CONFLICT,
            CycleError::Catalog(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CycleError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
