pub mod auth;
pub mod catalog;
pub mod cipher;
pub mod cycle;
pub mod persistence;
pub mod setting;
pub mod transport;

pub use auth::AuthError;
pub use catalog::CatalogError;
pub use cipher::CipherError;
pub use cycle::CycleError;
pub use persistence::PersistenceError;
pub use setting::ConfigError;
pub use transport::TransportError;

use axum::Json;
use axum::response::{IntoResponse, Response};
use heycycle_api::restful::StatusResponse;

impl IntoResponse for CycleError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("Cycle control error: {}", self);
        }

        (status, Json(StatusResponse::error(self.to_string()))).into_response()
    }
}
