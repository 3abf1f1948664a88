use std::sync::Arc;

use heycycle_api::models::PortStates;

use crate::errors::TransportError;
use crate::models::Token;
use crate::services::CloudClient;

/// Pushes port-state vectors to the power strip. One attempt, no retry.
#[derive(Clone)]
pub struct DeviceService {
    client: Arc<CloudClient>,
}

impl DeviceService {
    pub fn new(client: Arc<CloudClient>) -> Self {
        Self { client }
    }

    /// Returns true only when the vendor answered 200.
    pub async fn apply(&self, token: &Token, device_id: &str, states: PortStates) -> bool {
        match self.client.control(token, device_id, states).await {
            Ok(()) => {
                tracing::info!("device {} updated successfully: {}", device_id, states);
                true
            }
            Err(TransportError::Status { status, body }) => {
                tracing::warn!(
                    "failed to update device {}. Status: {}, Response: {}",
                    device_id,
                    status,
                    body
                );
                false
            }
            Err(e) => {
                tracing::error!("error during control request for {}: {}", device_id, e);
                false
            }
        }
    }
}
