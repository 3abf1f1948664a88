use heycycle_api::models::PortStates;

use crate::models::{PowerStatus, local_now};
use crate::repositories::PowerStatusRepository;

/// Appends executed steps to `power_status`. Never fails the caller.
#[derive(Clone)]
pub struct StatusService {
    repository: PowerStatusRepository,
}

impl StatusService {
    pub fn new(repository: PowerStatusRepository) -> Self {
        Self { repository }
    }

    pub async fn record(
        &self,
        device_id: &str,
        states: PortStates,
        description: &str,
        cycle_id: Option<i64>,
    ) -> Option<i64> {
        let item = PowerStatus::new(device_id, &states, description, cycle_id, local_now());

        match self.repository.create(&item).await {
            Ok(id) => {
                tracing::info!(
                    "state saved to database: {}, description: {}, cycle: {:?}",
                    states,
                    description,
                    cycle_id
                );
                Some(id)
            }
            Err(e) => {
                tracing::error!("error saving to database: {}", e);
                None
            }
        }
    }
}
