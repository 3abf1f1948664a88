use std::time::Duration;

use heycycle_api::models::PortStates;
use serde::{Deserialize, Serialize};

/// One named port-state change held for `duration` seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    pub states: PortStates,
    /// Seconds
    pub duration: u64,
}

impl Step {
    pub fn new(description: impl Into<String>, states: PortStates, duration: u64) -> Self {
        Self {
            description: description.into(),
            states,
            duration,
        }
    }

    pub fn hold(&self) -> Duration {
        Duration::from_secs(self.duration)
    }
}

/// Steps of the catalog matching one pattern group, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleGroup<'a> {
    pub pattern_index: usize,
    pub steps: Vec<&'a Step>,
}
