use std::fmt;

use serde::{Deserialize, Serialize};

/// Relay state of the three controlled ports of the power strip.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortStates {
    /// Fog machine
    pub power1: bool,
    /// Plasma generator
    pub power2: bool,
    /// Circulation pump
    pub power3: bool,
}

impl PortStates {
    pub fn new(power1: bool, power2: bool, power3: bool) -> Self {
        Self {
            power1,
            power2,
            power3,
        }
    }
}

impl fmt::Display for PortStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "power1={} power2={} power3={}",
            self.power1, self.power2, self.power3
        )
    }
}

/// Body of `POST /control/<device_id>`.
///
/// The vendor API spells the field `requirments`; it must stay that way on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    #[serde(rename = "requirments")]
    pub requirements: PortStates,
}

impl From<PortStates> for ControlRequest {
    fn from(requirements: PortStates) -> Self {
        Self { requirements }
    }
}
