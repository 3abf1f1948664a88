use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Entry of `GET /devices`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "deviceType", default)]
    pub device_type: String,
    /// Vendor fields this client does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
