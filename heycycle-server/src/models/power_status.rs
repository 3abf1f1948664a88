use heycycle_api::models::PortStates;
use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use super::Table;

/// One executed step. Ports map as power1 → fog, power2 → plasma, power3 → pump.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PowerStatus {
    pub id: i64,
    /// Absent for rows written outside the cycle sequencer
    pub cycle_id: Option<i64>,
    pub timestamp: PrimitiveDateTime,
    pub device_id: String,
    pub fog: bool,
    pub plasma: bool,
    pub pump: bool,
    pub description: String,
}

impl PowerStatus {
    pub fn new(
        device_id: &str,
        states: &PortStates,
        description: &str,
        cycle_id: Option<i64>,
        timestamp: PrimitiveDateTime,
    ) -> Self {
        Self {
            id: 0,
            cycle_id,
            timestamp,
            device_id: device_id.to_string(),
            fog: states.power1,
            plasma: states.power2,
            pump: states.power3,
            description: description.to_string(),
        }
    }

    pub fn states(&self) -> PortStates {
        PortStates::new(self.fog, self.plasma, self.pump)
    }
}

#[derive(Clone)]
pub struct PowerStatusTable;

impl Table for PowerStatusTable {
    fn name(&self) -> &'static str {
        "power_status"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS power_status (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cycle_id INTEGER,
                timestamp DATETIME NOT NULL,
                device_id VARCHAR(255) NOT NULL,
                fog BOOLEAN NOT NULL,
                plasma BOOLEAN NOT NULL,
                pump BOOLEAN NOT NULL,
                description TEXT NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS power_status;")
    }
}
