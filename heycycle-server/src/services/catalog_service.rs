use std::path::Path;

use heycycle_api::models::PortStates;
use serde::{Deserialize, Serialize};

use crate::errors::CatalogError;
use crate::models::Step;

/// One line of the step file: `description,power1,power2,power3,duration`.
#[derive(Debug, Serialize, Deserialize)]
struct StepRow {
    description: String,
    power1: String,
    power2: String,
    power3: String,
    duration: String,
}

impl StepRow {
    fn flag(value: &str) -> bool {
        value.trim().eq_ignore_ascii_case("true")
    }

    fn into_step(self) -> Result<Step, CatalogError> {
        let duration = self
            .duration
            .trim()
            .parse::<u64>()
            .map_err(|_| CatalogError::InvalidDuration {
                description: self.description.clone(),
                value: self.duration.clone(),
            })?;
        let states = PortStates::new(
            Self::flag(&self.power1),
            Self::flag(&self.power2),
            Self::flag(&self.power3),
        );

        Ok(Step::new(self.description, states, duration))
    }
}

impl From<&Step> for StepRow {
    fn from(step: &Step) -> Self {
        Self {
            description: step.description.clone(),
            power1: step.states.power1.to_string(),
            power2: step.states.power2.to_string(),
            power3: step.states.power3.to_string(),
            duration: step.duration.to_string(),
        }
    }
}

/// Loads the step catalog in file order.
pub fn load_steps(path: impl AsRef<Path>) -> Result<Vec<Step>, CatalogError> {
    let path = path.as_ref();
    let read_error = |source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_error)?;
    let steps = reader
        .deserialize::<StepRow>()
        .map(|row| row.map_err(read_error)?.into_step())
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!("{} steps loaded from {}", steps.len(), path.display());

    Ok(steps)
}

pub fn save_steps(path: impl AsRef<Path>, steps: &[Step]) -> Result<(), CatalogError> {
    let path = path.as_ref();
    let write_error = |source| CatalogError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(write_error)?;
    for step in steps {
        writer.serialize(StepRow::from(step)).map_err(write_error)?;
    }
    writer
        .flush()
        .map_err(|e| write_error(csv::Error::from(e)))?;

    tracing::info!("steps saved to {}", path.display());

    Ok(())
}

/// The fog/plasma program: 20 minutes on, 40 minutes off, pump always running.
pub fn default_steps() -> Vec<Step> {
    const ON: u64 = 60 * 20;
    const OFF: u64 = 60 * 40;

    vec![
        Step::new("Turning ON fog", PortStates::new(true, false, true), ON),
        Step::new("Turning OFF fog", PortStates::new(false, false, true), OFF),
        Step::new("Turning ON plasma", PortStates::new(false, true, true), ON),
        Step::new("Turning OFF plasma", PortStates::new(false, false, true), OFF),
        Step::new("Turning ON fog and plasma", PortStates::new(true, true, true), ON),
        Step::new("Turning OFF fog and plasma", PortStates::new(false, false, true), OFF),
    ]
}
