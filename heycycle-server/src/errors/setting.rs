/// Fatal at startup, raised before the control loop is entered.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load settings: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Required setting `{0}` is missing")]
    Missing(&'static str),

    #[error("Invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
