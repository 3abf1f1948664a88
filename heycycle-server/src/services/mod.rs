mod catalog_service;
mod cipher_service;
mod cloud_client;
mod control_service;
mod device_service;
mod sequencer_service;
mod status_service;
mod token_service;
mod token_store;

pub use catalog_service::*;
pub use cipher_service::*;
pub use cloud_client::*;
pub use control_service::*;
pub use device_service::*;
pub use sequencer_service::*;
pub use status_service::*;
pub use token_service::*;
pub use token_store::*;
