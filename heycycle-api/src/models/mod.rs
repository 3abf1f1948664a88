mod auth;
mod control;
mod device;

pub use auth::*;
pub use control::*;
pub use device::*;
