mod cycle_handle;

pub use cycle_handle::*;
