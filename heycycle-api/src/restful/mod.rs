mod control;

pub use control::*;
