//! Radio controller: state machine, interrupt flags, driver seam

pub mod controller;
pub mod flags;
pub mod traits;

pub use controller::RadioController;
pub use flags::{IrqFlag, IrqFlags};
