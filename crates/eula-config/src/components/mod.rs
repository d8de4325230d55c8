//! Configuration components for the agreement gate
//!
//! Each section of the configuration file maps to one component.

pub mod agreement;
pub mod bot;
pub mod logging;
pub mod storage;

pub use agreement::*;
pub use bot::*;
pub use logging::*;
pub use storage::*;
