//! # EULA Configuration Library
//!
//! Type-safe configuration for the agreement gate: loading, validation and
//! schema export.
//!
//! ## Features
//!
//! - TOML configuration files, loaded once at startup
//! - Range validation for the numeric agreement settings
//! - JSON schema export of the full configuration surface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use eula_config::ConfigLoader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::load_from_file("eula.toml").await?;
//!     println!("waiting {}s for replies", config.agreement.wait_time);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod components;
mod config;
mod error;
mod loader;

pub use components::*;
pub use config::*;
pub use error::*;
pub use loader::*;
