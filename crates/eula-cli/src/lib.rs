//! Agreement gate CLI
//!
//! Hosts the gate in a console bot and exposes the operator and
//! configuration tooling around it.

pub mod cli;
pub mod commands;
pub mod console;
pub mod logging;
