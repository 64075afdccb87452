//! Core abstractions for diagram auditing
//!
//! This module defines the shared vocabulary of the crate: flow-node kinds,
//! severities, geometry, the fatal error taxonomy, and logging setup.

mod error;
pub mod logging;
mod types;

pub use error::*;
pub use logging::*;
pub use types::*;
