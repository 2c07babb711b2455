//! Shared primitives for the opsdeck dashboard.
//!
//! Defines the module tags, identity newtypes, configuration, and error
//! types that the subsystem crates build on.

pub mod config;
pub mod error;
pub mod logging;
pub mod types;

pub use config::OpsdeckConfig;
pub use error::{OpsdeckError, Result};
pub use types::*;
