//! Shared types for the MGNREGA statistics service
//!
//! Holds the common error type and configuration loading used by the
//! backend service crate.

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{Error, Result};
