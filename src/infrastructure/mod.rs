//! Infrastructure layer module
//!
//! Configuration loading and logging setup. The GitHub integration itself
//! lives in [`crate::adapters`].

pub mod config;
pub mod logging;
pub mod retry;
