//! Domain layer for Tasklink
//!
//! Platform-agnostic entity model, the task manager port, and the error
//! taxonomy every provider reports through.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ProjectScope, QueryErrorEntry, TaskManagerError, TaskManagerResult};
