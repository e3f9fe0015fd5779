//! Port trait definitions (Hexagonal Architecture)
//!
//! - TaskManager: the capability set every ticketing backend implements
//!
//! The CLI dispatcher only ever talks to a `dyn TaskManager`, so further
//! backends can be added without touching it.

pub mod task_manager;

pub use task_manager::{Operation, TaskManager};
