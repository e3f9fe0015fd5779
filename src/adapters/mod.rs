//! Adapters for external ticketing systems.

pub mod github;
