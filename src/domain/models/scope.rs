//! Scope: the remote namespace an adapter instance addresses.

use serde::{Deserialize, Serialize};

/// The (owner, repository, optional project number) triple.
///
/// Fixed for the lifetime of one adapter; every lookup is implicitly
/// parameterised by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub owner: String,
    pub repo: String,
    pub project_number: Option<u64>,
}

impl Scope {
    /// `owner/repo`, as used in search qualifiers.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}
