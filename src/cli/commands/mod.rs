//! CLI command implementations.

pub mod comment;
pub mod label;
pub mod link;
pub mod milestone;
pub mod ticket;

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::domain::errors::TaskManagerResult;
use crate::domain::ports::{Operation, TaskManager};
use crate::infrastructure::retry::RetryPolicy;

/// Everything a command handler needs.
pub struct CommandContext {
    pub manager: Arc<dyn TaskManager>,
    pub retry: RetryPolicy,
}

impl CommandContext {
    pub fn new(manager: Arc<dyn TaskManager>, retry: RetryPolicy) -> Self {
        Self { manager, retry }
    }

    pub fn manager(&self) -> &dyn TaskManager {
        self.manager.as_ref()
    }

    /// Run one adapter call. Idempotent operations go through the retry
    /// policy; the rest run exactly once.
    pub async fn run<F, Fut, T>(&self, operation: Operation, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TaskManagerResult<T>>,
    {
        let idempotent = operation.is_idempotent();
        debug!(
            provider = self.manager.provider_name(),
            operation = operation.as_str(),
            idempotent,
            "running operation"
        );
        if idempotent {
            Ok(self.retry.execute(true, call).await?)
        } else {
            Ok(call().await?)
        }
    }
}
