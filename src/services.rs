//! Capabilities the guard needs from the outside world.
//!
//! All traits are easily mockable under tests.

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

/// Lifecycle state of a stack as far as the guard cares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackStatus {
    DeleteInProgress,
    DeleteComplete,
    /// Any other status, with its raw name.
    Other(String),
}

impl StackStatus {
    pub fn from_name(name: &str) -> Self {
        match name {
            "DELETE_IN_PROGRESS" => StackStatus::DeleteInProgress,
            "DELETE_COMPLETE" => StackStatus::DeleteComplete,
            other => StackStatus::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            StackStatus::DeleteInProgress => "DELETE_IN_PROGRESS",
            StackStatus::DeleteComplete => "DELETE_COMPLETE",
            StackStatus::Other(name) => name,
        }
    }
}

impl fmt::Display for StackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StackError {
    /// The stack does not exist, or the service refused the request because
    /// the stack is already gone.
    #[error("stack not found: {0}")]
    Absent(String),

    #[error("{0:#}")]
    Service(anyhow::Error),
}

/// Resolves the account the guard runs as.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IdentityService: Send + Sync {
    async fn caller_account_id(&self) -> Result<String>;
}

/// Reads budget configuration.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BudgetService: Send + Sync {
    /// Returns the configured limit of a budget, not the spend to date.
    async fn budget_limit(&self, account_id: &str, budget_name: &str) -> Result<f64>;
}

/// Deletes and observes infrastructure stacks.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait StackService: Send + Sync {
    /// Requests deletion. Must be safe to call on a stack that is already
    /// being deleted.
    async fn delete_stack(&self, stack_name: &str) -> Result<(), StackError>;

    async fn stack_status(&self, stack_name: &str) -> Result<StackStatus, StackError>;
}

/// Hooks fired while a stack is torn down.
#[cfg_attr(test, automock)]
pub trait TeardownObserver: Send + Sync {
    fn delete_requested(&self, stack_name: &str, attempt: u32);

    /// A status check saw the deletion still running.
    fn in_progress(&self, stack_name: &str, check: u32);

    /// A status check saw a status unrelated to deletion. The delete request
    /// is re-issued right after.
    fn unexpected_status(&self, stack_name: &str, status: &str, check: u32);
}

/// Observer that writes every hook to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl TeardownObserver for TracingObserver {
    fn delete_requested(&self, stack_name: &str, attempt: u32) {
        tracing::info!(stack_name, attempt, "Delete stack request sent");
    }

    fn in_progress(&self, stack_name: &str, check: u32) {
        tracing::info!(stack_name, check, "Stack deletion in progress");
    }

    fn unexpected_status(&self, stack_name: &str, status: &str, check: u32) {
        tracing::warn!(
            stack_name,
            status,
            check,
            "Unexpected stack status, retrying deletion"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_status_should_recognize_deletion_states() {
        assert_eq!(
            StackStatus::from_name("DELETE_IN_PROGRESS"),
            StackStatus::DeleteInProgress,
        );
        assert_eq!(
            StackStatus::from_name("DELETE_COMPLETE"),
            StackStatus::DeleteComplete,
        );
    }

    #[test]
    fn stack_status_should_keep_other_names() {
        let status = StackStatus::from_name("DELETE_FAILED");
        assert_eq!(status, StackStatus::Other("DELETE_FAILED".into()));
        assert_eq!(status.to_string(), "DELETE_FAILED");
    }
}
