//! Errors that end a guard invocation.

use thiserror::Error;

/// Every failure a guard invocation can report.
///
/// None of these are retried inside an invocation. The next scheduled
/// invocation starts the whole check again.
#[derive(Debug, Error)]
pub enum GuardError {
    /// Required configuration is missing or malformed.
    #[error("{0}")]
    Configuration(String),

    #[error("Error retrieving account ID: {0:#}")]
    IdentityResolution(anyhow::Error),

    #[error("Error fetching budget: {0:#}")]
    BudgetLookup(anyhow::Error),

    /// Deleting or polling the stack failed for a reason other than the stack
    /// being absent.
    #[error("Error deleting stack: {0:#}")]
    Teardown(anyhow::Error),

    #[error("Stack {stack_name} deletion did not complete after {attempts} status checks.")]
    PollLimitExceeded { stack_name: String, attempts: u32 },
}

impl GuardError {
    /// HTTP-like status code reported for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            GuardError::Configuration(_) => 400,
            GuardError::IdentityResolution(_)
            | GuardError::BudgetLookup(_)
            | GuardError::Teardown(_)
            | GuardError::PollLimitExceeded { .. } => 500,
        }
    }
}
