//! Deletes an infrastructure stack once a budget limit reaches a threshold.

pub mod aws;
pub mod config;
pub mod error;
pub mod guard;
pub mod response;
pub mod services;
pub mod utils;

pub use config::{GuardConfig, PollPolicy};
pub use error::GuardError;
pub use guard::{BudgetGuard, GuardOutcome};
pub use response::GuardResponse;
