//! Guard configuration sourced from the function environment.
//!
//! Recognized variables:
//! - `BUDGET_NAME` (required): name of the budget to check.
//! - `THRESHOLD_AMOUNT` (default `0`): the stack is deleted once the budget
//!   limit reaches this amount.
//! - `STACK_NAME` (required): name of the stack to delete.
//! - `POLL_DELAY_SECONDS` (default `2`): delay between stack status checks.
//! - `MAX_POLL_ATTEMPTS` (default unbounded): maximum stack status checks.

use std::env;
use std::time::Duration;

use crate::error::GuardError;
use crate::utils::{non_empty, parse_delay_seconds, parse_max_attempts, parse_threshold_amount};

pub const BUDGET_NAME: &str = "BUDGET_NAME";
pub const THRESHOLD_AMOUNT: &str = "THRESHOLD_AMOUNT";
pub const STACK_NAME: &str = "STACK_NAME";
pub const POLL_DELAY_SECONDS: &str = "POLL_DELAY_SECONDS";
pub const MAX_POLL_ATTEMPTS: &str = "MAX_POLL_ATTEMPTS";

pub const DEFAULT_POLL_DELAY: Duration = Duration::from_secs(2);

/// What to watch and what to tear down.
#[derive(Clone, Debug, PartialEq)]
pub struct GuardConfig {
    pub budget_name: String,
    pub threshold_amount: f64,
    pub stack_name: String,
}

impl GuardConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, GuardError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads the configuration through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GuardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let threshold_amount = parse_threshold_amount(lookup(THRESHOLD_AMOUNT).as_deref())
            .map_err(|e| {
                GuardError::Configuration(format!("{THRESHOLD_AMOUNT} is invalid: {e}"))
            })?;
        let config = GuardConfig {
            budget_name: non_empty(lookup(BUDGET_NAME)).unwrap_or_default(),
            threshold_amount,
            stack_name: non_empty(lookup(STACK_NAME)).unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the required fields.
    ///
    /// The stack name is checked before the budget name.
    pub fn validate(&self) -> Result<(), GuardError> {
        if self.stack_name.trim().is_empty() {
            return Err(missing(STACK_NAME));
        }
        if self.budget_name.trim().is_empty() {
            return Err(missing(BUDGET_NAME));
        }
        if !self.threshold_amount.is_finite() || self.threshold_amount < 0.0 {
            return Err(GuardError::Configuration(format!(
                "{THRESHOLD_AMOUNT} must be a non-negative number.",
            )));
        }
        Ok(())
    }
}

fn missing(name: &str) -> GuardError {
    GuardError::Configuration(format!("{name} environment variable not set."))
}

/// How stack deletion is followed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollPolicy {
    /// Delay between two status checks.
    pub delay: Duration,
    /// Maximum number of status checks. `None` polls until a terminal state.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_POLL_DELAY,
            max_attempts: None,
        }
    }
}

impl PollPolicy {
    pub fn from_env() -> Result<Self, GuardError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, GuardError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let delay = parse_delay_seconds(lookup(POLL_DELAY_SECONDS).as_deref(), DEFAULT_POLL_DELAY)
            .map_err(|e| {
                GuardError::Configuration(format!("{POLL_DELAY_SECONDS} is invalid: {e}"))
            })?;
        let max_attempts = parse_max_attempts(lookup(MAX_POLL_ATTEMPTS).as_deref())
            .map_err(|e| {
                GuardError::Configuration(format!("{MAX_POLL_ATTEMPTS} is invalid: {e}"))
            })?;
        Ok(Self {
            delay,
            max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn from_lookup_should_load_complete_configuration() {
        let config = GuardConfig::from_lookup(lookup(&[
            (BUDGET_NAME, "rag-budget"),
            (THRESHOLD_AMOUNT, "50"),
            (STACK_NAME, "rag-stack"),
        ]))
        .unwrap();
        assert_eq!(
            config,
            GuardConfig {
                budget_name: "rag-budget".into(),
                threshold_amount: 50.0,
                stack_name: "rag-stack".into(),
            },
        );
    }

    #[test]
    fn from_lookup_should_default_threshold_to_zero() {
        let config = GuardConfig::from_lookup(lookup(&[
            (BUDGET_NAME, "rag-budget"),
            (STACK_NAME, "rag-stack"),
        ]))
        .unwrap();
        assert_eq!(config.threshold_amount, 0.0);
    }

    #[test]
    fn from_lookup_should_report_missing_stack_name_first() {
        let err = GuardConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.to_string(), "STACK_NAME environment variable not set.");
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn from_lookup_should_report_missing_budget_name() {
        let err = GuardConfig::from_lookup(lookup(&[(STACK_NAME, "rag-stack")])).unwrap_err();
        assert_eq!(err.to_string(), "BUDGET_NAME environment variable not set.");
    }

    #[test]
    fn from_lookup_should_treat_blank_name_as_missing() {
        let err = GuardConfig::from_lookup(lookup(&[
            (BUDGET_NAME, "   "),
            (STACK_NAME, "rag-stack"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "BUDGET_NAME environment variable not set.");
    }

    #[test]
    fn from_lookup_should_reject_malformed_threshold() {
        let err = GuardConfig::from_lookup(lookup(&[
            (BUDGET_NAME, "rag-budget"),
            (THRESHOLD_AMOUNT, "lots"),
            (STACK_NAME, "rag-stack"),
        ]))
        .unwrap_err();
        assert!(matches!(err, GuardError::Configuration(_)));
        assert!(err.to_string().starts_with("THRESHOLD_AMOUNT is invalid"));
    }

    #[test]
    fn validate_should_reject_negative_threshold() {
        let config = GuardConfig {
            budget_name: "rag-budget".into(),
            threshold_amount: -1.0,
            stack_name: "rag-stack".into(),
        };
        assert!(matches!(config.validate(), Err(GuardError::Configuration(_))));
    }

    #[test]
    fn poll_policy_should_default_to_two_seconds_unbounded() {
        let policy = PollPolicy::from_lookup(lookup(&[])).unwrap();
        assert_eq!(policy, PollPolicy::default());
        assert_eq!(policy.delay, Duration::from_secs(2));
        assert_eq!(policy.max_attempts, None);
    }

    #[test]
    fn poll_policy_should_load_overrides() {
        let policy = PollPolicy::from_lookup(lookup(&[
            (POLL_DELAY_SECONDS, "5"),
            (MAX_POLL_ATTEMPTS, "400"),
        ]))
        .unwrap();
        assert_eq!(policy.delay, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, Some(400));
    }

    #[test]
    fn poll_policy_should_reject_zero_attempts() {
        let err = PollPolicy::from_lookup(lookup(&[(MAX_POLL_ATTEMPTS, "0")])).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
}
