//! Budget check and stack teardown.

use tokio::time::sleep;

use crate::config::{GuardConfig, PollPolicy};
use crate::error::GuardError;
use crate::services::{
    BudgetService, IdentityService, StackError, StackService, StackStatus, TeardownObserver,
    TracingObserver,
};

/// Successful end of a guard invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum GuardOutcome {
    /// The budget limit is below the threshold.
    NoAction {
        limit_amount: f64,
        threshold_amount: f64,
    },
    /// The stack reached `DELETE_COMPLETE`.
    TeardownCompleted { stack_name: String },
    /// The stack service no longer knows the stack.
    StackAbsent { stack_name: String },
}

/// Deletes a stack once a budget limit reaches a threshold.
pub struct BudgetGuard<I, B, S> {
    identity: I,
    budgets: B,
    stacks: S,
    poll: PollPolicy,
    observer: Box<dyn TeardownObserver>,
}

impl<I, B, S> BudgetGuard<I, B, S>
where
    I: IdentityService,
    B: BudgetService,
    S: StackService,
{
    pub fn new(identity: I, budgets: B, stacks: S) -> Self {
        Self {
            identity,
            budgets,
            stacks,
            poll: PollPolicy::default(),
            observer: Box::new(TracingObserver),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_observer(mut self, observer: impl TeardownObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Compares the budget limit with the threshold and tears the stack down
    /// if the limit is at or above it.
    ///
    /// Nothing is contacted if `config` is invalid. Identity and budget
    /// lookups are not retried.
    #[tracing::instrument(
        skip_all,
        fields(budget_name = %config.budget_name, stack_name = %config.stack_name)
    )]
    pub async fn check_and_maybe_teardown(
        &self,
        config: &GuardConfig,
    ) -> Result<GuardOutcome, GuardError> {
        config.validate()?;

        let account_id = self
            .identity
            .caller_account_id()
            .await
            .map_err(GuardError::IdentityResolution)?;
        let limit_amount = self
            .budgets
            .budget_limit(&account_id, &config.budget_name)
            .await
            .map_err(GuardError::BudgetLookup)?;
        if !limit_amount.is_finite() {
            return Err(GuardError::BudgetLookup(anyhow::anyhow!(
                "budget limit {limit_amount} is not a finite number"
            )));
        }

        if limit_amount >= config.threshold_amount {
            tracing::info!(
                limit_amount,
                threshold_amount = config.threshold_amount,
                "Budget threshold exceeded, deleting stack"
            );
            return self.teardown(&config.stack_name).await;
        }

        tracing::info!(
            limit_amount,
            threshold_amount = config.threshold_amount,
            "Budget threshold not exceeded"
        );
        Ok(GuardOutcome::NoAction {
            limit_amount,
            threshold_amount: config.threshold_amount,
        })
    }

    async fn teardown(&self, stack_name: &str) -> Result<GuardOutcome, GuardError> {
        let mut delete_requests = 1;
        if let Err(err) = self.request_delete(stack_name, delete_requests).await {
            return settle(stack_name, err);
        }

        let mut checks = 0;
        loop {
            if let Some(max_attempts) = self.poll.max_attempts {
                if checks >= max_attempts {
                    return Err(GuardError::PollLimitExceeded {
                        stack_name: stack_name.to_string(),
                        attempts: checks,
                    });
                }
            }
            if checks > 0 {
                sleep(self.poll.delay).await;
            }
            checks += 1;

            match self.stacks.stack_status(stack_name).await {
                Ok(StackStatus::DeleteComplete) => {
                    tracing::info!(stack_name, checks, "Stack deletion completed");
                    return Ok(GuardOutcome::TeardownCompleted {
                        stack_name: stack_name.to_string(),
                    });
                }
                Ok(StackStatus::DeleteInProgress) => {
                    self.observer.in_progress(stack_name, checks);
                }
                Ok(StackStatus::Other(status)) => {
                    self.observer.unexpected_status(stack_name, &status, checks);
                    delete_requests += 1;
                    if let Err(err) = self.request_delete(stack_name, delete_requests).await {
                        return settle(stack_name, err);
                    }
                }
                Err(err) => return settle(stack_name, err),
            }
        }
    }

    async fn request_delete(&self, stack_name: &str, attempt: u32) -> Result<(), StackError> {
        self.stacks.delete_stack(stack_name).await?;
        self.observer.delete_requested(stack_name, attempt);
        Ok(())
    }
}

/// Ends the teardown on a stack service error.
fn settle(stack_name: &str, err: StackError) -> Result<GuardOutcome, GuardError> {
    match err {
        StackError::Absent(reason) => {
            tracing::info!(
                stack_name,
                reason = %reason,
                "Stack not found or already in a terminal state"
            );
            Ok(GuardOutcome::StackAbsent {
                stack_name: stack_name.to_string(),
            })
        }
        StackError::Service(err) => Err(GuardError::Teardown(err)),
    }
}
