//! `budget-guard`
//!
//! You have to configure the following environment variables:
//! - `BUDGET_NAME`: name of the budget to check.
//! - `STACK_NAME`: name of the CloudFormation stack to delete.
//!
//! Optional environment variables:
//! - `THRESHOLD_AMOUNT`: the stack is deleted once the limit of the budget is
//!   at or above this amount. `0` by default.
//! - `POLL_DELAY_SECONDS`: seconds between stack status checks. `2` by
//!   default.
//! - `MAX_POLL_ATTEMPTS`: maximum number of stack status checks. Unbounded by
//!   default, in which case the function timeout ends a stalled deletion.
//!
//! The function accepts any event, e.g., a scheduled event or a budget alert
//! delivered through SNS, and returns a [`GuardResponse`].

use aws_config::BehaviorVersion;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;

use budget_guard::aws::{AwsBudgets, CloudFormationStacks, StsIdentity};
use budget_guard::{BudgetGuard, GuardConfig, GuardResponse, PollPolicy};

async fn function_handler(event: LambdaEvent<Value>) -> Result<GuardResponse, Error> {
    tracing::debug!(
        request_id = %event.context.request_id,
        payload = %event.payload,
        "Received event"
    );

    let loaded = GuardConfig::from_env()
        .and_then(|config| PollPolicy::from_env().map(|poll| (config, poll)));
    let (config, poll) = match loaded {
        Ok(loaded) => loaded,
        Err(err) => {
            tracing::error!("{err}");
            return Ok(err.into());
        }
    };

    let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let guard = BudgetGuard::new(
        StsIdentity::new(&sdk_config),
        AwsBudgets::new(&sdk_config),
        CloudFormationStacks::new(&sdk_config),
    )
    .with_poll_policy(poll);

    let result = guard.check_and_maybe_teardown(&config).await;
    if let Err(err) = &result {
        tracing::error!("{err}");
    }
    Ok(result.into())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .init();

    run(service_fn(function_handler)).await
}
