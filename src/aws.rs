//! AWS implementations of the guard capabilities.
//!
//! - [`StsIdentity`]: `sts:GetCallerIdentity`
//! - [`AwsBudgets`]: `budgets:DescribeBudget`
//! - [`CloudFormationStacks`]: `cloudformation:DeleteStack` and
//!   `cloudformation:DescribeStacks`

use std::error::Error as StdError;
use std::fmt::Debug;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::services::{BudgetService, IdentityService, StackError, StackService, StackStatus};

/// Error codes CloudFormation answers with when the stack does not exist.
const ABSENT_STACK_CODES: [&str; 2] = ["ValidationError", "NotFoundException"];

#[derive(Clone, Debug)]
pub struct StsIdentity {
    client: aws_sdk_sts::Client,
}

impl StsIdentity {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_sts::Client::new(config),
        }
    }
}

#[async_trait]
impl IdentityService for StsIdentity {
    #[tracing::instrument(skip(self), err)]
    async fn caller_account_id(&self) -> Result<String> {
        let output = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(e)))?;
        output
            .account()
            .map(str::to_string)
            .context("caller identity has no account")
    }
}

#[derive(Clone, Debug)]
pub struct AwsBudgets {
    client: aws_sdk_budgets::Client,
}

impl AwsBudgets {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_budgets::Client::new(config),
        }
    }
}

#[async_trait]
impl BudgetService for AwsBudgets {
    #[tracing::instrument(skip(self), err)]
    async fn budget_limit(&self, account_id: &str, budget_name: &str) -> Result<f64> {
        let output = self
            .client
            .describe_budget()
            .account_id(account_id)
            .budget_name(budget_name)
            .send()
            .await
            .map_err(|e| anyhow!("{}", DisplayErrorContext(e)))?;
        let amount = output
            .budget()
            .and_then(|budget| budget.budget_limit())
            .map(|limit| limit.amount())
            .with_context(|| format!("budget {budget_name} has no limit"))?;
        parse_amount(amount)
    }
}

/// Parses a decimal amount as returned by the Budgets API, e.g. `"100.0"`.
fn parse_amount(amount: &str) -> Result<f64> {
    let value: f64 = amount
        .trim()
        .parse()
        .with_context(|| format!("budget limit \"{amount}\" is not a number"))?;
    if !value.is_finite() {
        anyhow::bail!("budget limit \"{amount}\" is not a finite number");
    }
    Ok(value)
}

#[derive(Clone, Debug)]
pub struct CloudFormationStacks {
    client: aws_sdk_cloudformation::Client,
}

impl CloudFormationStacks {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_cloudformation::Client::new(config),
        }
    }
}

#[async_trait]
impl StackService for CloudFormationStacks {
    #[tracing::instrument(skip(self), err)]
    async fn delete_stack(&self, stack_name: &str) -> Result<(), StackError> {
        self.client
            .delete_stack()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(classify)?;
        Ok(())
    }

    #[tracing::instrument(skip(self), err)]
    async fn stack_status(&self, stack_name: &str) -> Result<StackStatus, StackError> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(stack_name)
            .send()
            .await
            .map_err(classify)?;
        let stack = output
            .stacks()
            .first()
            .ok_or_else(|| StackError::Absent(format!("no stack named {stack_name}")))?;
        let status = stack
            .stack_status()
            .ok_or_else(|| StackError::Service(anyhow!("stack {stack_name} reported no status")))?;
        tracing::debug!(stack_name, status = status.as_str(), "Described stack");
        Ok(StackStatus::from_name(status.as_str()))
    }
}

fn classify<E, R>(err: SdkError<E, R>) -> StackError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: Debug,
{
    let absent = is_absent_code(err.as_service_error().and_then(|e| e.code()));
    let message = DisplayErrorContext(err).to_string();
    if absent {
        StackError::Absent(message)
    } else {
        StackError::Service(anyhow!(message))
    }
}

fn is_absent_code(code: Option<&str>) -> bool {
    code.is_some_and(|code| ABSENT_STACK_CODES.contains(&code))
}
