//! Result object returned to the invoker.

use serde::Serialize;

use crate::error::GuardError;
use crate::guard::GuardOutcome;

/// Status code and human-readable message of an invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardResponse {
    pub status_code: u16,
    pub body: String,
}

impl GuardResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status_code: 200,
            body: body.into(),
        }
    }
}

impl From<GuardOutcome> for GuardResponse {
    fn from(outcome: GuardOutcome) -> Self {
        match outcome {
            GuardOutcome::NoAction { .. } => {
                GuardResponse::ok("Budget threshold not exceeded. No action taken.")
            }
            GuardOutcome::TeardownCompleted { stack_name } => {
                GuardResponse::ok(format!("Stack {stack_name} deletion completed successfully."))
            }
            GuardOutcome::StackAbsent { .. } => GuardResponse::ok(
                "Stack was not found or already in a terminal state. No further action needed.",
            ),
        }
    }
}

impl From<GuardError> for GuardResponse {
    fn from(err: GuardError) -> Self {
        Self {
            status_code: err.status_code(),
            body: err.to_string(),
        }
    }
}

impl From<Result<GuardOutcome, GuardError>> for GuardResponse {
    fn from(result: Result<GuardOutcome, GuardError>) -> Self {
        match result {
            Ok(outcome) => outcome.into(),
            Err(err) => err.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_should_serialize_with_status_code_key() {
        let response = GuardResponse::from(GuardOutcome::TeardownCompleted {
            stack_name: "rag-stack".into(),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "statusCode": 200,
                "body": "Stack rag-stack deletion completed successfully.",
            }),
        );
    }

    #[test]
    fn configuration_error_should_map_to_400() {
        let response = GuardResponse::from(GuardError::Configuration(
            "BUDGET_NAME environment variable not set.".into(),
        ));
        assert_eq!(response.status_code, 400);
        assert_eq!(response.body, "BUDGET_NAME environment variable not set.");
    }

    #[test]
    fn teardown_error_should_map_to_500() {
        let response = GuardResponse::from(GuardError::Teardown(anyhow::anyhow!("AccessDenied")));
        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "Error deleting stack: AccessDenied");
    }
}
