use serde::Serialize;

use crate::poll::PollError;
use crate::request::{WorkflowState, WorkflowStatus};

/// Operator-facing classification of how a request ended. An exhausted
/// observation budget is deliberately not a failure: the action may still
/// complete server-side, and collapsing the two would lose that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Succeeded { message: Option<String> },
    Failed { message: Option<String> },
    Indeterminate { reason: String },
}

impl Outcome {
    /// Classify a terminal engine status. Non-terminal states should never
    /// reach here; if one does, the honest answer is "unknown".
    pub fn from_terminal(status: &WorkflowStatus) -> Self {
        match (status.state, status.success) {
            (WorkflowState::Completed, true) => Outcome::Succeeded {
                message: status.message.clone(),
            },
            (WorkflowState::Completed, false) | (WorkflowState::Failed, _) => Outcome::Failed {
                message: status.message.clone(),
            },
            _ => Outcome::Indeterminate {
                reason: format!("workflow left in state {:?}", status.state),
            },
        }
    }

    pub fn from_poll(result: Result<WorkflowStatus, PollError>) -> Self {
        match result {
            Ok(status) => Outcome::from_terminal(&status),
            Err(err) => Outcome::Indeterminate {
                reason: err.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded { .. })
    }
}
