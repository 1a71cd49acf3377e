pub mod validate;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// What kind of elevation is being asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// Temporary database role grant (e.g. readWriteAnyDatabase for 15m).
    RoleGrant { new_role: String },
    /// Emergency remediation action against a service (restart, scale, rollback).
    Remediation {
        action: String,
        parameters: HashMap<String, String>,
    },
}

/// A candidate elevation request, assembled by the caller and passed
/// explicitly through validate -> submit -> poll. No ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Database username for role grants, service id for remediations.
    pub subject: String,
    /// Known current role of the subject, if already looked up.
    pub current_role: Option<String>,
    pub kind: RequestKind,
    /// Operator-supplied justification.
    pub reason: String,
    /// Duration token, e.g. "15m". Validated against the configured set.
    pub duration: String,
    /// Identity of the requesting operator.
    pub requested_by: String,
}

impl AccessRequest {
    pub fn role_grant(
        subject: impl Into<String>,
        new_role: impl Into<String>,
        reason: impl Into<String>,
        duration: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            current_role: None,
            kind: RequestKind::RoleGrant {
                new_role: new_role.into(),
            },
            reason: reason.into(),
            duration: duration.into(),
            requested_by: requested_by.into(),
        }
    }

    pub fn remediation(
        subject: impl Into<String>,
        action: impl Into<String>,
        parameters: HashMap<String, String>,
        reason: impl Into<String>,
        duration: impl Into<String>,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            current_role: None,
            kind: RequestKind::Remediation {
                action: action.into(),
                parameters,
            },
            reason: reason.into(),
            duration: duration.into(),
            requested_by: requested_by.into(),
        }
    }

    pub fn with_current_role(mut self, role: impl Into<String>) -> Self {
        self.current_role = Some(role.into());
        self
    }
}

/// Identifier pair returned by the engine at submission. Created once,
/// immutable, and the sole key used for all subsequent polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowHandle {
    pub workflow_id: String,
    pub run_id: Option<String>,
}

impl WorkflowHandle {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            run_id: None,
        }
    }

    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = Some(run_id.into());
        self
    }
}

/// Engine-reported workflow state. Unrecognized strings map to `Unknown`
/// so a new engine-side state name reads as "not terminal yet" instead of
/// a deserialization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowState {
    Pending,
    Running,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl WorkflowState {
    /// COMPLETED or FAILED. No further status change expected.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowState::Completed | WorkflowState::Failed)
    }
}

/// One observation of a workflow's progress. Produced transiently per poll;
/// the engine remains the system of record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    #[serde(rename = "status")]
    pub state: WorkflowState,
    /// Meaningful only when `state` is terminal.
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(WorkflowState::Completed.is_terminal());
        assert!(WorkflowState::Failed.is_terminal());
        assert!(!WorkflowState::Pending.is_terminal());
        assert!(!WorkflowState::Running.is_terminal());
        assert!(!WorkflowState::Unknown.is_terminal());
    }

    #[test]
    fn status_deserializes_wire_shape() {
        let status: WorkflowStatus =
            serde_json::from_str(r#"{"status":"COMPLETED","success":true,"message":"done"}"#)
                .unwrap();
        assert_eq!(status.state, WorkflowState::Completed);
        assert!(status.success);
        assert_eq!(status.message.as_deref(), Some("done"));
    }

    #[test]
    fn unrecognized_state_maps_to_unknown() {
        let status: WorkflowStatus =
            serde_json::from_str(r#"{"status":"PAUSED","success":false}"#).unwrap();
        assert_eq!(status.state, WorkflowState::Unknown);
        assert!(!status.state.is_terminal());
    }
}
