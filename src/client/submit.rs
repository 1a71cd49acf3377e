use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::client::EngineClient;
use crate::request::{AccessRequest, RequestKind, WorkflowHandle};

/// Submission makes exactly one network call. Re-submitting a privileged
/// action must never happen silently, so a transient failure is surfaced
/// to the caller instead of retried here.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("request rejected by the engine: {reason}")]
    Rejected { reason: String },

    #[error("submission failed in transit: {0}")]
    Transient(String),
}

#[derive(Debug, Serialize)]
struct JitRequestBody<'a> {
    username: &'a str,
    reason: &'a str,
    new_role: &'a str,
    duration: &'a str,
}

#[derive(Debug, Deserialize)]
struct JitRequestAck {
    #[serde(rename = "workflowID")]
    workflow_id: String,
    #[serde(rename = "runID")]
    run_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct BreakglassBody<'a> {
    service_id: &'a str,
    action: &'a str,
    parameters: &'a HashMap<String, String>,
    requested_by: &'a str,
}

#[derive(Debug, Deserialize)]
struct BreakglassAck {
    workflow_id: String,
    #[serde(default)]
    requested_at: Option<DateTime<Utc>>,
}

impl EngineClient {
    /// Send a validated request to the engine and obtain the workflow handle
    /// used for all subsequent polling.
    pub async fn submit(&self, request: &AccessRequest) -> Result<WorkflowHandle, SubmitError> {
        match &request.kind {
            RequestKind::RoleGrant { new_role } => {
                let body = JitRequestBody {
                    username: &request.subject,
                    reason: &request.reason,
                    new_role,
                    duration: &request.duration,
                };
                let ack: JitRequestAck =
                    self.post_submission("jit-request", &body).await?;
                tracing::info!(
                    workflow_id = %ack.workflow_id,
                    username = %request.subject,
                    new_role = %new_role,
                    "role grant accepted by engine"
                );
                let mut handle = WorkflowHandle::new(ack.workflow_id);
                if let Some(run_id) = ack.run_id {
                    handle = handle.with_run_id(run_id);
                }
                Ok(handle)
            }
            RequestKind::Remediation { action, parameters } => {
                let body = BreakglassBody {
                    service_id: &request.subject,
                    action,
                    parameters,
                    requested_by: &request.requested_by,
                };
                let ack: BreakglassAck = self.post_submission("breakglass", &body).await?;
                tracing::info!(
                    workflow_id = %ack.workflow_id,
                    service_id = %request.subject,
                    action = %action,
                    requested_at = ?ack.requested_at,
                    "remediation accepted by engine"
                );
                Ok(WorkflowHandle::new(ack.workflow_id))
            }
        }
    }

    async fn post_submission<B, A>(&self, path: &str, body: &B) -> Result<A, SubmitError>
    where
        B: Serialize,
        A: for<'de> Deserialize<'de>,
    {
        let response = self
            .http()
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| SubmitError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            // Backend validation failure. Carry its reason verbatim.
            let reason = response
                .text()
                .await
                .unwrap_or_else(|_| format!("status {status}"));
            return Err(SubmitError::Rejected {
                reason: reason.trim().to_string(),
            });
        }
        if !status.is_success() {
            return Err(SubmitError::Transient(format!(
                "{path} returned status {status}"
            )));
        }

        response
            .json::<A>()
            .await
            .map_err(|e| SubmitError::Transient(format!("malformed acknowledgment: {e}")))
    }
}
