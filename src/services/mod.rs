use serde::Serialize;
use thiserror::Error;

use crate::client::directory::DirectoryError;
use crate::client::submit::SubmitError;
use crate::client::{ClientError, EngineClient};
use crate::config::{AccessPolicy, AppConfig, PollPolicy};
use crate::poll::{self, TokioDelay};
use crate::report::Outcome;
use crate::request::validate::{validate, ValidationError};
use crate::request::{AccessRequest, RequestKind, WorkflowHandle};

/// Errors that abort the flow before polling begins. Polling outcomes are
/// never errors here; they fold into [`Outcome`].
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error(transparent)]
    Submit(#[from] SubmitError),
}

/// Submission receipt plus the final classification of one request.
#[derive(Debug, Clone, Serialize)]
pub struct AccessReport {
    pub handle: WorkflowHandle,
    pub outcome: Outcome,
}

/// Drives one request through its whole lifecycle:
/// validate -> submit -> poll -> report. Strictly sequential per request;
/// independent requests can run through clones of this service concurrently.
#[derive(Clone)]
pub struct AccessService {
    client: EngineClient,
    access: AccessPolicy,
    poll: PollPolicy,
}

impl AccessService {
    pub fn new(client: EngineClient, access: AccessPolicy, poll: PollPolicy) -> Self {
        Self {
            client,
            access,
            poll,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ClientError> {
        Ok(Self::new(
            EngineClient::from_config(&config.engine)?,
            config.access.clone(),
            config.poll.clone(),
        ))
    }

    pub fn client(&self) -> &EngineClient {
        &self.client
    }

    /// Fill in the subject's current role from the directory when the caller
    /// has not already looked it up. Only role grants need it.
    async fn resolve(&self, mut request: AccessRequest) -> Result<AccessRequest, AccessError> {
        if matches!(request.kind, RequestKind::RoleGrant { .. }) && request.current_role.is_none()
        {
            let role = self.client.current_role(&request.subject).await?;
            tracing::debug!(subject = %request.subject, current_role = %role, "resolved current role");
            request.current_role = Some(role);
        }
        Ok(request)
    }

    /// Validate and submit. No polling; returns the handle so the caller can
    /// decide whether to track it.
    pub async fn submit(&self, request: AccessRequest) -> Result<WorkflowHandle, AccessError> {
        let request = self.resolve(request).await?;
        validate(&request, &self.access)?;
        Ok(self.client.submit(&request).await?)
    }

    /// Poll a previously submitted workflow to its classification. Poll
    /// errors become an indeterminate outcome, never a hard error.
    pub async fn track(&self, handle: &WorkflowHandle) -> Outcome {
        let result = poll::poll(&self.client, &TokioDelay, handle, &self.poll).await;
        Outcome::from_poll(result)
    }

    /// The full lifecycle for one request.
    pub async fn execute(&self, request: AccessRequest) -> Result<AccessReport, AccessError> {
        let handle = self.submit(request).await?;
        let outcome = self.track(&handle).await;
        Ok(AccessReport { handle, outcome })
    }
}
