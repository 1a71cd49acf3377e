//! Completion polling. One `PollSession` owns one workflow handle and
//! repeatedly observes its status under the bounds of a `PollPolicy` until
//! the engine reports a terminal state or a budget runs out. Observation
//! only: nothing here mutates the workflow, and dropping the future stops
//! further network calls without touching the workflow itself.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;

use crate::config::PollPolicy;
use crate::request::{WorkflowHandle, WorkflowStatus};

/// A single status query failed. Counts toward the consecutive-failure
/// budget; never terminates a session on its own.
#[derive(Error, Debug, Clone)]
#[error("status query failed: {0}")]
pub struct StatusQueryError(pub String);

/// Where workflow statuses come from. `EngineClient` implements this over
/// HTTP; tests script it.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, workflow_id: &str) -> Result<WorkflowStatus, StatusQueryError>;
}

/// Cooperative wait between attempts, injected so tests run without real
/// time passing.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// Observation budget exhausted. The workflow may still be running
    /// server-side; this is an observation limit, not a cancellation.
    #[error("no terminal status after {attempts} attempts over {elapsed_ms}ms; the action may still complete")]
    Timeout { attempts: u32, elapsed_ms: u64 },

    /// The status endpoint failed more times in a row than the budget allows.
    #[error("status endpoint unreachable ({consecutive_failures} consecutive failures): {last_error}")]
    Unavailable {
        consecutive_failures: u32,
        last_error: String,
    },
}

/// One polling loop over one handle. Ephemeral: created per `poll` call and
/// consumed when a terminal state, timeout, or unrecoverable error is
/// reached. Sessions share nothing, so any number may run concurrently
/// against the same engine, or even the same handle.
pub struct PollSession {
    handle: WorkflowHandle,
    policy: PollPolicy,
    attempt: u32,
    failure_streak: u32,
    started: Instant,
}

impl PollSession {
    pub fn new(handle: WorkflowHandle, policy: PollPolicy) -> Self {
        Self {
            handle,
            policy,
            attempt: 0,
            failure_streak: 0,
            started: Instant::now(),
        }
    }

    /// Query until a terminal status arrives or a budget runs out.
    pub async fn run<S, D>(mut self, source: &S, delay: &D) -> Result<WorkflowStatus, PollError>
    where
        S: StatusSource + ?Sized,
        D: Delay + ?Sized,
    {
        let workflow_id = self.handle.workflow_id.clone();

        loop {
            self.attempt += 1;

            match source.fetch_status(&workflow_id).await {
                Ok(status) if status.state.is_terminal() => {
                    tracing::debug!(
                        workflow_id = %workflow_id,
                        attempt = self.attempt,
                        state = ?status.state,
                        "terminal status observed"
                    );
                    return Ok(status);
                }
                Ok(status) => {
                    self.failure_streak = 0;
                    tracing::debug!(
                        workflow_id = %workflow_id,
                        attempt = self.attempt,
                        state = ?status.state,
                        "workflow still in progress"
                    );
                }
                Err(err) => {
                    self.failure_streak += 1;
                    tracing::warn!(
                        workflow_id = %workflow_id,
                        attempt = self.attempt,
                        failure_streak = self.failure_streak,
                        error = %err,
                        "status query failed"
                    );
                    if self.failure_streak > self.policy.failure_budget {
                        return Err(PollError::Unavailable {
                            consecutive_failures: self.failure_streak,
                            last_error: err.0,
                        });
                    }
                }
            }

            if self.attempt >= self.policy.max_attempts
                || self.started.elapsed() >= self.policy.ceiling()
            {
                return Err(PollError::Timeout {
                    attempts: self.attempt,
                    elapsed_ms: self.started.elapsed().as_millis() as u64,
                });
            }

            delay.wait(self.policy.delay_for(self.attempt)).await;
        }
    }
}

/// Poll a workflow to a terminal status under the given policy.
pub async fn poll<S, D>(
    source: &S,
    delay: &D,
    handle: &WorkflowHandle,
    policy: &PollPolicy,
) -> Result<WorkflowStatus, PollError>
where
    S: StatusSource + ?Sized,
    D: Delay + ?Sized,
{
    PollSession::new(handle.clone(), policy.clone())
        .run(source, delay)
        .await
}
