use async_trait::async_trait;

use crate::client::EngineClient;
use crate::poll::{StatusQueryError, StatusSource};
use crate::request::WorkflowStatus;

impl EngineClient {
    /// GET /breakglass/status?workflow_id=<id>. One observation; the poller
    /// owns retry and budget decisions.
    pub async fn workflow_status(
        &self,
        workflow_id: &str,
    ) -> Result<WorkflowStatus, StatusQueryError> {
        let response = self
            .http()
            .get(self.endpoint("breakglass/status"))
            .query(&[("workflow_id", workflow_id)])
            .send()
            .await
            .map_err(|e| StatusQueryError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StatusQueryError(format!(
                "status endpoint returned {}",
                response.status()
            )));
        }

        response
            .json::<WorkflowStatus>()
            .await
            .map_err(|e| StatusQueryError(format!("malformed status body: {e}")))
    }
}

#[async_trait]
impl StatusSource for EngineClient {
    async fn fetch_status(&self, workflow_id: &str) -> Result<WorkflowStatus, StatusQueryError> {
        self.workflow_status(workflow_id).await
    }
}
