use serde::Deserialize;
use thiserror::Error;

use crate::client::EngineClient;

/// Reference-data lookups used to populate and pre-check a request.
/// Advisory only: no retries, a failure surfaces immediately.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("user '{0}' not found")]
    NotFound(String),

    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for DirectoryError {
    fn from(err: reqwest::Error) -> Self {
        DirectoryError::Unavailable(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct UserRoleResponse {
    current_role: String,
}

impl EngineClient {
    /// GET /user-role?username=<id>
    pub async fn current_role(&self, username: &str) -> Result<String, DirectoryError> {
        let response = self
            .http()
            .get(self.endpoint("user-role"))
            .query(&[("username", username)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DirectoryError::NotFound(username.to_string()));
        }
        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "user-role returned status {}",
                response.status()
            )));
        }

        let body: UserRoleResponse = response.json().await?;
        Ok(body.current_role)
    }

    /// GET /built-in-roles
    pub async fn built_in_roles(&self) -> Result<Vec<String>, DirectoryError> {
        let response = self.http().get(self.endpoint("built-in-roles")).send().await?;

        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "built-in-roles returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }

    /// GET /database-users
    pub async fn database_users(&self) -> Result<Vec<String>, DirectoryError> {
        let response = self.http().get(self.endpoint("database-users")).send().await?;

        if !response.status().is_success() {
            return Err(DirectoryError::Unavailable(format!(
                "database-users returned status {}",
                response.status()
            )));
        }

        Ok(response.json().await?)
    }
}
