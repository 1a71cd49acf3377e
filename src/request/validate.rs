use thiserror::Error;

use crate::config::AccessPolicy;
use crate::request::{AccessRequest, RequestKind};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("requested role '{0}' is the same as the current role")]
    NoOpRequest(String),

    #[error("a reason is required for this request")]
    MissingReason,

    #[error("duration '{given}' is not allowed (allowed: {allowed})")]
    InvalidDuration { given: String, allowed: String },

    #[error("role '{0}' cannot be requested through this channel")]
    ForbiddenRole(String),

    #[error("unknown remediation action '{0}'")]
    UnknownAction(String),

    #[error("action '{action}' requires parameter '{parameter}'")]
    MissingParameter { action: String, parameter: String },
}

/// Parameters each remediation action must carry before submission.
fn required_parameters(action: &str) -> Option<&'static [&'static str]> {
    match action {
        "restart" => Some(&[]),
        "scale" => Some(&["replicas"]),
        "rollback" => Some(&["version"]),
        _ => None,
    }
}

/// Check a candidate request against policy before it is allowed to leave
/// the client. Rules run in a fixed order and the first failing reason wins.
/// Pure: no side effects, no network, safe to call repeatedly.
pub fn validate(request: &AccessRequest, policy: &AccessPolicy) -> Result<(), ValidationError> {
    // 1. No-op role changes are rejected.
    if let RequestKind::RoleGrant { new_role } = &request.kind {
        if let Some(current) = &request.current_role {
            if current == new_role {
                return Err(ValidationError::NoOpRequest(new_role.clone()));
            }
        }
    }

    // 2. Justification, when the deployment requires one.
    if policy.require_reason && request.reason.trim().is_empty() {
        return Err(ValidationError::MissingReason);
    }

    // 3. Duration must come from the configured set.
    if !policy.allowed_durations.iter().any(|d| d == &request.duration) {
        return Err(ValidationError::InvalidDuration {
            given: request.duration.clone(),
            allowed: policy.allowed_durations.join(", "),
        });
    }

    match &request.kind {
        // 4. Forbidden escalations are rejected regardless of other fields.
        RequestKind::RoleGrant { new_role } => {
            if policy.forbidden_roles.iter().any(|r| r == new_role) {
                return Err(ValidationError::ForbiddenRole(new_role.clone()));
            }
        }
        // 5. Remediation parameters must satisfy the per-action schema.
        RequestKind::Remediation { action, parameters } => {
            let required = required_parameters(action)
                .ok_or_else(|| ValidationError::UnknownAction(action.clone()))?;
            for key in required {
                if !parameters.contains_key(*key) {
                    return Err(ValidationError::MissingParameter {
                        action: action.clone(),
                        parameter: (*key).to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}
