use std::env;
use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub access: AccessPolicy,
    pub poll: PollPolicy,
}

/// Where the workflow engine lives and how long a single request may take.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

/// Local preconditions a request must satisfy before submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessPolicy {
    pub allowed_durations: Vec<String>,
    pub forbidden_roles: Vec<String>,
    pub require_reason: bool,
}

/// Bounds for one completion-polling session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    /// 1.0 keeps the delay fixed; larger values grow it per attempt,
    /// capped at `max_delay_ms`.
    pub backoff_multiplier: f64,
    pub overall_ceiling_secs: u64,
    /// Back-to-back transport errors tolerated before giving up.
    pub failure_budget: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self {
            allowed_durations: ["3m", "5m", "15m", "30m", "1h"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            forbidden_roles: vec!["atlasAdmin".to_string()],
            require_reason: true,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_delay_ms: 2000,
            max_delay_ms: 10_000,
            backoff_multiplier: 1.0,
            overall_ceiling_secs: 120,
            failure_budget: 3,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            access: AccessPolicy::default(),
            poll: PollPolicy::default(),
        }
    }
}

impl PollPolicy {
    /// Delay to wait after the given 1-based attempt. Non-decreasing and
    /// capped at `max_delay_ms`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base = self.initial_delay_ms as f64;
        let grown =
            base * self.backoff_multiplier.max(1.0).powi(attempt.saturating_sub(1) as i32);
        Duration::from_millis((grown as u64).min(self.max_delay_ms))
    }

    pub fn ceiling(&self) -> Duration {
        Duration::from_secs(self.overall_ceiling_secs)
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Engine overrides
        if let Ok(v) = env::var("ELEVATE_ENGINE_URL") {
            self.engine.base_url = v;
        }
        if let Ok(v) = env::var("ELEVATE_REQUEST_TIMEOUT_SECS") {
            self.engine.request_timeout_secs =
                v.parse().unwrap_or(self.engine.request_timeout_secs);
        }

        // Access policy overrides
        if let Ok(v) = env::var("ELEVATE_ALLOWED_DURATIONS") {
            self.access.allowed_durations = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("ELEVATE_FORBIDDEN_ROLES") {
            self.access.forbidden_roles = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("ELEVATE_REQUIRE_REASON") {
            self.access.require_reason = v.parse().unwrap_or(self.access.require_reason);
        }

        // Poll policy overrides
        if let Ok(v) = env::var("ELEVATE_POLL_MAX_ATTEMPTS") {
            self.poll.max_attempts = v.parse().unwrap_or(self.poll.max_attempts);
        }
        if let Ok(v) = env::var("ELEVATE_POLL_DELAY_MS") {
            self.poll.initial_delay_ms = v.parse().unwrap_or(self.poll.initial_delay_ms);
        }
        if let Ok(v) = env::var("ELEVATE_POLL_MAX_DELAY_MS") {
            self.poll.max_delay_ms = v.parse().unwrap_or(self.poll.max_delay_ms);
        }
        if let Ok(v) = env::var("ELEVATE_POLL_BACKOFF") {
            self.poll.backoff_multiplier = v.parse().unwrap_or(self.poll.backoff_multiplier);
        }
        if let Ok(v) = env::var("ELEVATE_POLL_CEILING_SECS") {
            self.poll.overall_ceiling_secs =
                v.parse().unwrap_or(self.poll.overall_ceiling_secs);
        }
        if let Ok(v) = env::var("ELEVATE_POLL_FAILURE_BUDGET") {
            self.poll.failure_budget = v.parse().unwrap_or(self.poll.failure_budget);
        }

        self
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_deployment_set() {
        let config = AppConfig::default();
        assert_eq!(
            config.access.allowed_durations,
            vec!["3m", "5m", "15m", "30m", "1h"]
        );
        assert_eq!(config.access.forbidden_roles, vec!["atlasAdmin"]);
        assert!(config.access.require_reason);
    }

    #[test]
    fn fixed_delay_when_multiplier_is_one() {
        let policy = PollPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(9), Duration::from_millis(2000));
    }

    #[test]
    fn backoff_grows_monotonically_and_caps() {
        let policy = PollPolicy {
            backoff_multiplier: 2.0,
            ..PollPolicy::default()
        };
        let mut last = Duration::ZERO;
        for attempt in 1..=10 {
            let delay = policy.delay_for(attempt);
            assert!(delay >= last, "delay shrank at attempt {attempt}");
            assert!(delay <= Duration::from_millis(policy.max_delay_ms));
            last = delay;
        }
        assert_eq!(policy.delay_for(10), Duration::from_millis(10_000));
    }
}
