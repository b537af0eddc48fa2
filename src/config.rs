//! Configuration module

use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4o-mini";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Name reported by the health check
    pub service_name: String,

    /// Environment (development, production)
    pub environment: String,

    /// Directory holding the risk-scoring artifacts
    pub artifact_dir: PathBuf,

    /// Remote risk optimizer; in-process when unset
    pub risk_service_url: Option<String>,

    /// Remote policy agent; in-process when unset
    pub policy_service_url: Option<String>,

    /// Timeout for calls to remote collaborators
    pub request_timeout_seconds: u64,

    pub openai_api_key: Option<String>,

    pub completion_base_url: String,

    pub completion_model: String,

    pub completion_timeout_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            service_name: var("SERVICE_NAME")
                .unwrap_or_else(|| "SpeedLimit Decision Service".to_string()),

            environment: var("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),

            artifact_dir: var("ARTIFACT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("artifacts")),

            risk_service_url: var("RISK_SERVICE_URL"),

            policy_service_url: var("POLICY_SERVICE_URL"),

            request_timeout_seconds: var("REQUEST_TIMEOUT_SECONDS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(10),

            openai_api_key: var("OPENAI_API_KEY"),

            completion_base_url: var("COMPLETION_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string()),

            completion_model: var("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),

            completion_timeout_seconds: var("COMPLETION_TIMEOUT_SECONDS")
                .and_then(|s| s.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(15),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.service_name, "SpeedLimit Decision Service");
        assert_eq!(config.artifact_dir, PathBuf::from("artifacts"));
        assert!(config.risk_service_url.is_none());
        assert!(config.policy_service_url.is_none());
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.completion_timeout(), Duration::from_secs(15));
        assert_eq!(config.completion_model, "gpt-4o-mini");
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("ENVIRONMENT", "production"),
            ("ARTIFACT_DIR", "/srv/artifacts"),
            ("RISK_SERVICE_URL", "http://risk:8080"),
            ("REQUEST_TIMEOUT_SECONDS", "3"),
            ("OPENAI_API_KEY", "sk-test"),
        ]);
        assert_eq!(config.port, 9000);
        assert!(config.is_production());
        assert_eq!(config.artifact_dir, PathBuf::from("/srv/artifacts"));
        assert_eq!(config.risk_service_url.as_deref(), Some("http://risk:8080"));
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_invalid_and_blank_values_fall_back() {
        let config = config(&[
            ("PORT", "not-a-port"),
            ("OPENAI_API_KEY", "  "),
            ("COMPLETION_TIMEOUT_SECONDS", "-1"),
        ]);
        assert_eq!(config.port, 8080);
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.completion_timeout_seconds, 15);
    }

    #[test]
    fn test_zero_timeouts_fall_back() {
        let config = config(&[
            ("REQUEST_TIMEOUT_SECONDS", "0"),
            ("COMPLETION_TIMEOUT_SECONDS", "0"),
        ]);
        assert_eq!(config.request_timeout_seconds, 10);
        assert_eq!(config.completion_timeout_seconds, 15);
    }
}
