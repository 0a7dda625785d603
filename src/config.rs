//! Configuration types for the NTLM request executor.

use crate::error::{NtlmError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration for the NTLM request executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NtlmClientConfig {
    /// Config version
    pub version: String,

    /// TLS settings
    pub tls: TlsConfig,

    /// Request and connect timeouts
    pub timeouts: TimeoutConfig,

    /// Workstation name sent in NTLM negotiate/authenticate messages
    pub workstation: String,

    /// Optional User-Agent header
    pub user_agent: Option<String>,
}

impl Default for NtlmClientConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            tls: TlsConfig::default(),
            timeouts: TimeoutConfig::default(),
            workstation: String::new(),
            user_agent: None,
        }
    }
}

impl NtlmClientConfig {
    /// Check the configuration for values the HTTP stack cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.timeouts.request_secs == Some(0) {
            return Err(NtlmError::Config("timeouts.request_secs must be greater than zero".into()));
        }
        if self.timeouts.connect_secs == Some(0) {
            return Err(NtlmError::Config("timeouts.connect_secs must be greater than zero".into()));
        }
        Ok(())
    }
}

/// TLS settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Skip server certificate verification. Only meant for test environments
    /// with self-signed certificates.
    pub accept_invalid_certs: bool,
}

/// Timeout settings. `None` means no timeout is applied and a call blocks
/// until the server answers or the connection fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total time allowed for each HTTP exchange, in seconds
    pub request_secs: Option<u64>,

    /// Time allowed for establishing a connection, in seconds
    pub connect_secs: Option<u64>,
}

impl TimeoutConfig {
    pub fn request(&self) -> Option<Duration> {
        self.request_secs.map(Duration::from_secs)
    }

    pub fn connect(&self) -> Option<Duration> {
        self.connect_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NtlmClientConfig::default();
        assert!(!config.tls.accept_invalid_certs);
        assert!(config.timeouts.request().is_none());
        assert!(config.timeouts.connect().is_none());
        assert!(config.workstation.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = NtlmClientConfig::default();
        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: NtlmClientConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.version, config.version);
        assert_eq!(parsed.tls.accept_invalid_certs, config.tls.accept_invalid_certs);
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
version: "1"
tls:
  accept_invalid_certs: true
timeouts:
  request_secs: 30
workstation: LOADGEN01
user_agent: "k6-ntlm/1.0"
"#;
        let config: NtlmClientConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.tls.accept_invalid_certs);
        assert_eq!(config.timeouts.request(), Some(Duration::from_secs(30)));
        assert!(config.timeouts.connect().is_none());
        assert_eq!(config.workstation, "LOADGEN01");
        assert_eq!(config.user_agent.as_deref(), Some("k6-ntlm/1.0"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = NtlmClientConfig::default();
        config.timeouts.connect_secs = Some(0);
        assert!(matches!(config.validate(), Err(NtlmError::Config(_))));
    }
}
