// ── Runtime connection configuration ──
//
// Describes how to reach the Robot webservice. Carries credentials and
// transport tuning but never touches disk; the CLI builds a `RobotConfig`
// from its profile files and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use robosync_api::{DEFAULT_BASE_URL, RobotClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Only useful against local test doubles.
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => Self::System,
            TlsVerification::CustomCa(path) => Self::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => Self::DangerAcceptInvalid,
        }
    }
}

/// Everything needed to construct one authenticated [`RobotClient`].
#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// Webservice URL (e.g. `https://robot-ws.your-server.de`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RobotConfig {
    pub fn new(username: impl Into<String>, password: SecretString) -> Result<Self, CoreError> {
        let url = Url::parse(DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
            message: format!("invalid default URL: {e}"),
        })?;
        Ok(Self {
            url,
            username: username.into(),
            password,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
        })
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client. The client is owned by the caller and
    /// injected into each reconciler.
    pub fn build_client(&self) -> Result<RobotClient, CoreError> {
        if self.username.is_empty() {
            return Err(CoreError::Config {
                message: "username must not be empty".into(),
            });
        }
        let client = RobotClient::new(
            self.url.clone(),
            self.username.clone(),
            self.password.clone(),
            &self.transport(),
        )?;
        Ok(client)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_robot_webservice() {
        let config = RobotConfig::new("robot-user", SecretString::from("pw".to_owned())).unwrap();
        assert_eq!(config.url.as_str(), "https://robot-ws.your-server.de/");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.tls, TlsVerification::SystemDefaults);
    }

    #[test]
    fn empty_username_is_config_error() {
        let config = RobotConfig::new("", SecretString::from("pw".to_owned())).unwrap();
        assert!(matches!(
            config.build_client(),
            Err(CoreError::Config { .. })
        ));
    }

    #[test]
    fn builds_client_for_url() {
        let mut config = RobotConfig::new("u", SecretString::from("p".to_owned())).unwrap();
        config.url = Url::parse("http://127.0.0.1:9000").unwrap();
        let client = config.build_client().unwrap();
        assert_eq!(client.username(), "u");
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:9000/");
    }
}
