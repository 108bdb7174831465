//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use robosync_config::ConfigError;
use robosync_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PARTIAL: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the Robot webservice at {url}")]
    #[diagnostic(
        code(robosync::connection_failed),
        help(
            "Check network access to the webservice.\n\
             URL: {url}\n\
             Override it with --url or HETZNERROBOT_URL."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(robosync::tls_error),
        help("Check the ca_cert path in your profile, or use --insecure against a local test double.")
    )]
    TlsError { message: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(robosync::timeout),
        help("Increase the timeout with --timeout or the profile's timeout setting.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(robosync::auth_failed),
        help(
            "Use the webservice user from Robot > Settings > Webservice and app settings,\n\
             not your Robot login. Store a new password with: robosync config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("No {missing} configured for profile '{profile}'")]
    #[diagnostic(
        code(robosync::no_credentials),
        help(
            "Configure credentials with: robosync config init\n\
             Or set HETZNERROBOT_USERNAME and HETZNERROBOT_PASSWORD."
        )
    )]
    NoCredentials {
        profile: String,
        missing: &'static str,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(robosync::not_found),
        help("Check the {resource_type} identifier in the Robot web interface.")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error ({status}): {message}")]
    #[diagnostic(code(robosync::api_error))]
    ApiError {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Unexpected response from the webservice: {message}")]
    #[diagnostic(code(robosync::unexpected_remote))]
    UnexpectedRemote { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(robosync::partial_apply),
        help("Completed steps stay in effect. Run: robosync vswitch show <id> to see the current state.")
    )]
    PartialApply { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(robosync::validation))]
    Validation { field: String, reason: String },

    #[error("Could not parse {path} as {format}: {reason}")]
    #[diagnostic(
        code(robosync::declaration),
        help("Declaration files are read as YAML unless they end in .json or .toml.")
    )]
    Declaration {
        path: String,
        format: &'static str,
        reason: String,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(robosync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: robosync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(robosync::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(robosync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(robosync::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PartialApply { .. } => exit_code::PARTIAL,
            Self::Validation { .. }
            | Self::Declaration { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                resource_type: entity_type.into(),
                identifier,
            },

            CoreError::UnexpectedRemote { message } => CliError::UnexpectedRemote { message },

            CoreError::Transport(api) => api.into(),

            err @ CoreError::PartialApply { .. } => CliError::PartialApply {
                message: err.to_string(),
            },

            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

impl From<robosync_api::Error> for CliError {
    fn from(err: robosync_api::Error) -> Self {
        use robosync_api::Error as RobotError;

        match err {
            RobotError::Authentication { message } => CliError::AuthFailed { message },
            RobotError::Transport(e) if e.is_timeout() => CliError::Timeout,
            RobotError::Transport(e) if e.is_connect() => CliError::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                source: Box::new(e),
            },
            RobotError::Transport(e) => CliError::ApiError {
                status: e.status().map_or(0, |s| s.as_u16()),
                code: None,
                message: e.to_string(),
            },
            RobotError::Tls(message) => CliError::TlsError { message },
            RobotError::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            RobotError::Api {
                status,
                code,
                message,
            } => CliError::ApiError {
                status,
                code,
                message,
            },
            RobotError::Deserialization { message, .. } => CliError::UnexpectedRemote { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile, missing } => {
                CliError::NoCredentials { profile, missing }
            }
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_exit_code_4() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "vswitch",
            identifier: "42".into(),
        });
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(err.to_string(), "vswitch '42' not found");
    }

    #[test]
    fn authentication_maps_to_auth_exit_code() {
        let err = CliError::from(CoreError::Transport(robosync_api::Error::Authentication {
            message: "bad password".into(),
        }));
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }

    #[test]
    fn partial_apply_keeps_both_sides_in_message() {
        let api = || robosync_api::Error::Api {
            status: 500,
            code: None,
            message: "boom".into(),
        };
        let err = CliError::from(CoreError::PartialApply {
            removal: Some(Box::new(CoreError::Transport(api()))),
            addition: Some(Box::new(CoreError::Transport(api()))),
        });
        assert_eq!(err.exit_code(), exit_code::PARTIAL);
        let text = err.to_string();
        assert!(text.contains("removing servers"), "got: {text}");
        assert!(text.contains("adding servers"), "got: {text}");
    }

    #[test]
    fn api_and_config_errors_map_exit_codes() {
        let err = CliError::from(CoreError::Transport(robosync_api::Error::Api {
            status: 400,
            code: Some("INVALID_INPUT".into()),
            message: "invalid input".into(),
        }));
        assert_eq!(err.exit_code(), exit_code::GENERAL);

        let err = CliError::from(ConfigError::NoCredentials {
            profile: "default".into(),
            missing: "password",
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
