//! Profile configuration for robosync.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation into `robosync_core::RobotConfig`. The CLI layers its own
//! flag overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use robosync_core::{DEFAULT_BASE_URL, RobotConfig, TlsVerification};

/// Keyring service name. Entries are keyed `<profile>/password`.
pub const KEYRING_SERVICE: &str = "robosync";

pub const ENV_USERNAME: &str = "HETZNERROBOT_USERNAME";
pub const ENV_PASSWORD: &str = "HETZNERROBOT_PASSWORD";
pub const ENV_URL: &str = "HETZNERROBOT_URL";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no {missing} configured for profile '{profile}'")]
    NoCredentials {
        profile: String,
        missing: &'static str,
    },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Resolve the active profile name: explicit choice, then the
    /// configured default, then `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    /// Sorted list of profile names, or `"(none)"`.
    pub fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            "(none)".into()
        } else {
            self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named Robot account.
///
/// Every field is optional: a bare environment (`HETZNERROBOT_*`) is a
/// valid configuration on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Webservice base URL. Defaults to the public Robot endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Robot webservice user (not the Robot login e-mail).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password (plaintext; prefer keyring or `password_env`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (test doubles only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Per-request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("de", "robosync", "robosync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("robosync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file plus environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file is not an error.
///
/// `ROBOSYNC_`-prefixed variables override file values; nested keys use a
/// double underscore (`ROBOSYNC_DEFAULTS__TIMEOUT=60`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ROBOSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is absent or unreadable.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential sources ──────────────────────────────────────────────

/// Where credentials are looked up besides the profile itself.
pub trait CredentialSource {
    /// Environment lookup. Empty values count as unset.
    fn var(&self, name: &str) -> Option<String>;

    /// Stored keyring password for a profile.
    fn keyring_password(&self, profile_name: &str) -> Option<String>;
}

/// Process environment and the platform keyring.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSource;

impl CredentialSource for SystemSource {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn keyring_password(&self, profile_name: &str) -> Option<String> {
        keyring::Entry::new(KEYRING_SERVICE, &keyring_key(profile_name))
            .ok()?
            .get_password()
            .ok()
    }
}

pub fn keyring_key(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

/// Store a profile password in the platform keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &keyring_key(profile_name))
        .map_err(|e| ConfigError::Keyring(format!("failed to access keyring: {e}")))?;
    entry
        .set_password(password)
        .map_err(|e| ConfigError::Keyring(format!("failed to store password: {e}")))
}

// ── Credential resolution ───────────────────────────────────────────

/// Username: profile, then `HETZNERROBOT_USERNAME`.
pub fn resolve_username(
    profile: &Profile,
    profile_name: &str,
    source: &impl CredentialSource,
) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| source.var(ENV_USERNAME))
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
            missing: "username",
        })
}

/// Password: `password_env`, then `HETZNERROBOT_PASSWORD`, then the
/// keyring, then plaintext in the profile.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
    source: &impl CredentialSource,
) -> Result<SecretString, ConfigError> {
    if let Some(pw) = profile.password_env.as_deref().and_then(|n| source.var(n)) {
        return Ok(SecretString::from(pw));
    }

    if let Some(pw) = source.var(ENV_PASSWORD) {
        return Ok(SecretString::from(pw));
    }

    if let Some(pw) = source.keyring_password(profile_name) {
        return Ok(SecretString::from(pw));
    }

    if let Some(pw) = profile.password.clone().filter(|p| !p.is_empty()) {
        return Ok(SecretString::from(pw));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
        missing: "password",
    })
}

/// Base URL: profile, then `HETZNERROBOT_URL`, then the public endpoint.
pub fn resolve_url(profile: &Profile, source: &impl CredentialSource) -> Result<Url, ConfigError> {
    let raw = profile
        .url
        .clone()
        .or_else(|| source.var(ENV_URL))
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

    raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `RobotConfig` from a profile, without CLI flag overrides.
pub fn profile_to_robot_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    source: &impl CredentialSource,
) -> Result<RobotConfig, ConfigError> {
    let url = resolve_url(profile, source)?;
    let username = resolve_username(profile, profile_name, source)?;
    let password = resolve_password(profile, profile_name, source)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));

    Ok(RobotConfig {
        url,
        username,
        password,
        tls,
        timeout,
    })
}
