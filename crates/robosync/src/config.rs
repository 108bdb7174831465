//! CLI configuration: thin wrapper around `robosync_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (`--url`, `--username`, `--timeout`, `--insecure`).

use std::time::Duration;

use robosync_config::{CredentialSource, SystemSource};
use robosync_core::{RobotConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use robosync_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_password,
};

pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Build a `RobotConfig` from config file, profile, environment and flags.
///
/// An absent profile is only an error when it was asked for by name;
/// otherwise the environment alone may supply the credentials.
pub fn resolve_robot_config(global: &GlobalOpts) -> Result<RobotConfig, CliError> {
    let cfg = load_config_or_default();
    resolve_with(global, &cfg, &SystemSource)
}

pub fn resolve_with(
    global: &GlobalOpts,
    cfg: &Config,
    source: &impl CredentialSource,
) -> Result<RobotConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: cfg.available_profiles(),
            });
        }
        None => Profile::default(),
    };

    // Flags beat profile values.
    if let Some(ref url) = global.url {
        profile.url = Some(url.clone());
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }

    let mut robot = robosync_config::profile_to_robot_config(
        &profile,
        &profile_name,
        &cfg.defaults,
        source,
    )?;

    if global.insecure {
        robot.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        robot.timeout = Duration::from_secs(secs);
    }

    tracing::debug!(
        profile = %profile_name,
        url = %robot.url,
        username = %robot.username,
        "resolved webservice configuration"
    );
    Ok(robot)
}
