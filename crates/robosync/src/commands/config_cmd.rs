//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};
use secrecy::{ExposeSecret, SecretString};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output::{self, Styles};

// ── Helpers ─────────────────────────────────────────────────────────

/// Table view of the config: the file as it would be written, password
/// already masked by [`redacted`].
fn format_config(cfg: &Config) -> String {
    toml::to_string_pretty(cfg).unwrap_or_else(|e| format!("# could not render config: {e}"))
}

/// Copy of the config with plaintext passwords masked.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.password.is_some() {
            profile.password = Some("****".into());
        }
    }
    cfg
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_password() -> Result<SecretString, CliError> {
    let pass = Password::new()
        .with_prompt("Webservice password")
        .interact()
        .map_err(prompt_err)?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(pass))
}

/// Store the password in the keyring, or hand it back for the config file.
fn prompt_password_storage(
    profile_name: &str,
    password: &SecretString,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_password(profile_name, password.expose_secret())?;
        eprintln!("   Password stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(password.expose_secret().to_owned()))
    }
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: cfg.available_profiles(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let styles = Styles::for_mode(global.color);

    match args.command {
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("robosync configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let url: String = Input::new()
                .with_prompt("Webservice URL")
                .default(robosync_core::DEFAULT_BASE_URL.into())
                .validate_with(|input: &String| {
                    url::Url::parse(input).map(|_| ()).map_err(|e| e.to_string())
                })
                .interact_text()
                .map_err(prompt_err)?;

            let username: String = Input::new()
                .with_prompt("Webservice username")
                .interact_text()
                .map_err(prompt_err)?;
            if username.is_empty() {
                return Err(CliError::Validation {
                    field: "username".into(),
                    reason: "username cannot be empty".into(),
                });
            }

            let password = prompt_password()?;
            let password = prompt_password_storage(&profile_name, &password)?;

            let profile = Profile {
                url: (url != robosync_core::DEFAULT_BASE_URL).then_some(url),
                username: Some(username),
                password,
                ..Profile::default()
            };

            // Keep existing profiles; the new one becomes the default.
            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            output::print_status(
                &styles,
                &format!("Configuration written to {}", config_path.display()),
                global.quiet,
            );
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: robosync firewall show <server-ip>");
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let active = config::active_profile_name(global, &cfg);
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: robosync config init");
            } else {
                let listing = cfg
                    .profiles
                    .keys()
                    .map(|name| {
                        if *name == active {
                            format!("{name} *")
                        } else {
                            name.clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                output::print_output(&listing, global.quiet);
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_status(
                &styles,
                &format!("Default profile set to '{name}'"),
                global.quiet,
            );
            Ok(())
        }

        ConfigCommand::SetPassword { name } => {
            let cfg = config::load_config_or_default();
            let profile_name = name.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(&cfg, profile_name));
            }

            let password = prompt_password()?;
            config::store_password(&profile_name, password.expose_secret())?;
            output::print_status(
                &styles,
                &format!("Password stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}
