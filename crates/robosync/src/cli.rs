//! Clap derive structures for the `robosync` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// robosync -- declarative Hetzner Robot firewalls and vSwitches
#[derive(Debug, Parser)]
#[command(
    name = "robosync",
    version,
    about = "Reconcile Hetzner Robot firewalls and vSwitches from declaration files",
    long_about = "Converges Hetzner Robot server firewalls and vSwitch memberships\n\
        to the state declared in YAML, JSON or TOML files.\n\n\
        Firewalls are replaced as a whole; vSwitch members are diffed by\n\
        server number and detached before new ones are attached.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "ROBOSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Webservice URL (overrides profile)
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Webservice username (overrides profile)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ROBOSYNC_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage server firewalls
    #[command(alias = "fw")]
    Firewall(FirewallArgs),

    /// Manage vSwitches and their member servers
    #[command(alias = "vs")]
    Vswitch(VswitchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Firewall ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FirewallArgs {
    #[command(subcommand)]
    pub command: FirewallCommand,
}

#[derive(Debug, Subcommand)]
pub enum FirewallCommand {
    /// Show the current firewall of a server
    Show {
        /// Server IP address
        server_ip: String,
    },

    /// Replace a server's firewall with the declared rule set
    Apply {
        /// Declaration file (.yaml, .yml, .json or .toml)
        file: PathBuf,

        /// Print the encoded request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Stop managing a firewall (the remote configuration is left in place)
    Delete {
        /// Server IP address
        server_ip: String,
    },
}

// ── vSwitch ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VswitchArgs {
    #[command(subcommand)]
    pub command: VswitchCommand,
}

#[derive(Debug, Subcommand)]
pub enum VswitchCommand {
    /// Show a vSwitch with its servers, subnets and cloud networks
    Show {
        /// vSwitch id
        id: String,
    },

    /// Create a vSwitch and attach the declared servers
    Create {
        /// Declaration file (.yaml, .yml, .json or .toml)
        file: PathBuf,
    },

    /// Converge an existing vSwitch to the declaration
    Apply {
        /// Declaration file (.yaml, .yml, .json or .toml)
        file: PathBuf,

        /// vSwitch id (overrides the `id` field of the file)
        #[arg(long)]
        id: Option<u64>,
    },

    /// Cancel a vSwitch immediately
    Delete {
        /// vSwitch id
        id: String,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive profile setup
    Init,

    /// Show the current configuration (secrets redacted)
    Show,

    /// List profile names
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a profile password in the system keyring
    SetPassword {
        /// Profile name (defaults to the active profile)
        name: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
