//! Command dispatch for everything that talks to the webservice.

pub mod config_cmd;
pub mod firewall;
pub mod util;
pub mod vswitch;

use robosync_core::{FirewallReconciler, RobotBackend, VSwitchReconciler};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a remote command to its handler. Config and completions are
/// handled before a client exists and never reach this point.
pub async fn dispatch<B>(cmd: Command, backend: B, global: &GlobalOpts) -> Result<(), CliError>
where
    B: RobotBackend,
{
    match cmd {
        Command::Firewall(args) => {
            firewall::handle(&FirewallReconciler::new(backend), args, global).await
        }
        Command::Vswitch(args) => {
            vswitch::handle(&VSwitchReconciler::new(backend), args, global).await
        }
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
