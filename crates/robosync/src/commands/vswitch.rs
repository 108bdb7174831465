//! vSwitch command handlers.

use robosync_core::{
    CloudNetwork, Member, MembershipOutcome, RobotBackend, Subnet, SwitchConfig, VSwitchOutcome,
    VSwitchReconciler,
};
use tabled::Tabled;

use crate::cli::{GlobalOpts, VswitchArgs, VswitchCommand};
use crate::error::CliError;
use crate::output::{self, Styles};

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MemberRow {
    #[tabled(rename = "Server")]
    server_number: u64,
    #[tabled(rename = "IPv4")]
    server_ip: String,
    #[tabled(rename = "IPv6 Net")]
    server_ipv6_net: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Member> for MemberRow {
    fn from(m: &Member) -> Self {
        Self {
            server_number: m.server_number,
            server_ip: output::or_dash(m.server_ip.as_deref()),
            server_ipv6_net: output::or_dash(m.server_ipv6_net.as_deref()),
            status: output::or_dash(m.status.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Network")]
    network: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
}

impl From<&Subnet> for NetworkRow {
    fn from(s: &Subnet) -> Self {
        Self {
            kind: "subnet",
            network: format!("{}/{}", s.ip, s.mask),
            gateway: output::or_dash(s.gateway.as_deref()),
        }
    }
}

impl From<&CloudNetwork> for NetworkRow {
    fn from(c: &CloudNetwork) -> Self {
        Self {
            kind: "cloud",
            network: format!("{}/{} (#{})", c.ip, c.mask, c.id),
            gateway: output::or_dash(c.gateway.as_deref()),
        }
    }
}

fn switch_detail(switch: &SwitchConfig) -> String {
    let mut sections = vec![
        [
            format!(
                "ID:        {}",
                switch.id.map_or_else(|| "-".into(), |id| id.to_string())
            ),
            format!("Name:      {}", output::or_dash(switch.name.as_deref())),
            format!(
                "VLAN:      {}",
                switch.vlan.map_or_else(|| "-".into(), |v| v.to_string())
            ),
            format!("Cancelled: {}", switch.cancelled),
        ]
        .join("\n"),
    ];

    if !switch.servers.is_empty() {
        let rows: Vec<MemberRow> = switch.servers.iter().map(MemberRow::from).collect();
        sections.push(output::render_table(&rows));
    }

    let networks: Vec<NetworkRow> = switch
        .subnets
        .iter()
        .map(NetworkRow::from)
        .chain(switch.cloud_networks.iter().map(NetworkRow::from))
        .collect();
    if !networks.is_empty() {
        sections.push(output::render_table(&networks));
    }

    sections.join("\n\n")
}

fn switch_id(switch: &SwitchConfig) -> String {
    switch.id.map(|id| id.to_string()).unwrap_or_default()
}

fn numbers(members: &[Member]) -> String {
    members
        .iter()
        .map(|m| m.server_number.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Summarize a membership step on stderr. Failed sides are reported
/// individually; the caller turns them into an exit status afterwards.
fn report_membership(styles: &Styles, membership: &MembershipOutcome, quiet: bool) {
    let diff = &membership.diff;
    match &membership.removal {
        Some(Ok(())) => output::print_status(
            styles,
            &format!("Detached servers {}", numbers(&diff.to_remove)),
            quiet,
        ),
        Some(Err(e)) => output::print_failure(
            styles,
            &format!("detaching servers {} failed: {e}", numbers(&diff.to_remove)),
        ),
        None => {}
    }
    match &membership.addition {
        Some(Ok(())) => output::print_status(
            styles,
            &format!("Attached servers {}", numbers(&diff.to_add)),
            quiet,
        ),
        Some(Err(e)) => output::print_failure(
            styles,
            &format!("attaching servers {} failed: {e}", numbers(&diff.to_add)),
        ),
        None => {}
    }
}

/// Print the re-read switch, then fail if membership was only partly applied.
fn finish(outcome: VSwitchOutcome, global: &GlobalOpts, styles: &Styles) -> Result<(), CliError> {
    if let Some(ref membership) = outcome.membership {
        report_membership(styles, membership, global.quiet);
    }
    let out = output::render_single(global.output, &outcome.switch, switch_detail, switch_id)?;
    output::print_output(&out, global.quiet);
    outcome.into_result()?;
    Ok(())
}

fn parse_id(raw: &str) -> Result<u64, CliError> {
    raw.trim().parse().map_err(|_| CliError::Validation {
        field: "id".into(),
        reason: format!("'{raw}' is not a vSwitch id"),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle<B: RobotBackend>(
    reconciler: &VSwitchReconciler<B>,
    args: VswitchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let styles = Styles::for_mode(global.color);

    match args.command {
        VswitchCommand::Show { id } => {
            let switch = reconciler.import(&id).await?;
            let out = output::render_single(global.output, &switch, switch_detail, switch_id)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        VswitchCommand::Create { file } => {
            let desired: SwitchConfig = util::read_declaration(&file)?;
            let outcome = reconciler.create(desired).await?;
            output::print_status(
                &styles,
                &format!("Created vSwitch {}", switch_id(&outcome.switch)),
                global.quiet,
            );
            finish(outcome, global, &styles)
        }

        VswitchCommand::Apply { file, id } => {
            let mut desired: SwitchConfig = util::read_declaration(&file)?;
            desired.id = id.or(desired.id);
            let id = desired.id.ok_or_else(|| CliError::Validation {
                field: "id".into(),
                reason: "pass --id or set `id` in the declaration; \
                         use `vswitch create` for new switches"
                    .into(),
            })?;

            let old = reconciler.read(id).await?;
            let outcome = reconciler.update(&old, desired).await?;
            if outcome.membership.is_none() {
                tracing::debug!(id, "membership already matches");
            }
            output::print_status(&styles, &format!("Updated vSwitch {id}"), global.quiet);
            finish(outcome, global, &styles)
        }

        VswitchCommand::Delete { id } => {
            let id = parse_id(&id)?;
            if !util::confirm(
                "vswitch delete",
                &format!("Cancel vSwitch {id} immediately?"),
                global.yes,
            )? {
                return Ok(());
            }
            reconciler.delete(id).await?;
            output::print_status(&styles, &format!("Cancelled vSwitch {id}"), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_includes_members_and_networks() {
        let mut switch = SwitchConfig::new("backend").with_vlan(4000).with_server(321);
        switch.id = Some(7);
        switch.subnets.push(Subnet {
            ip: "10.0.2.0".into(),
            mask: 24,
            gateway: Some("10.0.2.1".into()),
        });
        let text = switch_detail(&switch);
        assert!(text.contains("VLAN:      4000"));
        assert!(text.contains("321"));
        assert!(text.contains("10.0.2.0/24"));
    }

    #[test]
    fn ids_must_be_numeric() {
        assert!(matches!(parse_id(" 42 "), Ok(42)));
        assert!(matches!(parse_id("abc"), Err(CliError::Validation { .. })));
    }
}
