//! Firewall command handlers.

use std::path::Path;

use robosync_core::{
    FirewallReconciler, FormPayload, RobotBackend, Rule, RuleSet, ServerAddress,
    encode_rule_set, sanitize_rule_set,
};
use tabled::Tabled;

use crate::cli::{FirewallArgs, FirewallCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Styles};

use super::util;

// ── Rule table row ──────────────────────────────────────────────────

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "IP")]
    ip_version: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Destination")]
    destination: String,
    #[tabled(rename = "TCP Flags")]
    tcp_flags: String,
}

fn endpoint(ip: Option<&str>, port: Option<&str>) -> String {
    match (ip, port) {
        (None, None) => "any".into(),
        (Some(ip), None) => ip.to_owned(),
        (None, Some(port)) => format!("*:{port}"),
        (Some(ip), Some(port)) => format!("{ip}:{port}"),
    }
}

impl RuleRow {
    fn new(position: usize, rule: &Rule) -> Self {
        Self {
            position,
            name: rule.label().to_owned(),
            ip_version: rule.ip_version.to_string(),
            action: rule.action.to_string(),
            protocol: output::or_dash(rule.protocol.as_deref()),
            source: endpoint(rule.src_ip.as_deref(), rule.src_port.as_deref()),
            destination: endpoint(rule.dst_ip.as_deref(), rule.dst_port.as_deref()),
            tcp_flags: output::or_dash(rule.tcp_flags.as_deref()),
        }
    }
}

fn rule_set_detail(set: &RuleSet) -> String {
    let header = [
        format!("Server:        {}", set.server_ip),
        format!("Status:        {}", set.status()),
        format!("Whitelist HOS: {}", set.whitelist_hos),
        format!("Rules:         {}", set.rules.len()),
    ]
    .join("\n");

    if set.rules.is_empty() {
        return header;
    }
    let rows: Vec<RuleRow> = set
        .rules
        .iter()
        .enumerate()
        .map(|(i, rule)| RuleRow::new(i + 1, rule))
        .collect();
    format!("{header}\n\n{}", output::render_table(&rows))
}

fn payload_detail(payload: &FormPayload) -> String {
    payload
        .as_fields()
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_server(raw: &str) -> Result<ServerAddress, CliError> {
    raw.parse::<ServerAddress>().map_err(CliError::from)
}

// ── Handlers ────────────────────────────────────────────────────────

/// Sanitize and encode a declaration without contacting the webservice.
pub fn dry_run(file: &Path, global: &GlobalOpts) -> Result<(), CliError> {
    let styles = Styles::for_mode(global.color);
    let desired: RuleSet = util::read_declaration(file)?;
    tracing::debug!(server_ip = %desired.server_ip, "dry run, nothing is sent");

    let (sanitized, notices) = sanitize_rule_set(desired);
    output::print_notices(&styles, &notices);
    let payload = encode_rule_set(&sanitized);
    let out = output::render_single(global.output, &payload, payload_detail, |p| {
        p.keys().collect::<Vec<_>>().join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle<B: RobotBackend>(
    reconciler: &FirewallReconciler<B>,
    args: FirewallArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let styles = Styles::for_mode(global.color);

    match args.command {
        FirewallCommand::Show { server_ip } => {
            let set = reconciler.import(&server_ip).await?;
            let out = output::render_single(global.output, &set, rule_set_detail, |s| {
                s.server_ip.to_string()
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FirewallCommand::Apply { file, dry_run } => {
            if dry_run {
                return self::dry_run(&file, global);
            }
            let desired: RuleSet = util::read_declaration(&file)?;
            let server_ip = desired.server_ip;
            let old = match reconciler.read(&server_ip).await {
                Ok(old) => Some(old),
                Err(e) if e.is_not_found() => {
                    tracing::info!(%server_ip, "no firewall recorded yet, creating");
                    None
                }
                Err(e) => return Err(e.into()),
            };
            let outcome = reconciler.reconcile(old.as_ref(), desired).await?;

            output::print_notices(&styles, &outcome.notices);
            let out = output::render_single(
                global.output,
                &outcome.rule_set,
                rule_set_detail,
                |s| s.server_ip.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            output::print_status(
                &styles,
                &format!(
                    "Firewall of {server_ip} replaced ({} rules, {})",
                    outcome.rule_set.rules.len(),
                    outcome.rule_set.status()
                ),
                global.quiet,
            );
            Ok(())
        }

        FirewallCommand::Delete { server_ip } => {
            let server_ip = parse_server(&server_ip)?;
            reconciler.delete(&server_ip);
            output::print_status(
                &styles,
                &format!(
                    "Firewall of {server_ip} is no longer managed; the remote rules are unchanged"
                ),
                global.quiet,
            );
            Ok(())
        }
    }
}
