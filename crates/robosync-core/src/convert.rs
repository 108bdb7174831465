// ── API-to-domain type conversions ──
//
// Bridges raw `robosync_api` records into canonical `robosync_core::model`
// types. Empty strings become `None`, remote literals are parsed into
// enums, and missing optional data gets the declared defaults.

use robosync_api::{
    CloudNetworkRecord, FirewallRecord, FirewallRuleRecord, SubnetRecord, VSwitchRecord,
    VSwitchServerRecord,
};

use crate::error::CoreError;
use crate::model::{
    CloudNetwork, IpVersion, Member, Rule, RuleAction, RuleSet, ServerAddress, Subnet,
    SwitchConfig, non_empty,
};

// ── Firewall ───────────────────────────────────────────────────────

impl TryFrom<FirewallRuleRecord> for Rule {
    type Error = CoreError;

    fn try_from(r: FirewallRuleRecord) -> Result<Self, Self::Error> {
        let action = r
            .action
            .parse::<RuleAction>()
            .map_err(|_| CoreError::UnexpectedRemote {
                message: format!("unknown rule action '{}'", r.action),
            })?;

        let ip_version = match non_empty(r.ip_version) {
            None => IpVersion::Ipv4,
            Some(v) => v
                .parse::<IpVersion>()
                .map_err(|_| CoreError::UnexpectedRemote {
                    message: format!("unknown ip_version '{v}'"),
                })?,
        };

        Ok(Self {
            name: non_empty(r.name),
            ip_version,
            src_ip: non_empty(r.src_ip),
            src_port: non_empty(r.src_port),
            dst_ip: non_empty(r.dst_ip),
            dst_port: non_empty(r.dst_port),
            protocol: non_empty(r.protocol),
            tcp_flags: non_empty(r.tcp_flags),
            action,
        })
    }
}

/// Only input rules are mapped. The output chain is always the fixed
/// allow-all group the encoder appends.
impl TryFrom<FirewallRecord> for RuleSet {
    type Error = CoreError;

    fn try_from(f: FirewallRecord) -> Result<Self, Self::Error> {
        let server_ip: ServerAddress =
            f.server_ip
                .parse()
                .map_err(|_| CoreError::UnexpectedRemote {
                    message: format!("firewall bound to malformed address '{}'", f.server_ip),
                })?;

        let rules = f
            .rules
            .input
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            server_ip,
            active: f.status == "active",
            whitelist_hos: f.whitelist_hos,
            rules,
        })
    }
}

// ── vSwitch ────────────────────────────────────────────────────────

impl From<VSwitchServerRecord> for Member {
    fn from(s: VSwitchServerRecord) -> Self {
        Self {
            server_number: s.server_number,
            server_ip: non_empty(s.server_ip),
            server_ipv6_net: non_empty(s.server_ipv6_net),
            status: non_empty(s.status),
        }
    }
}

impl From<SubnetRecord> for Subnet {
    fn from(s: SubnetRecord) -> Self {
        Self {
            ip: s.ip,
            mask: s.mask,
            gateway: non_empty(s.gateway),
        }
    }
}

impl From<CloudNetworkRecord> for CloudNetwork {
    fn from(c: CloudNetworkRecord) -> Self {
        Self {
            id: c.id,
            ip: c.ip,
            mask: c.mask,
            gateway: non_empty(c.gateway),
        }
    }
}

impl From<VSwitchRecord> for SwitchConfig {
    fn from(v: VSwitchRecord) -> Self {
        Self {
            id: Some(v.id),
            name: non_empty(v.name),
            vlan: v.vlan,
            cancelled: v.cancelled,
            servers: v.server.into_iter().map(Member::from).collect(),
            subnets: v.subnet.into_iter().map(Subnet::from).collect(),
            cloud_networks: v.cloud_network.into_iter().map(CloudNetwork::from).collect(),
        }
    }
}
