// Raw wire types for the Robot webservice.
//
// Field names follow the JSON the webservice returns. Optional strings
// may arrive as `null`, missing, or `""`; normalization into domain types
// happens in `robosync-core`.

use serde::{Deserialize, Serialize};

/// Robot error envelope: `{"error":{"status":404,"code":"...","message":"..."}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub status: Option<u16>,
    pub code: Option<String>,
    pub message: Option<String>,
}

// ── Firewall ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct FirewallEnvelope {
    pub firewall: FirewallRecord,
}

/// Firewall configuration of one server, as returned by `GET /firewall/{ip}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirewallRecord {
    pub server_ip: String,
    #[serde(default)]
    pub server_number: Option<u64>,
    /// `"active"`, `"disabled"`, or `"in process"`.
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub whitelist_hos: bool,
    #[serde(default)]
    pub filter_ipv6: Option<bool>,
    #[serde(default)]
    pub rules: FirewallRulesRecord,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirewallRulesRecord {
    #[serde(default)]
    pub input: Vec<FirewallRuleRecord>,
    #[serde(default)]
    pub output: Vec<FirewallRuleRecord>,
}

/// One rule in the remote firewall dialect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirewallRuleRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub ip_version: Option<String>,
    #[serde(default)]
    pub src_ip: Option<String>,
    #[serde(default)]
    pub src_port: Option<String>,
    #[serde(default)]
    pub dst_ip: Option<String>,
    #[serde(default)]
    pub dst_port: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub tcp_flags: Option<String>,
    #[serde(default)]
    pub action: String,
}

// ── vSwitch ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum VSwitchEnvelope {
    Wrapped { vswitch: VSwitchRecord },
    Bare(VSwitchRecord),
}

impl VSwitchEnvelope {
    pub(crate) fn into_inner(self) -> VSwitchRecord {
        match self {
            Self::Wrapped { vswitch } | Self::Bare(vswitch) => vswitch,
        }
    }
}

/// A vSwitch with its attached servers, subnets, and cloud networks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VSwitchRecord {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub vlan: Option<u16>,
    #[serde(default, alias = "canceled")]
    pub cancelled: bool,
    #[serde(default)]
    pub server: Vec<VSwitchServerRecord>,
    #[serde(default)]
    pub subnet: Vec<SubnetRecord>,
    #[serde(default)]
    pub cloud_network: Vec<CloudNetworkRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VSwitchServerRecord {
    pub server_number: u64,
    #[serde(default)]
    pub server_ip: Option<String>,
    #[serde(default)]
    pub server_ipv6_net: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetRecord {
    pub ip: String,
    pub mask: u8,
    #[serde(default)]
    pub gateway: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudNetworkRecord {
    pub id: u64,
    pub ip: String,
    pub mask: u8,
    #[serde(default)]
    pub gateway: Option<String>,
}
