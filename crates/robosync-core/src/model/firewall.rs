// ── Firewall domain types ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::address::ServerAddress;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RuleAction {
    Accept,
    Discard,
}

/// Address family of a rule. Governs which fields the remote accepts.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IpVersion {
    #[default]
    Ipv4,
    Ipv6,
}

/// One packet-filter rule.
///
/// Every field except `action` is optional; an empty string is treated the
/// same as an absent field everywhere in this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub ip_version: IpVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp_flags: Option<String>,
    pub action: RuleAction,
}

impl Rule {
    pub fn new(action: RuleAction) -> Self {
        Self {
            name: None,
            ip_version: IpVersion::default(),
            src_ip: None,
            src_port: None,
            dst_ip: None,
            dst_port: None,
            protocol: None,
            tcp_flags: None,
            action,
        }
    }

    pub fn accept() -> Self {
        Self::new(RuleAction::Accept)
    }

    pub fn discard() -> Self {
        Self::new(RuleAction::Discard)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_ip_version(mut self, ip_version: IpVersion) -> Self {
        self.ip_version = ip_version;
        self
    }

    pub fn with_src_ip(mut self, cidr: impl Into<String>) -> Self {
        self.src_ip = Some(cidr.into());
        self
    }

    pub fn with_src_port(mut self, range: impl Into<String>) -> Self {
        self.src_port = Some(range.into());
        self
    }

    pub fn with_dst_ip(mut self, cidr: impl Into<String>) -> Self {
        self.dst_ip = Some(cidr.into());
        self
    }

    pub fn with_dst_port(mut self, range: impl Into<String>) -> Self {
        self.dst_port = Some(range.into());
        self
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn with_tcp_flags(mut self, flags: impl Into<String>) -> Self {
        self.tcp_flags = Some(flags.into());
        self
    }

    /// Label used in notices and log lines.
    pub fn label(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("unnamed")
    }
}

/// The complete firewall declaration for one server.
///
/// Rule order is evaluation order and is preserved end to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub server_ip: ServerAddress,
    pub active: bool,
    pub whitelist_hos: bool,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(server_ip: ServerAddress) -> Self {
        Self {
            server_ip,
            active: false,
            whitelist_hos: false,
            rules: Vec::new(),
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn with_whitelist_hos(mut self, whitelist_hos: bool) -> Self {
        self.whitelist_hos = whitelist_hos;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Remote literal for the `active` flag.
    pub fn status(&self) -> &'static str {
        if self.active { "active" } else { "disabled" }
    }
}
