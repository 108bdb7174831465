// ── vSwitch domain types ──

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A server attached to a vSwitch.
///
/// Only `server_number` is supplied by the caller; it is also the sole
/// diffing key. The remaining fields are filled in from remote reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub server_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_ipv6_net: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Member {
    pub fn new(server_number: u64) -> Self {
        Self {
            server_number,
            server_ip: None,
            server_ipv6_net: None,
            status: None,
        }
    }

    pub fn key(&self) -> u64 {
        self.server_number
    }
}

/// Subnet routed into a vSwitch. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub ip: String,
    pub mask: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Cloud network coupled to a vSwitch. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudNetwork {
    pub id: u64,
    pub ip: String,
    pub mask: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
}

/// Member identifiers must be unique within one declared set.
pub(crate) fn ensure_unique_members(members: &[Member]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(members.len());
    for member in members {
        if !seen.insert(member.key()) {
            return Err(CoreError::validation(format!(
                "server {} is listed more than once",
                member.server_number
            )));
        }
    }
    Ok(())
}

/// Declared or observed state of one vSwitch.
///
/// `id`, `cancelled`, `subnets` and `cloud_networks` are remote-populated;
/// they are ignored when the struct is used as a declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vlan: Option<u16>,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default)]
    pub servers: Vec<Member>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnets: Vec<Subnet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cloud_networks: Vec<CloudNetwork>,
}

impl SwitchConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_vlan(mut self, vlan: u16) -> Self {
        self.vlan = Some(vlan);
        self
    }

    pub fn with_server(mut self, server_number: u64) -> Self {
        self.servers.push(Member::new(server_number));
        self
    }

    /// Server numbers in declaration order.
    pub fn server_numbers(&self) -> Vec<u64> {
        self.servers.iter().map(Member::key).collect()
    }

    /// Reject declarations without a name or listing the same server twice.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(CoreError::validation("vswitch name must not be empty"));
        }
        ensure_unique_members(&self.servers)
    }

    /// True when both configs attach the same servers, ignoring order.
    pub fn same_members(&self, other: &Self) -> bool {
        let ours: HashSet<u64> = self.servers.iter().map(Member::key).collect();
        let theirs: HashSet<u64> = other.servers.iter().map(Member::key).collect();
        ours == theirs
    }
}
