// ── Firewall identity key ──

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The server address a firewall rule set is bound to.
///
/// One rule set exists per server, so this is the firewall's identity key.
/// Parsing rejects anything that is not a bare IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerAddress(IpAddr);

impl ServerAddress {
    pub fn new(ip: IpAddr) -> Self {
        Self(ip)
    }

    pub fn ip(&self) -> IpAddr {
        self.0
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServerAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<IpAddr>()
            .map(Self)
            .map_err(|_| CoreError::validation(format!("malformed server address '{s}'")))
    }
}

impl TryFrom<String> for ServerAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ServerAddress> for String {
    fn from(addr: ServerAddress) -> Self {
        addr.to_string()
    }
}

impl From<IpAddr> for ServerAddress {
    fn from(ip: IpAddr) -> Self {
        Self(ip)
    }
}
