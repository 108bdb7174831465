// ── Capability notices ──

use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display};

/// A rule field dropped because the remote dialect cannot express it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DroppedField {
    SrcIp,
    DstIp,
}

/// Advisory produced when a declared rule was downgraded before sending.
///
/// Never an error: the operation proceeds with the field removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Rule name, or `"unnamed"` when the rule has none.
    pub rule: String,
    pub field: DroppedField,
}

impl Notice {
    pub fn summary(&self) -> String {
        format!("IPv6 rule '{}': {} field ignored", self.rule, self.field)
    }

    pub fn detail(&self) -> &'static str {
        match self.field {
            DroppedField::SrcIp => {
                "Hetzner Robot API does not support source IP filtering for IPv6 rules. \
                 The src_ip field will be ignored."
            }
            DroppedField::DstIp => {
                "Hetzner Robot API does not support destination IP filtering for IPv6 rules. \
                 The dst_ip field will be ignored."
            }
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
