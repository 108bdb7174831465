// ── Domain model ──
//
// Canonical value types shared by the sanitizer, differencer, encoder and
// reconcilers. Only identifiers (server address, server number) cross
// resource boundaries.

pub mod address;
pub mod firewall;
pub mod notice;
pub mod vswitch;

pub use address::ServerAddress;
pub use firewall::{IpVersion, Rule, RuleAction, RuleSet};
pub use notice::{DroppedField, Notice};
pub use vswitch::{CloudNetwork, Member, Subnet, SwitchConfig};

/// Treat empty strings as absent.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

pub(crate) fn is_present(value: Option<&String>) -> bool {
    value.is_some_and(|s| !s.is_empty())
}
