//! Reconciliation engine between declared configuration and the Hetzner
//! Robot webservice.
//!
//! The crate is stateless: every operation receives its full input and
//! returns its full output, and the transport is injected rather than
//! owned globally.
//!
//! - **[`FirewallReconciler`]**: full-replace convergence of a server's
//!   packet-filter [`RuleSet`]. Rules pass through the capability
//!   [`sanitize`]r (IPv6 rules cannot filter on addresses) and the form
//!   [`encode`]r before a single apply call.
//!
//! - **[`VSwitchReconciler`]**: name/VLAN update plus membership
//!   convergence of a [`SwitchConfig`]. Membership changes are computed by
//!   the generic [`diff`] module and applied remove-then-add, with both
//!   outcomes reported independently.
//!
//! - **[`RobotBackend`]**: the fetch/apply seam. Implemented for
//!   [`robosync_api::RobotClient`]; tests substitute an in-memory double.

pub mod backend;
pub mod config;
pub mod convert;
pub mod diff;
pub mod encode;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod sanitize;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::RobotBackend;
pub use config::{RobotConfig, TlsVerification};
pub use diff::{SetDiff, diff_by_key};
pub use encode::{FormPayload, encode_rule_set};
pub use error::CoreError;
pub use reconcile::firewall::{FirewallOutcome, FirewallReconciler};
pub use reconcile::vswitch::{
    MembershipOutcome, VSwitchOutcome, VSwitchReconciler, reconcile_membership,
};
pub use sanitize::{SanitizedRuleSet, sanitize, sanitize_rule_set};

pub use robosync_api::DEFAULT_BASE_URL;

pub use model::{
    CloudNetwork, DroppedField, IpVersion, Member, Notice, Rule, RuleAction, RuleSet,
    ServerAddress, Subnet, SwitchConfig,
};
