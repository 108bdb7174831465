// robosync-api: Async Rust client for the Hetzner Robot webservice

pub mod client;
pub mod error;
pub mod firewall;
pub mod models;
pub mod transport;
pub mod vswitch;

pub use client::{DEFAULT_BASE_URL, RobotClient};
pub use error::Error;
pub use models::{
    CloudNetworkRecord, FirewallRecord, FirewallRuleRecord, SubnetRecord, VSwitchRecord,
    VSwitchServerRecord,
};
pub use transport::{TlsMode, TransportConfig};

/// Ordered `application/x-www-form-urlencoded` field list.
///
/// The Robot webservice reads repeated and bracketed keys (`server[]`,
/// `rules[input][0][name]`) positionally, so pairs are kept in insertion
/// order rather than collected into a map.
pub type FormFields = [(String, String)];
