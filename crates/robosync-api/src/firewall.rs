// Firewall endpoints
//
// The webservice has no incremental firewall update: every POST replaces
// the complete rule list and both top-level flags.

use tracing::debug;

use crate::FormFields;
use crate::client::RobotClient;
use crate::error::Error;
use crate::models::{FirewallEnvelope, FirewallRecord};

impl RobotClient {
    /// Fetch the firewall configuration bound to `server_ip`.
    pub async fn get_firewall(&self, server_ip: &str) -> Result<FirewallRecord, Error> {
        let url = self.endpoint_url(&format!("firewall/{server_ip}"))?;
        let envelope: FirewallEnvelope = self.get(url).await?;
        Ok(envelope.firewall)
    }

    /// Overwrite the firewall of `server_ip` with an already-encoded form.
    pub async fn set_firewall(&self, server_ip: &str, form: &FormFields) -> Result<(), Error> {
        let url = self.endpoint_url(&format!("firewall/{server_ip}"))?;
        self.post_form(url, form).await?;
        debug!(server_ip, "firewall replaced");
        Ok(())
    }
}
