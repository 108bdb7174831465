// vSwitch endpoints

use tracing::debug;

use crate::client::{RobotClient, decode};
use crate::error::Error;
use crate::models::{VSwitchEnvelope, VSwitchRecord};

fn name_vlan_form(name: &str, vlan: Option<u16>) -> Vec<(String, String)> {
    let mut form = vec![("name".to_owned(), name.to_owned())];
    if let Some(vlan) = vlan {
        form.push(("vlan".to_owned(), vlan.to_string()));
    }
    form
}

fn server_form(server_numbers: &[u64]) -> Vec<(String, String)> {
    server_numbers
        .iter()
        .map(|n| ("server[]".to_owned(), n.to_string()))
        .collect()
}

impl RobotClient {
    /// Fetch one vSwitch with its attached servers.
    pub async fn get_vswitch(&self, id: u64) -> Result<VSwitchRecord, Error> {
        let url = self.endpoint_url(&format!("vswitch/{id}"))?;
        let envelope: VSwitchEnvelope = self.get(url).await?;
        Ok(envelope.into_inner())
    }

    /// Create a vSwitch. The response carries the remote-assigned id.
    pub async fn create_vswitch(
        &self,
        name: &str,
        vlan: Option<u16>,
    ) -> Result<VSwitchRecord, Error> {
        let url = self.endpoint_url("vswitch")?;
        let body = self.post_form(url, &name_vlan_form(name, vlan)).await?;
        let record = decode::<VSwitchEnvelope>(&body)?.into_inner();
        debug!(id = record.id, "vswitch created");
        Ok(record)
    }

    /// Change name and VLAN of an existing vSwitch.
    pub async fn update_vswitch(&self, id: u64, name: &str, vlan: Option<u16>) -> Result<(), Error> {
        let url = self.endpoint_url(&format!("vswitch/{id}"))?;
        self.post_form(url, &name_vlan_form(name, vlan)).await?;
        Ok(())
    }

    /// Cancel a vSwitch effective immediately.
    pub async fn cancel_vswitch(&self, id: u64) -> Result<(), Error> {
        let url = self.endpoint_url(&format!("vswitch/{id}"))?;
        let form = [("cancellation_date".to_owned(), "now".to_owned())];
        self.delete_form(url, &form).await?;
        debug!(id, "vswitch cancelled");
        Ok(())
    }

    /// Attach servers (by server number) to a vSwitch.
    pub async fn add_vswitch_servers(&self, id: u64, server_numbers: &[u64]) -> Result<(), Error> {
        let url = self.endpoint_url(&format!("vswitch/{id}/server"))?;
        self.post_form(url, &server_form(server_numbers)).await?;
        Ok(())
    }

    /// Detach servers (by server number) from a vSwitch.
    pub async fn remove_vswitch_servers(
        &self,
        id: u64,
        server_numbers: &[u64],
    ) -> Result<(), Error> {
        let url = self.endpoint_url(&format!("vswitch/{id}/server"))?;
        self.delete_form(url, &server_form(server_numbers)).await?;
        Ok(())
    }
}
