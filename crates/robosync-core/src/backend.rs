// ── Remote collaborator seam ──
//
// Reconcilers talk to the webservice only through `RobotBackend`. The HTTP
// client implements it directly; tests plug in an in-memory recorder.

use std::future::Future;
use std::sync::Arc;

use robosync_api::{FirewallRecord, RobotClient, VSwitchRecord};

use crate::encode::FormPayload;
use crate::model::{Member, ServerAddress};

/// Fetch/apply operations the reconcilers need from the remote.
///
/// Errors are the transport's own; the reconcilers decide how to wrap them.
pub trait RobotBackend: Send + Sync {
    fn fetch_firewall(
        &self,
        server_ip: &ServerAddress,
    ) -> impl Future<Output = Result<FirewallRecord, robosync_api::Error>> + Send;

    fn apply_firewall(
        &self,
        server_ip: &ServerAddress,
        form: &FormPayload,
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send;

    fn fetch_vswitch(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<VSwitchRecord, robosync_api::Error>> + Send;

    fn create_vswitch(
        &self,
        name: &str,
        vlan: Option<u16>,
    ) -> impl Future<Output = Result<VSwitchRecord, robosync_api::Error>> + Send;

    fn update_vswitch(
        &self,
        id: u64,
        name: &str,
        vlan: Option<u16>,
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send;

    fn cancel_vswitch(&self, id: u64)
    -> impl Future<Output = Result<(), robosync_api::Error>> + Send;

    fn add_vswitch_servers(
        &self,
        id: u64,
        members: &[Member],
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send;

    fn remove_vswitch_servers(
        &self,
        id: u64,
        members: &[Member],
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send;
}

fn server_numbers(members: &[Member]) -> Vec<u64> {
    members.iter().map(Member::key).collect()
}

impl RobotBackend for RobotClient {
    async fn fetch_firewall(
        &self,
        server_ip: &ServerAddress,
    ) -> Result<FirewallRecord, robosync_api::Error> {
        self.get_firewall(&server_ip.to_string()).await
    }

    async fn apply_firewall(
        &self,
        server_ip: &ServerAddress,
        form: &FormPayload,
    ) -> Result<(), robosync_api::Error> {
        self.set_firewall(&server_ip.to_string(), form.as_fields())
            .await
    }

    async fn fetch_vswitch(&self, id: u64) -> Result<VSwitchRecord, robosync_api::Error> {
        self.get_vswitch(id).await
    }

    async fn create_vswitch(
        &self,
        name: &str,
        vlan: Option<u16>,
    ) -> Result<VSwitchRecord, robosync_api::Error> {
        RobotClient::create_vswitch(self, name, vlan).await
    }

    async fn update_vswitch(
        &self,
        id: u64,
        name: &str,
        vlan: Option<u16>,
    ) -> Result<(), robosync_api::Error> {
        RobotClient::update_vswitch(self, id, name, vlan).await
    }

    async fn cancel_vswitch(&self, id: u64) -> Result<(), robosync_api::Error> {
        RobotClient::cancel_vswitch(self, id).await
    }

    async fn add_vswitch_servers(
        &self,
        id: u64,
        members: &[Member],
    ) -> Result<(), robosync_api::Error> {
        RobotClient::add_vswitch_servers(self, id, &server_numbers(members)).await
    }

    async fn remove_vswitch_servers(
        &self,
        id: u64,
        members: &[Member],
    ) -> Result<(), robosync_api::Error> {
        RobotClient::remove_vswitch_servers(self, id, &server_numbers(members)).await
    }
}

impl<B: RobotBackend> RobotBackend for Arc<B> {
    fn fetch_firewall(
        &self,
        server_ip: &ServerAddress,
    ) -> impl Future<Output = Result<FirewallRecord, robosync_api::Error>> + Send {
        (**self).fetch_firewall(server_ip)
    }

    fn apply_firewall(
        &self,
        server_ip: &ServerAddress,
        form: &FormPayload,
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send {
        (**self).apply_firewall(server_ip, form)
    }

    fn fetch_vswitch(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<VSwitchRecord, robosync_api::Error>> + Send {
        (**self).fetch_vswitch(id)
    }

    fn create_vswitch(
        &self,
        name: &str,
        vlan: Option<u16>,
    ) -> impl Future<Output = Result<VSwitchRecord, robosync_api::Error>> + Send {
        (**self).create_vswitch(name, vlan)
    }

    fn update_vswitch(
        &self,
        id: u64,
        name: &str,
        vlan: Option<u16>,
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send {
        (**self).update_vswitch(id, name, vlan)
    }

    fn cancel_vswitch(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send {
        (**self).cancel_vswitch(id)
    }

    fn add_vswitch_servers(
        &self,
        id: u64,
        members: &[Member],
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send {
        (**self).add_vswitch_servers(id, members)
    }

    fn remove_vswitch_servers(
        &self,
        id: u64,
        members: &[Member],
    ) -> impl Future<Output = Result<(), robosync_api::Error>> + Send {
        (**self).remove_vswitch_servers(id, members)
    }
}
