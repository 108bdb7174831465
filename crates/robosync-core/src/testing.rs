// In-memory `RobotBackend` that records every call.
#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use robosync_api::{Error, FirewallRecord, VSwitchRecord, VSwitchServerRecord};

use crate::backend::RobotBackend;
use crate::encode::FormPayload;
use crate::model::{Member, ServerAddress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    FetchFirewall(String),
    ApplyFirewall { server_ip: String, form: FormPayload },
    FetchVSwitch(u64),
    CreateVSwitch { name: String, vlan: Option<u16> },
    UpdateVSwitch { id: u64, name: String, vlan: Option<u16> },
    CancelVSwitch(u64),
    AddServers { id: u64, servers: Vec<u64> },
    RemoveServers { id: u64, servers: Vec<u64> },
}

#[derive(Debug, Default)]
pub(crate) struct Failures {
    pub apply_firewall: bool,
    pub update_vswitch: bool,
    pub add_servers: bool,
    pub remove_servers: bool,
    pub fetch_vswitch: bool,
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    firewall: Option<FirewallRecord>,
    vswitch: Option<VSwitchRecord>,
    fail: Failures,
}

#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    state: Mutex<State>,
}

pub(crate) const CREATED_ID: u64 = 4321;

fn server_error() -> Error {
    Error::Api {
        status: 500,
        code: Some("INTERNAL_ERROR".into()),
        message: "boom".into(),
    }
}

fn not_found(code: &str) -> Error {
    Error::Api {
        status: 404,
        code: Some(code.into()),
        message: "not found".into(),
    }
}

fn numbers(members: &[Member]) -> Vec<u64> {
    members.iter().map(Member::key).collect()
}

impl MockBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_firewall(self, record: FirewallRecord) -> Self {
        self.state.lock().unwrap().firewall = Some(record);
        self
    }

    pub(crate) fn with_vswitch(self, record: VSwitchRecord) -> Self {
        self.state.lock().unwrap().vswitch = Some(record);
        self
    }

    pub(crate) fn failing(self, configure: impl FnOnce(&mut Failures)) -> Self {
        configure(&mut self.state.lock().unwrap().fail);
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls that change remote state.
    pub(crate) fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::FetchFirewall(_) | Call::FetchVSwitch(_)))
            .collect()
    }

    pub(crate) fn vswitch(&self) -> Option<VSwitchRecord> {
        self.state.lock().unwrap().vswitch.clone()
    }

    fn record(&self, call: Call) -> std::sync::MutexGuard<'_, State> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

impl RobotBackend for MockBackend {
    async fn fetch_firewall(&self, server_ip: &ServerAddress) -> Result<FirewallRecord, Error> {
        let state = self.record(Call::FetchFirewall(server_ip.to_string()));
        state
            .firewall
            .clone()
            .ok_or_else(|| not_found("FIREWALL_NOT_FOUND"))
    }

    async fn apply_firewall(
        &self,
        server_ip: &ServerAddress,
        form: &FormPayload,
    ) -> Result<(), Error> {
        let state = self.record(Call::ApplyFirewall {
            server_ip: server_ip.to_string(),
            form: form.clone(),
        });
        if state.fail.apply_firewall {
            return Err(server_error());
        }
        Ok(())
    }

    async fn fetch_vswitch(&self, id: u64) -> Result<VSwitchRecord, Error> {
        let state = self.record(Call::FetchVSwitch(id));
        if state.fail.fetch_vswitch {
            return Err(server_error());
        }
        state
            .vswitch
            .clone()
            .filter(|v| v.id == id)
            .ok_or_else(|| not_found("VSWITCH_NOT_FOUND"))
    }

    async fn create_vswitch(&self, name: &str, vlan: Option<u16>) -> Result<VSwitchRecord, Error> {
        let mut state = self.record(Call::CreateVSwitch {
            name: name.to_owned(),
            vlan,
        });
        let record = VSwitchRecord {
            id: CREATED_ID,
            name: Some(name.to_owned()),
            vlan,
            ..VSwitchRecord::default()
        };
        state.vswitch = Some(record.clone());
        Ok(record)
    }

    async fn update_vswitch(&self, id: u64, name: &str, vlan: Option<u16>) -> Result<(), Error> {
        let mut state = self.record(Call::UpdateVSwitch {
            id,
            name: name.to_owned(),
            vlan,
        });
        if state.fail.update_vswitch {
            return Err(server_error());
        }
        if let Some(v) = state.vswitch.as_mut() {
            v.name = Some(name.to_owned());
            v.vlan = vlan;
        }
        Ok(())
    }

    async fn cancel_vswitch(&self, id: u64) -> Result<(), Error> {
        let mut state = self.record(Call::CancelVSwitch(id));
        if let Some(v) = state.vswitch.as_mut() {
            v.cancelled = true;
        }
        Ok(())
    }

    async fn add_vswitch_servers(&self, id: u64, members: &[Member]) -> Result<(), Error> {
        let mut state = self.record(Call::AddServers {
            id,
            servers: numbers(members),
        });
        if state.fail.add_servers {
            return Err(server_error());
        }
        if let Some(v) = state.vswitch.as_mut() {
            v.server.extend(members.iter().map(|m| VSwitchServerRecord {
                server_number: m.server_number,
                status: Some("processing".into()),
                ..VSwitchServerRecord::default()
            }));
        }
        Ok(())
    }

    async fn remove_vswitch_servers(&self, id: u64, members: &[Member]) -> Result<(), Error> {
        let mut state = self.record(Call::RemoveServers {
            id,
            servers: numbers(members),
        });
        if state.fail.remove_servers {
            return Err(server_error());
        }
        let gone = numbers(members);
        if let Some(v) = state.vswitch.as_mut() {
            v.server.retain(|s| !gone.contains(&s.server_number));
        }
        Ok(())
    }
}

/// A remote vSwitch record with the given attached servers.
pub(crate) fn vswitch_record(id: u64, servers: &[u64]) -> VSwitchRecord {
    VSwitchRecord {
        id,
        name: Some("backend".into()),
        vlan: Some(4000),
        server: servers
            .iter()
            .map(|&n| VSwitchServerRecord {
                server_number: n,
                status: Some("ready".into()),
                ..VSwitchServerRecord::default()
            })
            .collect(),
        ..VSwitchRecord::default()
    }
}
