// ── vSwitch reconciler ──
//
// Name and VLAN are pushed with an unconditional update call. Membership
// is diffed by server number and applied remove-then-add; the two calls
// succeed or fail independently and both results are kept.

use tracing::{debug, info, warn};

use crate::backend::RobotBackend;
use crate::diff::{SetDiff, diff_by_key};
use crate::error::CoreError;
use crate::model::vswitch::ensure_unique_members;
use crate::model::{Member, SwitchConfig};

/// Diff member lists by server number.
pub fn reconcile_membership(old: &[Member], new: &[Member]) -> SetDiff<Member> {
    diff_by_key(old, new, Member::key)
}

/// Outcome of one membership apply.
///
/// `removal` and `addition` are `None` when there was nothing to send, so
/// no call was made.
#[derive(Debug)]
pub struct MembershipOutcome {
    pub diff: SetDiff<Member>,
    pub removal: Option<Result<(), CoreError>>,
    pub addition: Option<Result<(), CoreError>>,
}

impl MembershipOutcome {
    pub fn is_complete(&self) -> bool {
        !matches!(self.removal, Some(Err(_))) && !matches!(self.addition, Some(Err(_)))
    }

    /// Collapse into a single result. Any failed side yields
    /// [`CoreError::PartialApply`] carrying both sides.
    pub fn into_result(self) -> Result<SetDiff<Member>, CoreError> {
        let removal = self.removal.and_then(Result::err).map(Box::new);
        let addition = self.addition.and_then(Result::err).map(Box::new);
        if removal.is_none() && addition.is_none() {
            Ok(self.diff)
        } else {
            Err(CoreError::PartialApply { removal, addition })
        }
    }
}

/// Result of a create or update: the re-read remote state plus what the
/// membership step did, if it ran.
#[derive(Debug)]
pub struct VSwitchOutcome {
    pub switch: SwitchConfig,
    pub membership: Option<MembershipOutcome>,
}

impl VSwitchOutcome {
    pub fn is_complete(&self) -> bool {
        self.membership
            .as_ref()
            .is_none_or(MembershipOutcome::is_complete)
    }

    /// The switch state, or [`CoreError::PartialApply`] if membership
    /// failed on either side.
    pub fn into_result(self) -> Result<SwitchConfig, CoreError> {
        if let Some(membership) = self.membership {
            membership.into_result()?;
        }
        Ok(self.switch)
    }
}

pub struct VSwitchReconciler<B> {
    backend: B,
}

impl<B: RobotBackend> VSwitchReconciler<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Create the switch, then attach every declared member.
    pub async fn create(&self, desired: SwitchConfig) -> Result<VSwitchOutcome, CoreError> {
        desired.validate()?;

        let name = desired.name.as_deref().unwrap_or_default();
        let record = self.backend.create_vswitch(name, desired.vlan).await?;
        let id = record.id;
        info!(id, name, vlan = ?desired.vlan, "vswitch created");

        let membership = if desired.servers.is_empty() {
            None
        } else {
            Some(self.apply_membership(id, &[], &desired.servers).await?)
        };
        log_incomplete(id, membership.as_ref());

        let switch = self.read(id).await?;
        Ok(VSwitchOutcome { switch, membership })
    }

    /// Fetch and normalize the current remote state. Nothing is cached.
    pub async fn read(&self, id: u64) -> Result<SwitchConfig, CoreError> {
        let record = self
            .backend
            .fetch_vswitch(id)
            .await
            .map_err(|e| CoreError::from_fetch(e, "vswitch", id.to_string()))?;
        Ok(SwitchConfig::from(record))
    }

    /// Adopt an existing switch by its numeric id.
    pub async fn import(&self, raw_id: &str) -> Result<SwitchConfig, CoreError> {
        let id = raw_id
            .trim()
            .parse::<u64>()
            .map_err(|_| CoreError::validation(format!("malformed vswitch id '{raw_id}'")))?;
        self.read(id).await
    }

    /// Converge the remote switch from `old` to `desired`.
    ///
    /// A failed name/VLAN update aborts before membership is touched.
    /// Membership failures do not abort; they are reported in the
    /// outcome alongside the re-read state.
    pub async fn update(
        &self,
        old: &SwitchConfig,
        desired: SwitchConfig,
    ) -> Result<VSwitchOutcome, CoreError> {
        let id = match (old.id, desired.id) {
            (Some(current), Some(declared)) if current != declared => {
                return Err(CoreError::validation(format!(
                    "vswitch id changed from {current} to {declared}; \
                     a declaration cannot move to another switch"
                )));
            }
            (Some(id), _) | (None, Some(id)) => id,
            (None, None) => {
                return Err(CoreError::validation(
                    "vswitch id is unknown; create it first",
                ));
            }
        };
        desired.validate()?;

        let name = desired.name.as_deref().unwrap_or_default();
        self.backend
            .update_vswitch(id, name, desired.vlan)
            .await?;
        debug!(id, name, vlan = ?desired.vlan, "vswitch name/vlan submitted");

        let membership = if old.same_members(&desired) {
            None
        } else {
            Some(
                self.apply_membership(id, &old.servers, &desired.servers)
                    .await?,
            )
        };
        log_incomplete(id, membership.as_ref());

        let switch = self.read(id).await?;
        Ok(VSwitchOutcome { switch, membership })
    }

    /// Remove, then add. The add call is made even when the remove call
    /// failed. Empty sides issue no call.
    ///
    /// A duplicate server in `new` is a validation error and nothing is sent.
    pub async fn apply_membership(
        &self,
        id: u64,
        old: &[Member],
        new: &[Member],
    ) -> Result<MembershipOutcome, CoreError> {
        ensure_unique_members(new)?;
        let diff = reconcile_membership(old, new);
        debug!(
            id,
            add = ?diff.to_add.iter().map(Member::key).collect::<Vec<_>>(),
            remove = ?diff.to_remove.iter().map(Member::key).collect::<Vec<_>>(),
            "membership diff"
        );

        let removal = if diff.to_remove.is_empty() {
            None
        } else {
            let result = self
                .backend
                .remove_vswitch_servers(id, &diff.to_remove)
                .await
                .map_err(CoreError::from);
            if result.is_ok() {
                info!(id, count = diff.to_remove.len(), "servers detached");
            }
            Some(result)
        };

        let addition = if diff.to_add.is_empty() {
            None
        } else {
            let result = self
                .backend
                .add_vswitch_servers(id, &diff.to_add)
                .await
                .map_err(CoreError::from);
            if result.is_ok() {
                info!(id, count = diff.to_add.len(), "servers attached");
            }
            Some(result)
        };

        Ok(MembershipOutcome {
            diff,
            removal,
            addition,
        })
    }

    /// Cancel the switch, effective immediately.
    pub async fn delete(&self, id: u64) -> Result<(), CoreError> {
        self.backend.cancel_vswitch(id).await?;
        info!(id, "vswitch cancelled");
        Ok(())
    }
}

fn log_incomplete(id: u64, membership: Option<&MembershipOutcome>) {
    let Some(outcome) = membership else { return };
    if let Some(Err(e)) = &outcome.removal {
        warn!(id, error = %e, "detaching servers failed");
    }
    if let Some(Err(e)) = &outcome.addition {
        warn!(id, error = %e, "attaching servers failed");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::testing::{CREATED_ID, Call, MockBackend, vswitch_record};

    fn members(numbers: &[u64]) -> Vec<Member> {
        numbers.iter().copied().map(Member::new).collect()
    }

    fn switch(id: u64, servers: &[u64]) -> SwitchConfig {
        SwitchConfig {
            id: Some(id),
            name: Some("backend".into()),
            vlan: Some(4000),
            servers: members(servers),
            ..SwitchConfig::default()
        }
    }

    #[test]
    fn membership_diff_is_keyed_by_server_number() {
        let diff = reconcile_membership(&members(&[1, 2, 3]), &members(&[2, 3, 4]));
        assert_eq!(diff.to_remove, members(&[1]));
        assert_eq!(diff.to_add, members(&[4]));
    }

    #[tokio::test]
    async fn update_removes_before_adding() {
        let backend = MockBackend::new().with_vswitch(vswitch_record(7, &[1, 2, 3]));
        let reconciler = VSwitchReconciler::new(backend);

        let outcome = reconciler
            .update(&switch(7, &[1, 2, 3]), switch(7, &[2, 3, 4]))
            .await
            .unwrap();

        assert_eq!(
            reconciler.backend().mutations(),
            vec![
                Call::UpdateVSwitch {
                    id: 7,
                    name: "backend".into(),
                    vlan: Some(4000)
                },
                Call::RemoveServers {
                    id: 7,
                    servers: vec![1]
                },
                Call::AddServers {
                    id: 7,
                    servers: vec![4]
                },
            ]
        );
        assert!(outcome.is_complete());
        assert_eq!(outcome.switch.server_numbers(), [2, 3, 4]);
    }

    #[tokio::test]
    async fn add_is_attempted_after_failed_remove() {
        let backend = MockBackend::new()
            .with_vswitch(vswitch_record(7, &[1, 2]))
            .failing(|f| f.remove_servers = true);
        let reconciler = VSwitchReconciler::new(backend);

        let outcome = reconciler
            .update(&switch(7, &[1, 2]), switch(7, &[2, 5]))
            .await
            .unwrap();

        let mutations = reconciler.backend().mutations();
        assert!(matches!(mutations.last(), Some(Call::AddServers { servers, .. }) if servers == &[5]));

        let membership = outcome.membership.as_ref().unwrap();
        assert!(matches!(membership.removal, Some(Err(_))));
        assert!(matches!(membership.addition, Some(Ok(()))));
        assert!(!outcome.is_complete());

        match outcome.into_result().unwrap_err() {
            CoreError::PartialApply { removal, addition } => {
                assert!(removal.is_some());
                assert!(addition.is_none());
            }
            other => panic!("expected PartialApply, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn both_sides_failing_are_both_reported() {
        let backend = MockBackend::new()
            .with_vswitch(vswitch_record(7, &[1]))
            .failing(|f| {
                f.remove_servers = true;
                f.add_servers = true;
            });
        let reconciler = VSwitchReconciler::new(backend);

        let outcome = reconciler
            .apply_membership(7, &members(&[1]), &members(&[2]))
            .await
            .unwrap();
        let err = outcome.into_result().unwrap_err();
        assert!(matches!(
            err,
            CoreError::PartialApply {
                removal: Some(_),
                addition: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn unchanged_membership_issues_only_name_update() {
        let backend = MockBackend::new().with_vswitch(vswitch_record(7, &[1, 2]));
        let reconciler = VSwitchReconciler::new(backend);

        let mut desired = switch(7, &[2, 1]);
        desired.name = Some("renamed".into());
        let outcome = reconciler.update(&switch(7, &[1, 2]), desired).await.unwrap();

        assert_eq!(reconciler.backend().mutations().len(), 1);
        assert!(outcome.membership.is_none());
        assert_eq!(outcome.switch.name.as_deref(), Some("renamed"));
    }

    #[tokio::test]
    async fn failed_name_update_skips_membership() {
        let backend = MockBackend::new()
            .with_vswitch(vswitch_record(7, &[1]))
            .failing(|f| f.update_vswitch = true);
        let reconciler = VSwitchReconciler::new(backend);

        let err = reconciler
            .update(&switch(7, &[1]), switch(7, &[2]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
        assert_eq!(reconciler.backend().mutations().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_members_fail_before_any_call() {
        let reconciler = VSwitchReconciler::new(MockBackend::new());
        let err = reconciler
            .create(SwitchConfig::new("dup").with_server(3).with_server(3))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(reconciler.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn create_attaches_declared_members_and_rereads() {
        let reconciler = VSwitchReconciler::new(MockBackend::new());
        let desired = SwitchConfig::new("edge").with_vlan(4001).with_server(11).with_server(12);

        let outcome = reconciler.create(desired).await.unwrap();

        assert_eq!(
            reconciler.backend().mutations(),
            vec![
                Call::CreateVSwitch {
                    name: "edge".into(),
                    vlan: Some(4001)
                },
                Call::AddServers {
                    id: CREATED_ID,
                    servers: vec![11, 12]
                },
            ]
        );
        assert_eq!(outcome.switch.id, Some(CREATED_ID));
        assert_eq!(outcome.switch.server_numbers(), [11, 12]);
        assert_eq!(
            reconciler.backend().calls().last(),
            Some(&Call::FetchVSwitch(CREATED_ID))
        );
    }

    #[tokio::test]
    async fn create_without_members_makes_no_membership_call() {
        let reconciler = VSwitchReconciler::new(MockBackend::new());
        let outcome = reconciler.create(SwitchConfig::new("empty")).await.unwrap();
        assert!(outcome.membership.is_none());
        assert_eq!(reconciler.backend().mutations().len(), 1);
    }

    #[tokio::test]
    async fn update_without_id_is_validation_error() {
        let reconciler = VSwitchReconciler::new(MockBackend::new());
        let err = reconciler
            .update(&SwitchConfig::new("x"), SwitchConfig::new("y"))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[tokio::test]
    async fn update_refuses_a_different_switch_id() {
        let backend = MockBackend::new().with_vswitch(vswitch_record(7, &[1]));
        let reconciler = VSwitchReconciler::new(backend);

        let err = reconciler
            .update(&switch(7, &[1]), switch(8, &[2]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(reconciler.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn update_takes_declared_id_when_previous_state_has_none() {
        let backend = MockBackend::new().with_vswitch(vswitch_record(7, &[]));
        let reconciler = VSwitchReconciler::new(backend);

        let mut old = switch(7, &[]);
        old.id = None;
        reconciler.update(&old, switch(7, &[])).await.unwrap();
        assert!(matches!(
            reconciler.backend().mutations().first(),
            Some(Call::UpdateVSwitch { id: 7, .. })
        ));
    }

    #[tokio::test]
    async fn membership_with_duplicate_server_sends_nothing() {
        let reconciler = VSwitchReconciler::new(MockBackend::new());
        let err = reconciler
            .apply_membership(7, &[], &members(&[3, 3]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(reconciler.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn create_without_name_sends_nothing() {
        let reconciler = VSwitchReconciler::new(MockBackend::new());
        let err = reconciler
            .create(SwitchConfig::default().with_vlan(4000))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
        assert!(reconciler.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn failed_reread_propagates() {
        let backend = MockBackend::new()
            .with_vswitch(vswitch_record(7, &[]))
            .failing(|f| f.fetch_vswitch = true);
        let reconciler = VSwitchReconciler::new(backend);

        let err = reconciler
            .update(&switch(7, &[]), switch(7, &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Transport(_)));
    }

    #[tokio::test]
    async fn import_parses_numeric_id() {
        let backend = MockBackend::new().with_vswitch(vswitch_record(42, &[9]));
        let reconciler = VSwitchReconciler::new(backend);

        let config = reconciler.import(" 42 ").await.unwrap();
        assert_eq!(config.id, Some(42));
        assert_eq!(config.server_numbers(), [9]);

        let err = reconciler.import("forty-two").await.unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));

        let err = reconciler.import("43").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_cancels_immediately() {
        let backend = MockBackend::new().with_vswitch(vswitch_record(7, &[]));
        let reconciler = VSwitchReconciler::new(backend);

        reconciler.delete(7).await.unwrap();

        assert_eq!(reconciler.backend().mutations(), vec![Call::CancelVSwitch(7)]);
        assert!(reconciler.backend().vswitch().unwrap().cancelled);
    }

    #[tokio::test]
    async fn empty_diff_issues_no_calls() {
        let reconciler = VSwitchReconciler::new(MockBackend::new());
        let outcome = reconciler
            .apply_membership(7, &members(&[1, 2]), &members(&[2, 1]))
            .await
            .unwrap();
        assert!(outcome.removal.is_none());
        assert!(outcome.addition.is_none());
        assert!(reconciler.backend().calls().is_empty());
    }
}
