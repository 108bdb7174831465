// ── Firewall reconciler ──
//
// The webservice only offers full replacement, so create and update are
// the same operation: sanitize, encode, post the whole rule list.

use serde::Serialize;
use tracing::{debug, info};

use crate::backend::RobotBackend;
use crate::encode::encode_rule_set;
use crate::error::CoreError;
use crate::model::{Notice, RuleSet, ServerAddress};
use crate::sanitize::sanitize_rule_set;

/// Result of a successful apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FirewallOutcome {
    /// The rule set as transmitted, after sanitization.
    pub rule_set: RuleSet,
    /// Fields dropped because the remote could not express them.
    pub notices: Vec<Notice>,
}

pub struct FirewallReconciler<B> {
    backend: B,
}

impl<B: RobotBackend> FirewallReconciler<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Apply `desired` as the complete firewall of its server.
    pub async fn create(&self, desired: RuleSet) -> Result<FirewallOutcome, CoreError> {
        self.replace(desired).await
    }

    /// Retransmit the full rule list, even when only the flags changed.
    pub async fn update(
        &self,
        old: &RuleSet,
        desired: RuleSet,
    ) -> Result<FirewallOutcome, CoreError> {
        if old.server_ip != desired.server_ip {
            return Err(CoreError::validation(format!(
                "server address changed from {} to {}; a firewall cannot move between servers",
                old.server_ip, desired.server_ip
            )));
        }
        if old.rules == desired.rules {
            debug!(server_ip = %desired.server_ip, "rules unchanged, resubmitting with new flags");
        }
        self.replace(desired).await
    }

    /// Converge toward `desired` from whatever was last known remotely:
    /// `None` creates, `Some` updates.
    pub async fn reconcile(
        &self,
        old: Option<&RuleSet>,
        desired: RuleSet,
    ) -> Result<FirewallOutcome, CoreError> {
        match old {
            Some(old) => self.update(old, desired).await,
            None => self.create(desired).await,
        }
    }

    /// Fetch and normalize the current remote rule set. Nothing is cached.
    pub async fn read(&self, server_ip: &ServerAddress) -> Result<RuleSet, CoreError> {
        let record = self
            .backend
            .fetch_firewall(server_ip)
            .await
            .map_err(|e| CoreError::from_fetch(e, "firewall", server_ip.to_string()))?;
        RuleSet::try_from(record)
    }

    /// Adopt an existing firewall by its server address.
    pub async fn import(&self, raw_id: &str) -> Result<RuleSet, CoreError> {
        let server_ip: ServerAddress = raw_id.parse()?;
        self.read(&server_ip).await
    }

    /// The webservice has no firewall deletion primitive; forgetting a
    /// firewall leaves the remote untouched.
    pub fn delete(&self, server_ip: &ServerAddress) {
        info!(
            %server_ip,
            "firewall removed from management; remote configuration left in place"
        );
    }

    async fn replace(&self, desired: RuleSet) -> Result<FirewallOutcome, CoreError> {
        let (sanitized, notices) = sanitize_rule_set(desired);
        let form = encode_rule_set(&sanitized);
        let server_ip = sanitized.server_ip;

        debug!(%server_ip, fields = form.len(), "submitting firewall");
        self.backend.apply_firewall(&server_ip, &form).await?;
        info!(
            %server_ip,
            rules = sanitized.rules.len(),
            status = sanitized.status(),
            "firewall applied"
        );

        Ok(FirewallOutcome {
            rule_set: sanitized.into_inner(),
            notices,
        })
    }
}
