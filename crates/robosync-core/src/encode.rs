// ── Firewall form encoder ──
//
// The Robot webservice takes nested rule lists as flat bracketed form keys:
//
//   rules[input][0][name]=ssh
//   rules[input][0][ip_version]=ipv4
//   rules[input][0][action]=accept
//   rules[input][0][dst_port]=22
//   ...
//   rules[output][0][name]=Allow all
//   rules[output][0][action]=accept
//
// Order matters: the remote numbers rules by their index, and the index is
// evaluation order.

use serde::Serialize;

use crate::model::{Rule, non_empty};
use crate::sanitize::SanitizedRuleSet;

const OUTPUT_RULE_NAME: &str = "Allow all";

/// Ordered form payload ready to be posted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormPayload(Vec<(String, String)>);

impl FormPayload {
    fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// First value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn as_fields(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Encode a sanitized rule set into the remote's form convention.
///
/// `name`, `ip_version` and `action` are always present for every rule;
/// the remaining fields only when non-empty. Exactly one output group
/// allowing all egress traffic is appended after the input rules.
pub fn encode_rule_set(set: &SanitizedRuleSet) -> FormPayload {
    let mut form = FormPayload::default();
    form.push("status", set.status());
    form.push("whitelist_hos", set.whitelist_hos.to_string());

    for (index, rule) in set.rules.iter().enumerate() {
        encode_rule(&mut form, index, rule);
    }

    form.push("rules[output][0][name]", OUTPUT_RULE_NAME);
    form.push("rules[output][0][action]", "accept");
    form
}

fn encode_rule(form: &mut FormPayload, index: usize, rule: &Rule) {
    let prefix = format!("rules[input][{index}]");

    form.push(
        format!("{prefix}[name]"),
        rule.name.clone().unwrap_or_default(),
    );
    form.push(format!("{prefix}[ip_version]"), rule.ip_version.as_ref());
    form.push(format!("{prefix}[action]"), rule.action.as_ref());

    let optional = [
        ("src_ip", &rule.src_ip),
        ("dst_ip", &rule.dst_ip),
        ("src_port", &rule.src_port),
        ("dst_port", &rule.dst_port),
        ("protocol", &rule.protocol),
        ("tcp_flags", &rule.tcp_flags),
    ];
    for (field, value) in optional {
        if let Some(value) = non_empty(value.clone()) {
            form.push(format!("{prefix}[{field}]"), value);
        }
    }
}
