// ── Capability sanitizer ──
//
// The Robot IPv6 rule dialect cannot filter on addresses. Declared
// addresses on ipv6 rules are dropped here, before encoding or comparison,
// and each drop yields a `Notice`.

use tracing::warn;

use crate::model::{DroppedField, IpVersion, Notice, Rule, RuleSet, is_present};

/// Normalize one rule against its address family.
///
/// IPv4 rules pass through untouched. For IPv6 rules a non-empty `src_ip`
/// or `dst_ip` is cleared and reported. Empty strings are normalized to
/// `None` without a notice.
pub fn sanitize(rule: &Rule) -> (Rule, Vec<Notice>) {
    let mut out = rule.clone();
    let mut notices = Vec::new();

    if rule.ip_version != IpVersion::Ipv6 {
        return (out, notices);
    }

    let label = rule.label().to_owned();
    for (slot, field) in [
        (&mut out.src_ip, DroppedField::SrcIp),
        (&mut out.dst_ip, DroppedField::DstIp),
    ] {
        if is_present((*slot).as_ref()) {
            let notice = Notice {
                rule: label.clone(),
                field,
            };
            warn!(rule = %label, field = %field, "{}", notice.detail());
            notices.push(notice);
        }
        *slot = None;
    }

    (out, notices)
}

/// A rule set whose rules have all been through [`sanitize`].
///
/// Only [`sanitize_rule_set`] constructs one, so the encoder can never be
/// handed an ipv6 rule that still carries addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedRuleSet(RuleSet);

impl SanitizedRuleSet {
    pub fn as_rule_set(&self) -> &RuleSet {
        &self.0
    }

    pub fn into_inner(self) -> RuleSet {
        self.0
    }
}

impl std::ops::Deref for SanitizedRuleSet {
    type Target = RuleSet;

    fn deref(&self) -> &RuleSet {
        &self.0
    }
}

/// Sanitize every rule of a set, in order, collecting all notices.
pub fn sanitize_rule_set(set: RuleSet) -> (SanitizedRuleSet, Vec<Notice>) {
    let mut notices = Vec::new();
    let rules = set
        .rules
        .iter()
        .map(|rule| {
            let (clean, mut found) = sanitize(rule);
            notices.append(&mut found);
            clean
        })
        .collect();

    (SanitizedRuleSet(RuleSet { rules, ..set }), notices)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::ServerAddress;

    fn v6_rule() -> Rule {
        Rule::accept()
            .with_name("web")
            .with_ip_version(IpVersion::Ipv6)
            .with_src_ip("2001:db8::/32")
            .with_dst_ip("2001:db8:1::/48")
            .with_dst_port("443")
            .with_protocol("tcp")
    }

    #[test]
    fn ipv6_addresses_are_cleared_with_one_notice_each() {
        let (clean, notices) = sanitize(&v6_rule());

        assert_eq!(clean.src_ip, None);
        assert_eq!(clean.dst_ip, None);
        assert_eq!(clean.dst_port.as_deref(), Some("443"));
        assert_eq!(clean.protocol.as_deref(), Some("tcp"));
        assert_eq!(
            notices,
            vec![
                Notice {
                    rule: "web".into(),
                    field: DroppedField::SrcIp
                },
                Notice {
                    rule: "web".into(),
                    field: DroppedField::DstIp
                },
            ]
        );
    }

    #[test]
    fn ipv4_rule_is_identity() {
        let rule = Rule::discard()
            .with_name("block")
            .with_src_ip("10.0.0.0/8")
            .with_dst_ip("192.168.0.1/32")
            .with_src_port("1024-65535")
            .with_tcp_flags("syn");

        let (clean, notices) = sanitize(&rule);
        assert_eq!(clean, rule);
        assert!(notices.is_empty());
    }

    #[test]
    fn ipv6_empty_address_produces_no_notice() {
        let rule = Rule::accept()
            .with_ip_version(IpVersion::Ipv6)
            .with_src_ip("");
        let (clean, notices) = sanitize(&rule);
        assert_eq!(clean.src_ip, None);
        assert!(notices.is_empty());
    }

    #[test]
    fn unnamed_rule_is_labelled() {
        let rule = Rule::accept()
            .with_ip_version(IpVersion::Ipv6)
            .with_dst_ip("2001:db8::1/128");
        let (_, notices) = sanitize(&rule);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].rule, "unnamed");
        assert_eq!(notices[0].field, DroppedField::DstIp);
    }

    #[test]
    fn rule_set_keeps_order_and_collects_notices() {
        let set = RuleSet::new("1.2.3.4".parse::<ServerAddress>().unwrap())
            .with_active(true)
            .with_rule(Rule::accept().with_name("first").with_src_ip("10.0.0.0/8"))
            .with_rule(v6_rule())
            .with_rule(Rule::discard().with_name("last"));

        let (clean, notices) = sanitize_rule_set(set.clone());

        let names: Vec<_> = clean.rules.iter().map(Rule::label).collect();
        assert_eq!(names, ["first", "web", "last"]);
        assert_eq!(clean.rules[0], set.rules[0]);
        assert!(clean.active);
        assert_eq!(notices.len(), 2);
    }
}
