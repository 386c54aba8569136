//! The authorization record attached to every securable node

use crate::errors::{AuthorizationError, AuthorizationResult};
use crate::rules::{CredentialRule, GlobalRole, Privilege, PrivilegeDerivationRule};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use trellis_core::PolicyId;

/// Kind of securable entity a policy belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Collaboration,
    Callout,
    CalloutFraming,
    Contribution,
    Post,
    Whiteboard,
    Link,
    Memo,
    Comments,
    /// Policy built on the fly for platform checks, never attached to a node
    InMemory,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Collaboration => "collaboration",
            ResourceKind::Callout => "callout",
            ResourceKind::CalloutFraming => "callout-framing",
            ResourceKind::Contribution => "contribution",
            ResourceKind::Post => "post",
            ResourceKind::Whiteboard => "whiteboard",
            ResourceKind::Link => "link",
            ResourceKind::Memo => "memo",
            ResourceKind::Comments => "comments",
            ResourceKind::InMemory => "in-memory",
        };
        f.write_str(name)
    }
}

/// Credential and derivation rules owned by exactly one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationPolicy {
    id: PolicyId,
    resource_kind: ResourceKind,
    credential_rules: Vec<CredentialRule>,
    derivation_rules: Vec<PrivilegeDerivationRule>,
}

impl AuthorizationPolicy {
    /// Empty policy for a freshly created entity
    pub fn new(resource_kind: ResourceKind) -> Self {
        Self::with_id(PolicyId::new(), resource_kind)
    }

    pub fn with_id(id: PolicyId, resource_kind: ResourceKind) -> Self {
        Self {
            id,
            resource_kind,
            credential_rules: Vec::new(),
            derivation_rules: Vec::new(),
        }
    }

    /// Unpersisted policy granting `privileges` to holders of any of `roles`
    pub fn in_memory_global_roles(
        roles: &[GlobalRole],
        privileges: impl IntoIterator<Item = Privilege>,
        rule_name: &str,
    ) -> Self {
        let mut policy = Self::new(ResourceKind::InMemory);
        policy
            .credential_rules
            .push(CredentialRule::global_roles(rule_name, privileges, roles));
        policy
    }

    pub fn id(&self) -> PolicyId {
        self.id
    }

    pub fn resource_kind(&self) -> ResourceKind {
        self.resource_kind
    }

    pub fn credential_rules(&self) -> &[CredentialRule] {
        &self.credential_rules
    }

    pub fn derivation_rules(&self) -> &[PrivilegeDerivationRule] {
        &self.derivation_rules
    }

    pub fn credential_rule(&self, name: &str) -> Option<&CredentialRule> {
        self.credential_rules.iter().find(|r| r.name() == name)
    }

    /// Drop every rule, keeping identity and kind
    pub fn reset(&mut self) {
        self.credential_rules.clear();
        self.derivation_rules.clear();
    }

    pub(crate) fn clear_credential_rules(&mut self) {
        self.credential_rules.clear();
    }

    /// Insert a rule, replacing any existing rule with the same name in place
    pub fn upsert_credential_rule(&mut self, rule: CredentialRule) {
        match self
            .credential_rules
            .iter_mut()
            .find(|existing| existing.name() == rule.name())
        {
            Some(existing) => *existing = rule,
            None => self.credential_rules.push(rule),
        }
    }

    /// Upsert each rule in order
    pub fn append_credential_rules(&mut self, rules: impl IntoIterator<Item = CredentialRule>) {
        for rule in rules {
            self.upsert_credential_rule(rule);
        }
    }

    /// Append rules as given, without replacing same-named ones
    pub(crate) fn extend_credential_rules(
        &mut self,
        rules: impl IntoIterator<Item = CredentialRule>,
    ) {
        self.credential_rules.extend(rules);
    }

    /// Replace the derivation rules wholesale
    pub fn set_derivation_rules(&mut self, rules: Vec<PrivilegeDerivationRule>) {
        self.derivation_rules = rules;
    }

    /// Fail with `InconsistentRules` on the first duplicated credential rule name
    pub fn validate_unique_names(&self) -> AuthorizationResult<()> {
        let mut seen = HashSet::with_capacity(self.credential_rules.len());
        for rule in &self.credential_rules {
            if !seen.insert(rule.name()) {
                return Err(AuthorizationError::InconsistentRules {
                    policy: self.id,
                    rule: rule.name().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Rule names in policy order
    pub fn rule_names(&self) -> Vec<&str> {
        self.credential_rules.iter().map(CredentialRule::name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::CredentialKind;

    fn admin_update() -> CredentialRule {
        CredentialRule::from_kinds("admin-update", [Privilege::Update], [CredentialKind::global_admin()])
    }

    #[test]
    fn upsert_replaces_by_name_in_place() {
        let mut policy = AuthorizationPolicy::new(ResourceKind::Callout);
        policy.upsert_credential_rule(admin_update());
        policy.upsert_credential_rule(CredentialRule::registered_access("read", [Privilege::Read]));
        policy.upsert_credential_rule(
            CredentialRule::from_kinds("admin-update", [Privilege::Delete], [CredentialKind::global_admin()])
                .with_cascade(false),
        );

        assert_eq!(policy.rule_names(), vec!["admin-update", "read"]);
        let replaced = policy.credential_rule("admin-update").unwrap();
        assert!(replaced.grants(Privilege::Delete));
        assert!(!replaced.cascade());
        policy.validate_unique_names().unwrap();
    }

    #[test]
    fn duplicate_names_are_inconsistent() {
        let mut policy = AuthorizationPolicy::new(ResourceKind::Post);
        policy.credential_rules.push(admin_update());
        policy.credential_rules.push(admin_update());

        match policy.validate_unique_names() {
            Err(AuthorizationError::InconsistentRules { policy: id, rule }) => {
                assert_eq!(id, policy.id());
                assert_eq!(rule, "admin-update");
            }
            other => panic!("expected InconsistentRules, got {other:?}"),
        }
    }

    #[test]
    fn reset_keeps_identity() {
        let mut policy = AuthorizationPolicy::new(ResourceKind::Whiteboard);
        let id = policy.id();
        policy.upsert_credential_rule(admin_update());
        policy.set_derivation_rules(vec![PrivilegeDerivationRule::new(
            "update-content",
            [Privilege::Update],
            Privilege::UpdateContent,
        )]);

        policy.reset();
        assert_eq!(policy.id(), id);
        assert_eq!(policy.resource_kind(), ResourceKind::Whiteboard);
        assert!(policy.credential_rules().is_empty());
        assert!(policy.derivation_rules().is_empty());
    }

    #[test]
    fn in_memory_policy_holds_single_role_rule() {
        let policy = AuthorizationPolicy::in_memory_global_roles(
            &[GlobalRole::Admin, GlobalRole::Support],
            [Privilege::ReadUsers],
            "platform-read-users",
        );
        assert_eq!(policy.resource_kind(), ResourceKind::InMemory);
        let rule = policy.credential_rule("platform-read-users").unwrap();
        assert_eq!(rule.criteria().len(), 2);
    }
}
