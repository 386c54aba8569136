//! Credential rules and privilege derivation rules

use super::{Credential, CredentialCriterion, CredentialKind, GlobalRole, Privilege};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Grants a set of privileges to any actor matching one of its criteria
///
/// Rules are values: once built they are never edited in place. A rule's
/// `name` is its identity inside a policy, and rebuilding a rule with the same
/// name replaces the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRule {
    name: String,
    granted_privileges: BTreeSet<Privilege>,
    criteria: Vec<CredentialCriterion>,
    cascade: bool,
}

impl CredentialRule {
    /// Build a cascading rule
    pub fn new(
        name: impl Into<String>,
        privileges: impl IntoIterator<Item = Privilege>,
        criteria: impl IntoIterator<Item = CredentialCriterion>,
    ) -> Self {
        Self {
            name: name.into(),
            granted_privileges: privileges.into_iter().collect(),
            criteria: criteria.into_iter().collect(),
            cascade: true,
        }
    }

    /// Rule matching every credential of the given kinds, whatever their scope
    pub fn from_kinds(
        name: impl Into<String>,
        privileges: impl IntoIterator<Item = Privilege>,
        kinds: impl IntoIterator<Item = CredentialKind>,
    ) -> Self {
        Self::new(
            name,
            privileges,
            kinds.into_iter().map(CredentialCriterion::wildcard),
        )
    }

    /// Rule for holders of any of the platform roles
    pub fn global_roles(
        name: impl Into<String>,
        privileges: impl IntoIterator<Item = Privilege>,
        roles: &[GlobalRole],
    ) -> Self {
        Self::from_kinds(name, privileges, roles.iter().map(GlobalRole::credential_kind))
    }

    /// Rule matching actors that are not logged in
    pub fn anonymous_access(
        name: impl Into<String>,
        privileges: impl IntoIterator<Item = Privilege>,
    ) -> Self {
        Self::from_kinds(name, privileges, [CredentialKind::global_anonymous()])
    }

    /// Rule matching any registered actor
    pub fn registered_access(
        name: impl Into<String>,
        privileges: impl IntoIterator<Item = Privilege>,
    ) -> Self {
        Self::from_kinds(name, privileges, [CredentialKind::global_registered()])
    }

    /// Rule matching anonymous and registered actors alike
    pub fn anonymous_registered_access(
        name: impl Into<String>,
        privileges: impl IntoIterator<Item = Privilege>,
    ) -> Self {
        Self::from_kinds(
            name,
            privileges,
            [
                CredentialKind::global_anonymous(),
                CredentialKind::global_registered(),
            ],
        )
    }

    /// Same rule with the given cascade flag
    pub fn with_cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn granted_privileges(&self) -> &BTreeSet<Privilege> {
        &self.granted_privileges
    }

    pub fn criteria(&self) -> &[CredentialCriterion] {
        &self.criteria
    }

    /// Whether the rule is copied into descendant policies
    pub fn cascade(&self) -> bool {
        self.cascade
    }

    pub fn grants(&self, privilege: Privilege) -> bool {
        self.granted_privileges.contains(&privilege)
    }

    /// True if any criterion matches any of the credentials
    pub fn matches_any(&self, credentials: &[Credential]) -> bool {
        self.criteria
            .iter()
            .any(|criterion| credentials.iter().any(|c| criterion.matches(c)))
    }

    /// Copy of this rule without `privilege`, or `None` if nothing would remain
    pub fn without_privilege(&self, privilege: Privilege) -> Option<Self> {
        let mut granted = self.granted_privileges.clone();
        granted.remove(&privilege);
        if granted.is_empty() {
            return None;
        }
        Some(Self {
            granted_privileges: granted,
            ..self.clone()
        })
    }
}

/// Grants `granted_privilege` at a node when the actor already holds any of
/// `source_privileges` there through credential rules
///
/// Derivation rules live only on the node that built them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivilegeDerivationRule {
    name: String,
    source_privileges: BTreeSet<Privilege>,
    granted_privilege: Privilege,
}

impl PrivilegeDerivationRule {
    pub fn new(
        name: impl Into<String>,
        source_privileges: impl IntoIterator<Item = Privilege>,
        granted_privilege: Privilege,
    ) -> Self {
        Self {
            name: name.into(),
            source_privileges: source_privileges.into_iter().collect(),
            granted_privilege,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source_privileges(&self) -> &BTreeSet<Privilege> {
        &self.source_privileges
    }

    pub fn granted_privilege(&self) -> Privilege {
        self.granted_privilege
    }

    /// Whether the rule fires for an actor holding `held`
    pub fn applies_to(&self, held: &BTreeSet<Privilege>) -> bool {
        !self.source_privileges.is_disjoint(held)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_cascade_unless_told_otherwise() {
        let rule = CredentialRule::registered_access("registered-read", [Privilege::Read]);
        assert!(rule.cascade());
        assert!(!rule.with_cascade(false).cascade());
    }

    #[test]
    fn anonymous_registered_rule_matches_both_kinds() {
        let rule = CredentialRule::anonymous_registered_access("public-read", [Privilege::Read]);
        assert!(rule.matches_any(&[Credential::global(CredentialKind::global_anonymous())]));
        assert!(rule.matches_any(&[Credential::global(CredentialKind::global_registered())]));
        assert!(!rule.matches_any(&[Credential::global(CredentialKind::global_support())]));
    }

    #[test]
    fn rule_with_no_criteria_matches_nobody() {
        let rule = CredentialRule::new("orphan", [Privilege::Read], Vec::new());
        assert!(!rule.matches_any(&[Credential::global(CredentialKind::global_admin())]));
    }

    #[test]
    fn stripping_the_only_privilege_drops_the_rule() {
        let read_only = CredentialRule::registered_access("read", [Privilege::Read]);
        assert!(read_only.without_privilege(Privilege::Read).is_none());

        let read_write = CredentialRule::registered_access("rw", [Privilege::Read, Privilege::Update])
            .with_cascade(false);
        let stripped = read_write.without_privilege(Privilege::Read).unwrap();
        assert_eq!(stripped.name(), "rw");
        assert!(!stripped.cascade());
        assert!(stripped.grants(Privilege::Update));
        assert!(!stripped.grants(Privilege::Read));
    }

    #[test]
    fn derivation_applies_on_any_source() {
        let rule = PrivilegeDerivationRule::new(
            "contribute-post",
            [Privilege::Create, Privilege::Contribute],
            Privilege::CreatePost,
        );
        assert!(rule.applies_to(&BTreeSet::from([Privilege::Contribute])));
        assert!(!rule.applies_to(&BTreeSet::from([Privilege::Read])));
        assert!(!rule.applies_to(&BTreeSet::new()));
    }
}
