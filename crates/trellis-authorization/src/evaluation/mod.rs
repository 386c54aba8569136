//! Access decisions against a settled policy
//!
//! Evaluation is a single pass. Credential rules are matched first; derivation
//! rules then fire on the credential-derived set only, so one derivation never
//! feeds another. A missing policy grants nothing.

mod evaluator;

pub use evaluator::PolicyEvaluator;

use crate::errors::{AuthorizationError, AuthorizationResult};
use crate::policy::AuthorizationPolicy;
use crate::rules::{Credential, CredentialKind, Privilege};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use trellis_core::ActorId;

/// Anyone performing an operation: a user, a virtual contributor or a guest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub credentials: Vec<Credential>,
}

impl Actor {
    pub fn new(id: impl Into<ActorId>, credentials: Vec<Credential>) -> Self {
        Self {
            id: id.into(),
            credentials,
        }
    }

    /// Guest holding only the anonymous credential
    pub fn anonymous() -> Self {
        Self::new(
            "anonymous",
            vec![Credential::global(CredentialKind::global_anonymous())],
        )
    }
}

/// Privileges the actor holds at the node owning `policy`
pub fn effective_privileges(actor: &Actor, policy: &AuthorizationPolicy) -> BTreeSet<Privilege> {
    let mut granted = credential_privileges(actor, policy);
    let derived: Vec<Privilege> = policy
        .derivation_rules()
        .iter()
        .filter(|rule| rule.applies_to(&granted))
        .map(|rule| rule.granted_privilege())
        .collect();
    granted.extend(derived);
    granted
}

fn credential_privileges(actor: &Actor, policy: &AuthorizationPolicy) -> BTreeSet<Privilege> {
    policy
        .credential_rules()
        .iter()
        .filter(|rule| rule.matches_any(&actor.credentials))
        .flat_map(|rule| rule.granted_privileges().iter().copied())
        .collect()
}

/// Whether the actor holds `required`; an absent policy grants nothing
pub fn is_access_granted(
    actor: &Actor,
    policy: Option<&AuthorizationPolicy>,
    required: Privilege,
) -> bool {
    let Some(policy) = policy else {
        return false;
    };

    let direct = policy
        .credential_rules()
        .iter()
        .any(|rule| rule.grants(required) && rule.matches_any(&actor.credentials));
    if direct {
        return true;
    }

    let mut candidates = policy
        .derivation_rules()
        .iter()
        .filter(|rule| rule.granted_privilege() == required)
        .peekable();
    if candidates.peek().is_none() {
        return false;
    }
    let held = credential_privileges(actor, policy);
    candidates.any(|rule| rule.applies_to(&held))
}

/// Fail with `AccessDenied` unless the actor holds `required`
pub fn grant_access_or_fail(
    actor: &Actor,
    policy: Option<&AuthorizationPolicy>,
    required: Privilege,
    context: &str,
) -> AuthorizationResult<()> {
    if is_access_granted(actor, policy, required) {
        Ok(())
    } else {
        Err(AuthorizationError::access_denied(required, context))
    }
}

/// Names of the credential rules that match the actor, in policy order
pub fn matching_rules<'p>(actor: &Actor, policy: &'p AuthorizationPolicy) -> Vec<&'p str> {
    policy
        .credential_rules()
        .iter()
        .filter(|rule| rule.matches_any(&actor.credentials))
        .map(|rule| rule.name())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ResourceKind;
    use crate::rules::{CredentialCriterion, CredentialRule, PrivilegeDerivationRule};

    fn member(space: &str) -> Actor {
        Actor::new(
            "user-1",
            vec![Credential::new(CredentialKind::space_member(), space)],
        )
    }

    fn callout_policy() -> AuthorizationPolicy {
        let mut policy = AuthorizationPolicy::new(ResourceKind::Callout);
        policy.upsert_credential_rule(CredentialRule::new(
            "members-contribute",
            [Privilege::Read, Privilege::Contribute],
            [CredentialCriterion::new(CredentialKind::space_member(), "space-1")],
        ));
        policy.set_derivation_rules(vec![
            PrivilegeDerivationRule::new("contribute-post", [Privilege::Contribute], Privilege::CreatePost),
            PrivilegeDerivationRule::new("post-to-memo", [Privilege::CreatePost], Privilege::CreateMemo),
        ]);
        policy
    }

    #[test]
    fn derivations_fire_once_on_credential_privileges() {
        let privileges = effective_privileges(&member("space-1"), &callout_policy());
        assert!(privileges.contains(&Privilege::CreatePost));
        assert!(
            !privileges.contains(&Privilege::CreateMemo),
            "derived privileges must not feed other derivations"
        );
    }

    #[test]
    fn shortcut_agrees_with_full_evaluation() {
        let policy = callout_policy();
        for actor in [member("space-1"), member("space-2"), Actor::anonymous()] {
            let effective = effective_privileges(&actor, &policy);
            for privilege in Privilege::ALL {
                assert_eq!(
                    is_access_granted(&actor, Some(&policy), privilege),
                    effective.contains(&privilege),
                    "{privilege} for {}",
                    actor.id
                );
            }
        }
    }

    #[test]
    fn absent_policy_denies() {
        assert!(!is_access_granted(&member("space-1"), None, Privilege::Read));
        let err = grant_access_or_fail(&member("space-1"), None, Privilege::Read, "read callout")
            .unwrap_err();
        assert_eq!(
            err,
            AuthorizationError::access_denied(Privilege::Read, "read callout")
        );
    }

    #[test]
    fn matching_rules_lists_names() {
        let policy = callout_policy();
        assert_eq!(matching_rules(&member("space-1"), &policy), vec!["members-contribute"]);
        assert!(matching_rules(&Actor::anonymous(), &policy).is_empty());
    }
}
