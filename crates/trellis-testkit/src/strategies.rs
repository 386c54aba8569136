//! Property test strategies for rule model types
//!
//! Scopes and kinds are drawn from small fixed pools so that generated
//! actors and rules actually collide often enough to exercise matching.

use proptest::collection::{btree_set, vec};
use proptest::prelude::*;
use proptest::sample::select;
use trellis_authorization::{
    Actor, AuthorizationPolicy, Credential, CredentialCriterion, CredentialKind, CredentialRule,
    Privilege, PrivilegeDerivationRule, ResourceKind,
};

// Re-export proptest for convenience
pub use proptest;

const KINDS: [&str; 5] = [
    CredentialKind::GLOBAL_ADMIN,
    CredentialKind::GLOBAL_REGISTERED,
    CredentialKind::SELF_MANAGEMENT,
    CredentialKind::SPACE_ADMIN,
    CredentialKind::SPACE_MEMBER,
];

const SCOPES: [&str; 3] = ["space-1", "space-2", "user-42"];

pub fn arb_privilege() -> impl Strategy<Value = Privilege> {
    select(Privilege::ALL.to_vec())
}

pub fn arb_credential_kind() -> impl Strategy<Value = CredentialKind> {
    select(KINDS.to_vec()).prop_map(CredentialKind::new)
}

pub fn arb_credential() -> impl Strategy<Value = Credential> {
    (arb_credential_kind(), select(SCOPES.to_vec())).prop_map(|(kind, scope)| Credential::new(kind, scope))
}

/// Criterion with a one-in-four chance of being a wildcard
pub fn arb_criterion() -> impl Strategy<Value = CredentialCriterion> {
    (arb_credential_kind(), prop::option::weighted(0.75, select(SCOPES.to_vec()))).prop_map(
        |(kind, scope)| match scope {
            Some(scope) => CredentialCriterion::new(kind, scope),
            None => CredentialCriterion::wildcard(kind),
        },
    )
}

/// Rule named `name` with random privileges, criteria and cascade flag
pub fn arb_credential_rule(name: String) -> impl Strategy<Value = CredentialRule> {
    (
        btree_set(arb_privilege(), 1..4),
        vec(arb_criterion(), 1..3),
        any::<bool>(),
    )
        .prop_map(move |(privileges, criteria, cascade)| {
            CredentialRule::new(name.clone(), privileges, criteria).with_cascade(cascade)
        })
}

pub fn arb_derivation_rule() -> impl Strategy<Value = PrivilegeDerivationRule> {
    (btree_set(arb_privilege(), 1..3), arb_privilege(), 0u8..100).prop_map(
        |(sources, granted, seed)| {
            PrivilegeDerivationRule::new(format!("derived-{seed}"), sources, granted)
        },
    )
}

/// Policy with uniquely named credential rules
pub fn arb_policy() -> impl Strategy<Value = AuthorizationPolicy> {
    (0usize..5)
        .prop_flat_map(|count| {
            let rules: Vec<_> = (0..count)
                .map(|i| arb_credential_rule(format!("rule-{i}")))
                .collect();
            (rules, vec(arb_derivation_rule(), 0..3))
        })
        .prop_map(|(rules, derivations)| {
            let mut policy = AuthorizationPolicy::new(ResourceKind::Callout);
            policy.append_credential_rules(rules);
            policy.set_derivation_rules(derivations);
            policy
        })
}

pub fn arb_actor() -> impl Strategy<Value = Actor> {
    (0u16..1000, vec(arb_credential(), 0..4))
        .prop_map(|(seed, credentials)| Actor::new(format!("user-{seed}"), credentials))
}
