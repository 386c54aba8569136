//! Property tests for evaluation and inheritance laws

#![allow(clippy::unwrap_used, clippy::expect_used)]

use proptest::collection::btree_set;
use proptest::prelude::*;
use std::collections::BTreeSet;
use trellis_authorization::{
    effective_privileges, grant_access_or_fail, inherit, is_access_granted, Actor,
    AuthorizationError, AuthorizationPolicy, CredentialCriterion, CredentialRule, Privilege,
    ResourceKind,
};
use trellis_testkit::strategies::{
    arb_actor, arb_credential, arb_policy, arb_privilege,
};

proptest! {
    #[test]
    fn actor_without_credentials_holds_nothing(policy in arb_policy()) {
        let actor = Actor::new("user-empty", Vec::new());
        prop_assert!(effective_privileges(&actor, &policy).is_empty());
    }

    #[test]
    fn unmatched_actor_is_denied_everything(
        policy in arb_policy(),
        actor in arb_actor(),
        required in arb_privilege(),
    ) {
        let matched = policy
            .credential_rules()
            .iter()
            .any(|rule| rule.matches_any(&actor.credentials));
        prop_assume!(!matched);
        prop_assert!(effective_privileges(&actor, &policy).is_empty());
        let denied = matches!(
            grant_access_or_fail(&actor, Some(&policy), required, "probe"),
            Err(AuthorizationError::AccessDenied { .. })
        );
        prop_assert!(denied);
    }

    #[test]
    fn matching_rules_union(
        first_privileges in btree_set(arb_privilege(), 1..5),
        second_privileges in btree_set(arb_privilege(), 1..5),
        credential in arb_credential(),
    ) {
        let first = CredentialRule::new(
            "scoped",
            first_privileges.iter().copied(),
            [CredentialCriterion::new(credential.kind.clone(), credential.scope.clone())],
        );
        let second = CredentialRule::from_kinds(
            "wildcard",
            second_privileges.iter().copied(),
            [credential.kind.clone()],
        )
        .with_cascade(false);
        let actor = Actor::new("user-1", vec![credential]);

        let mut policy = AuthorizationPolicy::new(ResourceKind::Post);
        policy.append_credential_rules([first, second]);

        let expected: BTreeSet<Privilege> =
            first_privileges.union(&second_privileges).copied().collect();
        prop_assert_eq!(effective_privileges(&actor, &policy), expected);
    }

    #[test]
    fn granted_check_agrees_with_effective_set(
        policy in arb_policy(),
        actor in arb_actor(),
        required in arb_privilege(),
    ) {
        prop_assert_eq!(
            is_access_granted(&actor, Some(&policy), required),
            effective_privileges(&actor, &policy).contains(&required)
        );
    }

    #[test]
    fn inheritance_keeps_exactly_the_cascading_rules(parent in arb_policy(), child in arb_policy()) {
        let inherited = inherit(child.clone(), Some(&parent));

        let expected: Vec<&CredentialRule> =
            parent.credential_rules().iter().filter(|r| r.cascade()).collect();
        let actual: Vec<&CredentialRule> = inherited.credential_rules().iter().collect();
        prop_assert_eq!(actual, expected);
        prop_assert_eq!(inherited.derivation_rules(), child.derivation_rules());
        prop_assert_eq!(inherited.id(), child.id());
    }

    #[test]
    fn inheritance_is_idempotent(parent in arb_policy(), child in arb_policy()) {
        let once = inherit(child, Some(&parent));
        let twice = inherit(once.clone(), Some(&parent));
        prop_assert_eq!(once, twice);
    }
}
