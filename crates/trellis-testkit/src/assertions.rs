//! Assertion macros for access decisions and policy shape

/// Assert that an actor holds a privilege against a policy
#[macro_export]
macro_rules! assert_granted {
    ($actor:expr, $policy:expr, $privilege:expr) => {
        assert!(
            trellis_authorization::is_access_granted(&$actor, Some(&$policy), $privilege),
            "Expected {} to hold {} on policy {}, effective privileges were {:?}",
            $actor.id,
            $privilege,
            $policy.id(),
            trellis_authorization::effective_privileges(&$actor, &$policy)
        )
    };
}

/// Assert that an actor does not hold a privilege against a policy
#[macro_export]
macro_rules! assert_denied {
    ($actor:expr, $policy:expr, $privilege:expr) => {
        assert!(
            !trellis_authorization::is_access_granted(&$actor, Some(&$policy), $privilege),
            "Expected {} to be denied {} on policy {}, matched rules were {:?}",
            $actor.id,
            $privilege,
            $policy.id(),
            trellis_authorization::matching_rules(&$actor, &$policy)
        )
    };
}

/// Assert that a policy carries a credential rule, optionally checking its cascade flag
#[macro_export]
macro_rules! assert_has_rule {
    ($policy:expr, $name:expr) => {
        assert!(
            $policy.credential_rule($name).is_some(),
            "Policy {} lacks rule '{}', has {:?}",
            $policy.id(),
            $name,
            $policy.rule_names()
        )
    };
    ($policy:expr, $name:expr, cascade = $cascade:expr) => {
        match $policy.credential_rule($name) {
            Some(rule) => assert_eq!(
                rule.cascade(),
                $cascade,
                "Rule '{}' on policy {} has the wrong cascade flag",
                $name,
                $policy.id()
            ),
            None => panic!(
                "Policy {} lacks rule '{}', has {:?}",
                $policy.id(),
                $name,
                $policy.rule_names()
            ),
        }
    };
}

/// Assert that a policy does not carry a credential rule
#[macro_export]
macro_rules! assert_lacks_rule {
    ($policy:expr, $name:expr) => {
        assert!(
            $policy.credential_rule($name).is_none(),
            "Policy {} unexpectedly has rule '{}'",
            $policy.id(),
            $name
        )
    };
}
