//! Configured access checks
//!
//! The free functions in this module's parent are pure. `PolicyEvaluator`
//! layers deployment configuration on top of them: the `enforce` switch and
//! the diagnostic event emitted on denial.
//!
//! # Usage
//!
//! ```rust,ignore
//! use trellis_authorization::{Actor, PolicyEvaluator, Privilege};
//!
//! let evaluator = PolicyEvaluator::new(config);
//! evaluator.grant_access_or_fail(&actor, Some(&policy), Privilege::Update, "update callout")?;
//! ```

use super::{grant_access_or_fail, is_access_granted, matching_rules, Actor};
use crate::errors::AuthorizationResult;
use crate::policy::AuthorizationPolicy;
use crate::rules::Privilege;
use tracing::debug;
use trellis_core::AuthorizationConfig;

/// Access checks honoring [`AuthorizationConfig`]
#[derive(Debug, Clone, Default)]
pub struct PolicyEvaluator {
    config: AuthorizationConfig,
}

impl PolicyEvaluator {
    pub fn new(config: AuthorizationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AuthorizationConfig {
        &self.config
    }

    /// Like [`is_access_granted`], but always true when enforcement is off
    pub fn is_user_access_granted(
        &self,
        actor: &Actor,
        policy: Option<&AuthorizationPolicy>,
        required: Privilege,
    ) -> bool {
        !self.config.enforce || is_access_granted(actor, policy, required)
    }

    /// Like [`grant_access_or_fail`], logging the denial when configured to
    pub fn grant_access_or_fail(
        &self,
        actor: &Actor,
        policy: Option<&AuthorizationPolicy>,
        required: Privilege,
        context: &str,
    ) -> AuthorizationResult<()> {
        if !self.config.enforce {
            return Ok(());
        }

        let result = grant_access_or_fail(actor, policy, required, context);
        if result.is_err() && self.config.log_denials {
            self.log_denial(actor, policy, required, context);
        }
        result
    }

    /// Shorthand for a `Read` check
    pub fn grant_read_access_or_fail(
        &self,
        actor: &Actor,
        policy: Option<&AuthorizationPolicy>,
        context: &str,
    ) -> AuthorizationResult<()> {
        self.grant_access_or_fail(actor, policy, Privilege::Read, context)
    }

    fn log_denial(
        &self,
        actor: &Actor,
        policy: Option<&AuthorizationPolicy>,
        required: Privilege,
        context: &str,
    ) {
        let credentials: Vec<String> = actor
            .credentials
            .iter()
            .map(|c| format!("{}:{}", c.kind, c.scope))
            .collect();
        match policy {
            Some(policy) => debug!(
                actor = %actor.id,
                privilege = %required,
                context,
                policy = %policy.id(),
                kind = %policy.resource_kind(),
                ?credentials,
                rules = ?policy.rule_names(),
                matched = ?matching_rules(actor, policy),
                "Access denied"
            ),
            None => debug!(
                actor = %actor.id,
                privilege = %required,
                context,
                ?credentials,
                "Access denied: no authorization policy"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AuthorizationError;
    use crate::policy::ResourceKind;
    use crate::rules::CredentialRule;

    fn registered_read_policy() -> AuthorizationPolicy {
        let mut policy = AuthorizationPolicy::new(ResourceKind::Post);
        policy.upsert_credential_rule(CredentialRule::registered_access("registered-read", [Privilege::Read]));
        policy
    }

    #[test]
    fn enforcement_off_allows_everything() {
        let evaluator = PolicyEvaluator::new(AuthorizationConfig {
            enforce: false,
            ..AuthorizationConfig::default()
        });
        let guest = Actor::anonymous();
        assert!(evaluator.is_user_access_granted(&guest, None, Privilege::Delete));
        evaluator
            .grant_access_or_fail(&guest, None, Privilege::Delete, "delete post")
            .unwrap();
        assert!(!is_access_granted(&guest, None, Privilege::Delete));
    }

    #[test]
    fn enforced_read_check() {
        let evaluator = PolicyEvaluator::default();
        let policy = registered_read_policy();

        let err = evaluator
            .grant_read_access_or_fail(&Actor::anonymous(), Some(&policy), "read post")
            .unwrap_err();
        assert!(matches!(
            err,
            AuthorizationError::AccessDenied {
                privilege: Privilege::Read,
                ..
            }
        ));
    }
}
