//! Trellis Authorization - policy propagation and evaluation
//!
//! Every securable node in a content tree owns one [`AuthorizationPolicy`].
//! A policy is rebuilt, never patched: after a structural change the
//! [`PolicyPropagator`] walks the affected subtree top-down, copies each
//! parent's cascading credential rules into the child ([`inherit`]) and then
//! layers the rules the child's [`RuleProfile`] builds for it. The resulting
//! batch is handed back to the caller to persist.
//!
//! Access checks ([`is_access_granted`], [`grant_access_or_fail`]) read a
//! settled policy and never mutate it.
//!
//! The crate performs no I/O and holds no state between calls.

#![forbid(unsafe_code)]

pub mod builders;
pub mod errors;
pub mod evaluation;
pub mod inheritance;
pub mod policy;
pub mod propagation;
pub mod rules;

pub use builders::{
    CommunityRole, CredentialRuleTemplate, DerivationTemplate, LocalRules, ParentAdjustment,
    PropagationContext, RuleProfile, RuleProfileRegistry,
};
pub use errors::{AuthorizationError, AuthorizationResult};
pub use evaluation::{
    effective_privileges, grant_access_or_fail, is_access_granted, matching_rules, Actor,
    PolicyEvaluator,
};
pub use inheritance::inherit;
pub use policy::{AuthorizationPolicy, ResourceKind};
pub use propagation::{
    propagate, ChildRelation, ContributionType, NodeFacts, NodeLoader, PolicyPropagator,
    SecurableNode, Visibility,
};
pub use rules::{
    Credential, CredentialCriterion, CredentialKind, CredentialRule, GlobalRole, Privilege,
    PrivilegeDerivationRule, UnknownPrivilege,
};
