//! Rule builders
//!
//! Local rules for a node come from the profile registered for its kind.
//! Profiles are composed from a handful of primitives (creator override,
//! elevated-role override, privilege expansion) so adding a resource kind is
//! a registry entry rather than new engine code.

mod context;
pub mod primitives;
mod profile;
mod registry;

pub use context::PropagationContext;
pub use profile::{
    CommunityRole, CredentialRuleTemplate, DerivationTemplate, LocalRules, ParentAdjustment,
    RuleProfile, DRAFT_READ_RULE,
};
pub use registry::{names, RuleProfileRegistry};
