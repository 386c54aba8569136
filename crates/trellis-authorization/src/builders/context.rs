//! Entity-independent inputs to rule building

use crate::rules::{CredentialCriterion, CredentialKind};
use serde::{Deserialize, Serialize};

/// Credentials describing the community that encloses the tree being propagated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationContext {
    /// Criteria identifying the community's administrators
    pub community_admins: Vec<CredentialCriterion>,
    /// Criteria identifying the community's members (contributors)
    pub community_members: Vec<CredentialCriterion>,
    /// Global kinds that always receive elevated privileges
    pub global_admin_kinds: Vec<CredentialKind>,
}

impl Default for PropagationContext {
    fn default() -> Self {
        Self {
            community_admins: Vec::new(),
            community_members: Vec::new(),
            global_admin_kinds: vec![CredentialKind::global_admin()],
        }
    }
}

impl PropagationContext {
    /// Context for a community identified by `space_id`
    pub fn for_space(space_id: &str) -> Self {
        Self {
            community_admins: vec![CredentialCriterion::new(
                CredentialKind::space_admin(),
                space_id,
            )],
            community_members: vec![CredentialCriterion::new(
                CredentialKind::space_member(),
                space_id,
            )],
            ..Self::default()
        }
    }

    /// Wildcard criteria for the global admin kinds
    pub fn global_admin_criteria(&self) -> impl Iterator<Item = CredentialCriterion> + '_ {
        self.global_admin_kinds
            .iter()
            .cloned()
            .map(CredentialCriterion::wildcard)
    }
}
