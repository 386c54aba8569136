//! Rule templates and the per-kind profiles built from them
//!
//! A profile is plain data. Instantiating it against a node and a
//! [`PropagationContext`] yields the node's local rules; everything
//! kind-specific about rule building lives in the templates, not in code.

use super::primitives::{
    coarse_to_fine, creator_criterion, creator_override, dedup_criteria, elevated_role_override,
    fine_to_coarse,
};
use super::PropagationContext;
use crate::errors::{AuthorizationError, AuthorizationResult};
use crate::policy::AuthorizationPolicy;
use crate::propagation::{SecurableNode, Visibility};
use crate::rules::{
    CredentialCriterion, CredentialKind, CredentialRule, Privilege, PrivilegeDerivationRule,
};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeSet;

/// Name of the rule a draft callout adds to its adjusted parent policy
pub const DRAFT_READ_RULE: &str = "callout-draft-read";

fn cascade_by_default() -> bool {
    true
}

/// Which community credential set a template targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommunityRole {
    Admin,
    Member,
}

/// Recipe for one credential rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "kebab-case")]
pub enum CredentialRuleTemplate {
    /// Scoped to the node's creator; produces nothing when no creator is recorded
    Creator {
        name: String,
        privileges: Vec<Privilege>,
        #[serde(default = "cascade_by_default")]
        cascade: bool,
    },
    /// Community admins plus global admin kinds, never cascading
    ElevatedRole {
        name: String,
        privileges: Vec<Privilege>,
    },
    /// Community admins or members, plus global admin kinds
    CommunityRole {
        name: String,
        privileges: Vec<Privilege>,
        role: CommunityRole,
        #[serde(default = "cascade_by_default")]
        cascade: bool,
    },
    /// Fixed set of global credential kinds
    GlobalKinds {
        name: String,
        privileges: Vec<Privilege>,
        kinds: Vec<CredentialKind>,
        #[serde(default = "cascade_by_default")]
        cascade: bool,
    },
}

impl CredentialRuleTemplate {
    pub fn creator(name: &str, privileges: &[Privilege], cascade: bool) -> Self {
        Self::Creator {
            name: name.to_string(),
            privileges: privileges.to_vec(),
            cascade,
        }
    }

    pub fn elevated_role(name: &str, privileges: &[Privilege]) -> Self {
        Self::ElevatedRole {
            name: name.to_string(),
            privileges: privileges.to_vec(),
        }
    }

    pub fn community_role(
        name: &str,
        privileges: &[Privilege],
        role: CommunityRole,
        cascade: bool,
    ) -> Self {
        Self::CommunityRole {
            name: name.to_string(),
            privileges: privileges.to_vec(),
            role,
            cascade,
        }
    }

    pub fn global_kinds(
        name: &str,
        privileges: &[Privilege],
        kinds: &[&str],
        cascade: bool,
    ) -> Self {
        Self::GlobalKinds {
            name: name.to_string(),
            privileges: privileges.to_vec(),
            kinds: kinds.iter().map(|k| CredentialKind::new(*k)).collect(),
            cascade,
        }
    }

    /// Name of the rule this template produces
    pub fn name(&self) -> &str {
        match self {
            Self::Creator { name, .. }
            | Self::ElevatedRole { name, .. }
            | Self::CommunityRole { name, .. }
            | Self::GlobalKinds { name, .. } => name,
        }
    }

    /// Build the rule for `node`, if the template applies to it
    pub fn instantiate(
        &self,
        node: &SecurableNode,
        ctx: &PropagationContext,
    ) -> Option<CredentialRule> {
        match self {
            Self::Creator {
                name,
                privileges,
                cascade,
            } => node
                .facts
                .created_by
                .as_ref()
                .and_then(|creator| creator_override(name, privileges.iter().copied(), creator))
                .map(|rule| rule.with_cascade(*cascade)),
            Self::ElevatedRole { name, privileges } => Some(elevated_role_override(
                name,
                privileges.iter().copied(),
                ctx,
            )),
            Self::CommunityRole {
                name,
                privileges,
                role,
                cascade,
            } => {
                let community = match role {
                    CommunityRole::Admin => &ctx.community_admins,
                    CommunityRole::Member => &ctx.community_members,
                };
                let criteria =
                    dedup_criteria(community.iter().cloned().chain(ctx.global_admin_criteria()));
                Some(
                    CredentialRule::new(name.as_str(), privileges.iter().copied(), criteria)
                        .with_cascade(*cascade),
                )
            }
            Self::GlobalKinds {
                name,
                privileges,
                kinds,
                cascade,
            } => Some(
                CredentialRule::from_kinds(
                    name.as_str(),
                    privileges.iter().copied(),
                    kinds.iter().cloned(),
                )
                .with_cascade(*cascade),
            ),
        }
    }
}

/// Recipe for derivation rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "template", rename_all = "kebab-case")]
pub enum DerivationTemplate {
    /// A single rule, independent of the node
    Fixed {
        name: String,
        source: Vec<Privilege>,
        granted: Privilege,
    },
    /// One rule per contribution type the node accepts, granting its creation privilege
    AllowedContributions { name: String, source: Vec<Privilege> },
}

impl DerivationTemplate {
    pub fn fixed(name: &str, source: &[Privilege], granted: Privilege) -> Self {
        Self::Fixed {
            name: name.to_string(),
            source: source.to_vec(),
            granted,
        }
    }

    pub fn allowed_contributions(name: &str, source: &[Privilege]) -> Self {
        Self::AllowedContributions {
            name: name.to_string(),
            source: source.to_vec(),
        }
    }

    pub fn instantiate(&self, node: &SecurableNode) -> Vec<PrivilegeDerivationRule> {
        match self {
            Self::Fixed {
                name,
                source,
                granted,
            } => vec![fine_to_coarse(name, source.iter().copied(), *granted)],
            Self::AllowedContributions { name, source } => {
                let types: BTreeSet<_> = node.facts.allowed_contributions.iter().copied().collect();
                coarse_to_fine(
                    name,
                    source,
                    types.into_iter().map(|contribution| contribution.creation_privilege()),
                )
            }
        }
    }
}

/// Rewrites the parent policy a node inherits from before inheritance runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParentAdjustment {
    /// Draft, non-template callouts are readable only by admins and their creator
    DraftVisibility,
}

impl ParentAdjustment {
    fn applies_to(&self, node: &SecurableNode) -> bool {
        match self {
            Self::DraftVisibility => {
                node.facts.visibility == Visibility::Draft && !node.facts.is_template
            }
        }
    }

    fn adjust(
        &self,
        parent: &AuthorizationPolicy,
        node: &SecurableNode,
        ctx: &PropagationContext,
    ) -> AuthorizationPolicy {
        match self {
            Self::DraftVisibility => {
                let mut adjusted =
                    AuthorizationPolicy::with_id(parent.id(), parent.resource_kind());
                adjusted.extend_credential_rules(
                    parent
                        .credential_rules()
                        .iter()
                        .filter_map(|rule| rule.without_privilege(Privilege::Read)),
                );

                let creator = node.facts.created_by.as_ref().and_then(creator_criterion);
                let criteria = dedup_criteria(
                    ctx.global_admin_criteria()
                        .chain([CredentialCriterion::wildcard(CredentialKind::global_support())])
                        .chain(ctx.community_admins.iter().cloned())
                        .chain(creator),
                );
                adjusted.upsert_credential_rule(CredentialRule::new(
                    DRAFT_READ_RULE,
                    [Privilege::Read],
                    criteria,
                ));
                adjusted
            }
        }
    }
}

/// Rules a node contributes on top of what it inherits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalRules {
    pub credential_rules: Vec<CredentialRule>,
    pub derivation_rules: Vec<PrivilegeDerivationRule>,
}

/// Everything needed to build one resource kind's local rules
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleProfile {
    pub credential_rules: Vec<CredentialRuleTemplate>,
    pub derivations: Vec<DerivationTemplate>,
    pub parent_adjustment: Option<ParentAdjustment>,
}

impl RuleProfile {
    pub const fn empty() -> Self {
        Self {
            credential_rules: Vec::new(),
            derivations: Vec::new(),
            parent_adjustment: None,
        }
    }

    pub fn with_rule(mut self, template: CredentialRuleTemplate) -> Self {
        self.credential_rules.push(template);
        self
    }

    pub fn with_derivation(mut self, template: DerivationTemplate) -> Self {
        self.derivations.push(template);
        self
    }

    pub fn with_parent_adjustment(mut self, adjustment: ParentAdjustment) -> Self {
        self.parent_adjustment = Some(adjustment);
        self
    }

    /// Instantiate every template against `node`
    ///
    /// Fails with `NotInitialized` when the node carries no policy: policies
    /// are created with their entity and are never conjured up here.
    pub fn build_local_rules(
        &self,
        node: &SecurableNode,
        ctx: &PropagationContext,
    ) -> AuthorizationResult<LocalRules> {
        if node.policy.is_none() {
            return Err(AuthorizationError::not_initialized(
                node.kind,
                node.id,
                "authorization policy",
            ));
        }

        Ok(LocalRules {
            credential_rules: self
                .credential_rules
                .iter()
                .filter_map(|template| template.instantiate(node, ctx))
                .collect(),
            derivation_rules: self
                .derivations
                .iter()
                .flat_map(|template| template.instantiate(node))
                .collect(),
        })
    }

    /// Parent policy the node should inherit from
    pub fn adjust_parent<'a>(
        &self,
        parent: Option<&'a AuthorizationPolicy>,
        node: &SecurableNode,
        ctx: &PropagationContext,
    ) -> Option<Cow<'a, AuthorizationPolicy>> {
        let parent = parent?;
        match self.parent_adjustment {
            Some(adjustment) if adjustment.applies_to(node) => {
                Some(Cow::Owned(adjustment.adjust(parent, node, ctx)))
            }
            _ => Some(Cow::Borrowed(parent)),
        }
    }

    /// First credential rule name produced by two templates, if any
    pub fn duplicate_rule_name(&self) -> Option<&str> {
        let mut seen = BTreeSet::new();
        self.credential_rules
            .iter()
            .map(CredentialRuleTemplate::name)
            .find(|name| !seen.insert(*name))
    }
}
