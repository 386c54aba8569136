//! Kind-to-profile table

use super::profile::{
    CommunityRole, CredentialRuleTemplate, DerivationTemplate, ParentAdjustment, RuleProfile,
};
use crate::policy::ResourceKind;
use crate::rules::{CredentialKind, Privilege};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use trellis_core::config::ConfigValidator;
use trellis_core::{ConfigValidation, TrellisError};

/// Rule names produced by the default profiles
pub mod names {
    pub const COLLABORATION_ADMINS: &str = "collaboration-admins-update";
    pub const COLLABORATION_CONTRIBUTORS: &str = "collaboration-contributors-contribute";
    pub const CALLOUT_CREATED_BY: &str = "callout-created-by";
    pub const CALLOUT_PUBLISHER: &str = "callout-update-publisher";
    pub const CALLOUT_ALLOWED_CONTRIBUTIONS: &str = "callout-allowed-contributions";
    pub const CONTRIBUTION_CREATED_BY: &str = "contribution-created-by";
    pub const CONTRIBUTION_CREATED_BY_DELETE: &str = "contribution-created-by-delete";
    pub const CONTRIBUTION_MOVE: &str = "contribution-move";
    pub const POST_CREATED_BY: &str = "post-created-by";
    pub const LINK_CREATED_BY: &str = "link-created-by";
    pub const MEMO_CREATED_BY: &str = "memo-created-by";
    pub const WHITEBOARD_CREATED_BY: &str = "whiteboard-created-by";
    pub const WHITEBOARD_UPDATE_CONTENT: &str = "whiteboard-update-content";
    pub const COMMENTS_CONTRIBUTORS: &str = "comments-contributors-message";
    pub const COMMENTS_CONTRIBUTE_MESSAGE: &str = "comments-contribute-message";
    pub const FRAMING_UPDATE_CONTENT: &str = "framing-update-content";
}

static EMPTY_PROFILE: RuleProfile = RuleProfile::empty();

/// Maps each resource kind to the profile that builds its local rules
///
/// Kinds without a registered profile get no local rules and only inherit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleProfileRegistry {
    profiles: BTreeMap<ResourceKind, RuleProfile>,
}

impl RuleProfileRegistry {
    /// Registry with no profiles at all
    pub fn empty() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    /// Parse a registry from its JSON form and validate it
    pub fn from_json_str(content: &str) -> Result<Self, TrellisError> {
        let registry: Self = serde_json::from_str(content)?;
        registry.validate()?;
        Ok(registry)
    }

    /// Register a profile, returning the one it replaces
    pub fn register(&mut self, kind: ResourceKind, profile: RuleProfile) -> Option<RuleProfile> {
        self.profiles.insert(kind, profile)
    }

    pub fn profile(&self, kind: ResourceKind) -> &RuleProfile {
        self.profiles.get(&kind).unwrap_or(&EMPTY_PROFILE)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.profiles.keys().copied()
    }
}

impl ConfigValidation for RuleProfileRegistry {
    fn validate(&self) -> Result<(), TrellisError> {
        let mut validator = ConfigValidator::for_section("profiles");
        for (kind, profile) in &self.profiles {
            let duplicate = profile.duplicate_rule_name();
            validator.require(
                &kind.to_string(),
                duplicate.is_none(),
                &format!("rule '{}' is defined more than once", duplicate.unwrap_or_default()),
            );
        }
        validator.result().map_err(Into::into)
    }
}

impl Default for RuleProfileRegistry {
    fn default() -> Self {
        use names::*;
        use Privilege::*;

        let mut registry = Self::empty();

        registry.register(
            ResourceKind::Collaboration,
            RuleProfile::empty()
                .with_rule(CredentialRuleTemplate::community_role(
                    COLLABORATION_ADMINS,
                    &[Update],
                    CommunityRole::Admin,
                    true,
                ))
                .with_rule(CredentialRuleTemplate::community_role(
                    COLLABORATION_CONTRIBUTORS,
                    &[Contribute],
                    CommunityRole::Member,
                    true,
                )),
        );

        registry.register(
            ResourceKind::Callout,
            RuleProfile::empty()
                .with_rule(CredentialRuleTemplate::creator(
                    CALLOUT_CREATED_BY,
                    &Privilege::LIFECYCLE,
                    true,
                ))
                .with_rule(CredentialRuleTemplate::global_kinds(
                    CALLOUT_PUBLISHER,
                    &[UpdateCalloutPublisher],
                    &[CredentialKind::GLOBAL_ADMIN, CredentialKind::GLOBAL_SUPPORT],
                    false,
                ))
                .with_derivation(DerivationTemplate::allowed_contributions(
                    CALLOUT_ALLOWED_CONTRIBUTIONS,
                    &[Create, Contribute],
                ))
                .with_parent_adjustment(ParentAdjustment::DraftVisibility),
        );

        registry.register(
            ResourceKind::Contribution,
            RuleProfile::empty()
                .with_rule(CredentialRuleTemplate::creator(
                    CONTRIBUTION_CREATED_BY,
                    &[Create, Read, Update],
                    true,
                ))
                .with_rule(CredentialRuleTemplate::creator(
                    CONTRIBUTION_CREATED_BY_DELETE,
                    &[Delete],
                    false,
                ))
                .with_rule(CredentialRuleTemplate::elevated_role(
                    CONTRIBUTION_MOVE,
                    &[MoveContribution],
                )),
        );

        for (kind, name) in [
            (ResourceKind::Post, POST_CREATED_BY),
            (ResourceKind::Link, LINK_CREATED_BY),
            (ResourceKind::Memo, MEMO_CREATED_BY),
        ] {
            registry.register(
                kind,
                RuleProfile::empty().with_rule(CredentialRuleTemplate::creator(
                    name,
                    &Privilege::LIFECYCLE,
                    true,
                )),
            );
        }

        registry.register(
            ResourceKind::Whiteboard,
            RuleProfile::empty()
                .with_rule(CredentialRuleTemplate::creator(
                    WHITEBOARD_CREATED_BY,
                    &Privilege::LIFECYCLE,
                    true,
                ))
                .with_derivation(DerivationTemplate::fixed(
                    WHITEBOARD_UPDATE_CONTENT,
                    &[Update],
                    UpdateContent,
                )),
        );

        registry.register(
            ResourceKind::Comments,
            RuleProfile::empty()
                .with_rule(CredentialRuleTemplate::community_role(
                    COMMENTS_CONTRIBUTORS,
                    &[CreateMessage],
                    CommunityRole::Member,
                    true,
                ))
                .with_derivation(DerivationTemplate::fixed(
                    COMMENTS_CONTRIBUTE_MESSAGE,
                    &[Contribute],
                    CreateMessage,
                )),
        );

        registry.register(
            ResourceKind::CalloutFraming,
            RuleProfile::empty().with_derivation(DerivationTemplate::fixed(
                FRAMING_UPDATE_CONTENT,
                &[Update],
                UpdateContent,
            )),
        );

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_is_valid() {
        let registry = RuleProfileRegistry::default();
        registry.validate().unwrap();
        assert!(registry.kinds().all(|kind| kind != ResourceKind::InMemory));
        assert!(registry.profile(ResourceKind::InMemory).credential_rules.is_empty());
    }

    #[test]
    fn duplicate_template_names_fail_validation() {
        let mut registry = RuleProfileRegistry::empty();
        registry.register(
            ResourceKind::Post,
            RuleProfile::empty()
                .with_rule(CredentialRuleTemplate::creator("dup", &[Privilege::Read], true))
                .with_rule(CredentialRuleTemplate::elevated_role("dup", &[Privilege::Delete])),
        );
        let err = registry.validate().unwrap_err();
        assert!(err.to_string().contains("'dup'"));
    }

    #[test]
    fn profiles_load_from_json() {
        let registry = RuleProfileRegistry::from_json_str(
            r#"{
                "memo": {
                    "credential_rules": [
                        { "template": "creator", "name": "memo-owner", "privileges": ["read", "update"] },
                        {
                            "template": "global-kinds",
                            "name": "support-read",
                            "privileges": ["read"],
                            "kinds": ["GlobalSupport"],
                            "cascade": false
                        }
                    ],
                    "derivations": [
                        { "template": "fixed", "name": "memo-content", "source": ["update"], "granted": "update-content" }
                    ]
                }
            }"#,
        )
        .unwrap();

        let profile = registry.profile(ResourceKind::Memo);
        assert_eq!(profile.credential_rules.len(), 2);
        assert!(matches!(
            &profile.credential_rules[0],
            CredentialRuleTemplate::Creator { cascade: true, .. }
        ));
        assert_eq!(profile.parent_adjustment, None);
    }
}
