//! Reusable rule shapes the per-kind profiles are assembled from

use super::PropagationContext;
use crate::rules::{CredentialCriterion, CredentialKind, CredentialRule, Privilege, PrivilegeDerivationRule};
use trellis_core::ActorId;

/// Grant `privileges` to the self-management credential of `creator`
///
/// Returns `None` for an empty creator id: an empty scope would match every
/// self-management credential.
pub fn creator_override(
    name: &str,
    privileges: impl IntoIterator<Item = Privilege>,
    creator: &ActorId,
) -> Option<CredentialRule> {
    creator_criterion(creator).map(|criterion| CredentialRule::new(name, privileges, [criterion]))
}

/// Self-management criterion scoped to `creator`, unless the id is empty
pub(crate) fn creator_criterion(creator: &ActorId) -> Option<CredentialCriterion> {
    (!creator.as_str().is_empty())
        .then(|| CredentialCriterion::new(CredentialKind::self_management(), creator.as_str()))
}

/// Grant a narrow privilege to community admins and global admins, on this
/// node only
pub fn elevated_role_override(
    name: &str,
    privileges: impl IntoIterator<Item = Privilege>,
    ctx: &PropagationContext,
) -> CredentialRule {
    let criteria = dedup_criteria(
        ctx.community_admins
            .iter()
            .cloned()
            .chain(ctx.global_admin_criteria()),
    );
    CredentialRule::new(name, privileges, criteria).with_cascade(false)
}

/// Holding any of `coarse` also grants each of `fine`, one rule per fine
/// privilege named `{name}-{fine}`
pub fn coarse_to_fine(
    name: &str,
    coarse: &[Privilege],
    fine: impl IntoIterator<Item = Privilege>,
) -> Vec<PrivilegeDerivationRule> {
    fine.into_iter()
        .map(|privilege| {
            PrivilegeDerivationRule::new(
                format!("{name}-{privilege}"),
                coarse.iter().copied(),
                privilege,
            )
        })
        .collect()
}

/// Holding any of `fine` also grants `coarse`, so callers can test one privilege
pub fn fine_to_coarse(
    name: &str,
    fine: impl IntoIterator<Item = Privilege>,
    coarse: Privilege,
) -> PrivilegeDerivationRule {
    PrivilegeDerivationRule::new(name, fine, coarse)
}

/// Drop repeated criteria, keeping first occurrences in order
pub(crate) fn dedup_criteria(
    criteria: impl IntoIterator<Item = CredentialCriterion>,
) -> Vec<CredentialCriterion> {
    let mut unique: Vec<CredentialCriterion> = Vec::new();
    for criterion in criteria {
        if !unique.contains(&criterion) {
            unique.push(criterion);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Credential;

    #[test]
    fn creator_override_is_scoped_to_creator() {
        let rule = creator_override("post-created-by", Privilege::LIFECYCLE, &ActorId::new("user-42"))
            .unwrap();
        assert!(rule.cascade());
        assert!(rule.matches_any(&[Credential::new(CredentialKind::self_management(), "user-42")]));
        assert!(!rule.matches_any(&[Credential::new(CredentialKind::self_management(), "user-43")]));
    }

    #[test]
    fn empty_creator_gets_no_rule() {
        assert!(creator_override("post-created-by", Privilege::LIFECYCLE, &ActorId::new("")).is_none());
        assert!(creator_criterion(&ActorId::new("")).is_none());
    }

    #[test]
    fn elevated_override_never_cascades() {
        let mut ctx = PropagationContext::for_space("space-1");
        ctx.global_admin_kinds.push(CredentialKind::global_admin());

        let rule = elevated_role_override("contribution-move", [Privilege::MoveContribution], &ctx);
        assert!(!rule.cascade());
        assert_eq!(rule.criteria().len(), 2, "duplicate admin kinds collapse");
        assert!(rule.matches_any(&[Credential::new(CredentialKind::space_admin(), "space-1")]));
        assert!(rule.matches_any(&[Credential::global(CredentialKind::global_admin())]));
        assert!(!rule.matches_any(&[Credential::new(CredentialKind::space_member(), "space-1")]));
    }

    #[test]
    fn coarse_to_fine_emits_one_rule_per_fine_privilege() {
        let rules = coarse_to_fine(
            "framing",
            &[Privilege::Update],
            [Privilege::UpdateContent, Privilege::UpdateCalloutPublisher],
        );
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name(), "framing-update-content");
        assert!(rules.iter().all(|r| r.source_privileges().contains(&Privilege::Update)));
    }

    #[test]
    fn fine_to_coarse_collapses_sources() {
        let rule = fine_to_coarse(
            "any-create",
            [Privilege::CreatePost, Privilege::CreateMemo],
            Privilege::Create,
        );
        assert_eq!(rule.granted_privilege(), Privilege::Create);
        assert_eq!(rule.source_privileges().len(), 2);
    }
}
