//! Depth-first policy propagation over a content subtree

use super::{NodeLoader, SecurableNode};
use crate::builders::{LocalRules, PropagationContext, RuleProfileRegistry};
use crate::errors::{AuthorizationError, AuthorizationResult};
use crate::inheritance::inherit;
use crate::policy::{AuthorizationPolicy, ResourceKind};
use tracing::{debug, trace};
use trellis_core::NodeId;

/// Recomputes the policies of a subtree
///
/// Walks pre-order: a node's policy is settled before any of its children is
/// visited, and the children inherit from that settled policy. Nothing is
/// written anywhere; the caller receives every recomputed policy and decides
/// whether to persist the batch. Any failure aborts the whole walk.
pub struct PolicyPropagator<'a, L: ?Sized> {
    loader: &'a L,
    profiles: &'a RuleProfileRegistry,
}

impl<'a, L: NodeLoader + ?Sized> PolicyPropagator<'a, L> {
    pub fn new(loader: &'a L, profiles: &'a RuleProfileRegistry) -> Self {
        Self { loader, profiles }
    }

    /// Propagate from `node_id` using `parent` as the already-settled policy
    /// of its parent (`None` at the root of a tree)
    pub fn propagate(
        &self,
        node_id: NodeId,
        kind: ResourceKind,
        parent: Option<&AuthorizationPolicy>,
        ctx: &PropagationContext,
    ) -> AuthorizationResult<Vec<AuthorizationPolicy>> {
        let mut updated = Vec::new();
        self.visit(node_id, kind, parent, ctx, &mut updated)?;
        debug!(
            root = %node_id,
            %kind,
            policies = updated.len(),
            "Propagation complete"
        );
        Ok(updated)
    }

    fn visit(
        &self,
        node_id: NodeId,
        kind: ResourceKind,
        parent: Option<&AuthorizationPolicy>,
        ctx: &PropagationContext,
        updated: &mut Vec<AuthorizationPolicy>,
    ) -> AuthorizationResult<()> {
        let node = self.loader.load_node(&node_id)?;
        if node.kind != kind {
            return Err(AuthorizationError::KindMismatch {
                id: node_id,
                expected: kind,
                actual: node.kind,
            });
        }

        let policy = self.settle(&node, parent, ctx)?;
        updated.push(policy.clone());

        for relation in &node.children {
            match relation.id {
                Some(child_id) => self.visit(child_id, relation.kind, Some(&policy), ctx, updated)?,
                None => trace!(parent = %node.id, child_kind = %relation.kind, "Skipping absent child"),
            }
        }
        Ok(())
    }

    /// Inherit from the (possibly adjusted) parent, then layer local rules on top
    fn settle(
        &self,
        node: &SecurableNode,
        parent: Option<&AuthorizationPolicy>,
        ctx: &PropagationContext,
    ) -> AuthorizationResult<AuthorizationPolicy> {
        let current = node.policy.clone().ok_or_else(|| {
            AuthorizationError::not_initialized(node.kind, node.id, "authorization policy")
        })?;

        let profile = self.profiles.profile(node.kind);
        let parent = profile.adjust_parent(parent, node, ctx);
        let mut policy = inherit(current, parent.as_deref());
        let inherited = policy.credential_rules().len();

        let LocalRules {
            credential_rules,
            derivation_rules,
        } = profile.build_local_rules(node, ctx)?;
        let local = credential_rules.len();
        policy.append_credential_rules(credential_rules);
        policy.set_derivation_rules(derivation_rules);
        policy.validate_unique_names()?;

        debug!(
            node = %node.id,
            kind = %node.kind,
            inherited,
            local,
            derivations = policy.derivation_rules().len(),
            "Policy settled"
        );
        Ok(policy)
    }
}

/// Convenience wrapper around [`PolicyPropagator::propagate`]
pub fn propagate<L: NodeLoader + ?Sized>(
    loader: &L,
    profiles: &RuleProfileRegistry,
    node_id: NodeId,
    kind: ResourceKind,
    parent: Option<&AuthorizationPolicy>,
    ctx: &PropagationContext,
) -> AuthorizationResult<Vec<AuthorizationPolicy>> {
    PolicyPropagator::new(loader, profiles).propagate(node_id, kind, parent, ctx)
}
