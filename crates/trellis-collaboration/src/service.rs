//! Structural mutations over collaboration trees
//!
//! Every mutation runs against a staged copy of the tree: the edit is applied,
//! the affected subtree is re-propagated from its settled parent policy, the
//! resulting batch is persisted, and only then does the staged copy replace
//! the live one. A failure at any step leaves the live tree and the store as
//! they were.

use crate::graph::ContentGraph;
use crate::store::PolicyStore;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};
use trellis_authorization::{
    Actor, AuthorizationError, AuthorizationPolicy, ContributionType, NodeFacts, PolicyEvaluator,
    PolicyPropagator, Privilege, PropagationContext, ResourceKind, RuleProfileRegistry,
    SecurableNode, Visibility,
};
use trellis_core::{AuthorizationConfig, NodeId, Result, TrellisError};

/// What a collaboration tree hangs off: the enclosing space's policy and
/// the community credentials its rules are built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaborationScope {
    pub parent_policy: AuthorizationPolicy,
    pub context: PropagationContext,
}

/// Ids produced by [`CollaborationService::add_contribution`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedContribution {
    pub contribution: NodeId,
    /// The wrapped post, whiteboard, link or memo, when one was supplied
    pub resource: Option<NodeId>,
}

#[derive(Debug, Clone, Default)]
struct ServiceState {
    graph: ContentGraph,
    scopes: HashMap<NodeId, CollaborationScope>,
}

/// Owns collaboration trees and keeps their policies consistent
pub struct CollaborationService<S> {
    state: RwLock<ServiceState>,
    store: S,
    profiles: RuleProfileRegistry,
    evaluator: PolicyEvaluator,
}

impl<S: PolicyStore> CollaborationService<S> {
    /// Service using the default rule profiles
    pub fn new(store: S, config: AuthorizationConfig) -> Self {
        Self::with_profiles(store, config, RuleProfileRegistry::default())
    }

    pub fn with_profiles(
        store: S,
        config: AuthorizationConfig,
        profiles: RuleProfileRegistry,
    ) -> Self {
        Self {
            state: RwLock::new(ServiceState::default()),
            store,
            profiles,
            evaluator: PolicyEvaluator::new(config),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create a collaboration at the root of a new tree
    pub async fn create_collaboration(
        &self,
        scope: CollaborationScope,
        facts: NodeFacts,
    ) -> Result<NodeId> {
        let id = self
            .mutate(|state| {
                let id = state.graph.insert_root(ResourceKind::Collaboration, facts);
                state.scopes.insert(id, scope);
                Ok((id, id))
            })
            .await?;
        info!(collaboration = %id, "Collaboration created");
        Ok(id)
    }

    pub async fn add_callout(&self, collaboration: NodeId, facts: NodeFacts) -> Result<NodeId> {
        self.add_child(collaboration, ResourceKind::Callout, facts).await
    }

    /// Create any structurally valid child (framing, comments, ...) under `parent`
    pub async fn add_child(
        &self,
        parent: NodeId,
        kind: ResourceKind,
        facts: NodeFacts,
    ) -> Result<NodeId> {
        let id = self
            .mutate(|state| {
                let id = state.graph.attach(parent, kind, facts)?;
                Ok((id, id))
            })
            .await?;
        debug!(%parent, child = %id, %kind, "Child added");
        Ok(id)
    }

    /// Create a contribution, optionally together with the resource it wraps
    pub async fn add_contribution(
        &self,
        callout: NodeId,
        facts: NodeFacts,
        resource: Option<(ContributionType, NodeFacts)>,
    ) -> Result<AddedContribution> {
        self.mutate(|state| {
            let contribution = state
                .graph
                .attach(callout, ResourceKind::Contribution, facts)?;
            let resource = resource
                .map(|(kind, facts)| state.graph.attach(contribution, kind.resource_kind(), facts))
                .transpose()?;
            Ok((
                AddedContribution {
                    contribution,
                    resource,
                },
                contribution,
            ))
        })
        .await
    }

    /// Move a contribution to another callout
    ///
    /// Only the target callout's subtree is recomputed; the source callout's
    /// policies do not depend on its contributions.
    pub async fn move_contribution(&self, contribution: NodeId, target: NodeId) -> Result<()> {
        self.mutate(|state| {
            require_kind(&state.graph, contribution, ResourceKind::Contribution)?;
            require_kind(&state.graph, target, ResourceKind::Callout)?;
            state.graph.reparent(contribution, target)?;
            Ok(((), target))
        })
        .await?;
        info!(%contribution, callout = %target, "Contribution moved");
        Ok(())
    }

    /// Move a callout into another collaboration, possibly in another space
    pub async fn transfer_callout(&self, callout: NodeId, target: NodeId) -> Result<()> {
        self.mutate(|state| {
            require_kind(&state.graph, callout, ResourceKind::Callout)?;
            require_kind(&state.graph, target, ResourceKind::Collaboration)?;
            state.graph.reparent(callout, target)?;
            Ok(((), callout))
        })
        .await?;
        info!(%callout, collaboration = %target, "Callout transferred");
        Ok(())
    }

    pub async fn set_callout_visibility(
        &self,
        callout: NodeId,
        visibility: Visibility,
    ) -> Result<()> {
        self.mutate(|state| {
            require_kind(&state.graph, callout, ResourceKind::Callout)?;
            state
                .graph
                .update_facts(callout, |facts| facts.visibility = visibility)?;
            Ok(((), callout))
        })
        .await
    }

    /// Delete a node and everything below it, along with their policies
    pub async fn delete_node(&self, id: NodeId) -> Result<usize> {
        let mut state = self.state.write().await;
        let mut staged = state.clone();
        let removed = staged.graph.remove_subtree(id)?;
        staged.scopes.remove(&id);

        self.store.remove(&removed).await?;
        *state = staged;
        info!(node = %id, policies = removed.len(), "Subtree deleted");
        Ok(removed.len())
    }

    /// Recompute every policy of a collaboration tree, returning how many
    pub async fn reset_authorization(&self, collaboration: NodeId) -> Result<usize> {
        let ((), count) = self
            .mutate_counted(|state| {
                require_kind(&state.graph, collaboration, ResourceKind::Collaboration)?;
                Ok(((), collaboration))
            })
            .await?;
        info!(%collaboration, policies = count, "Authorization reset");
        Ok(count)
    }

    /// Fail with `PermissionDenied` unless `actor` holds `privilege` on `node`
    pub async fn authorize(
        &self,
        actor: &Actor,
        node: NodeId,
        privilege: Privilege,
        context: &str,
    ) -> Result<()> {
        let state = self.state.read().await;
        if !state.graph.contains(node) {
            return Err(AuthorizationError::NodeNotFound { id: node }.into());
        }
        self.evaluator
            .grant_access_or_fail(actor, state.graph.policy_of(node), privilege, context)
            .map_err(Into::into)
    }

    /// Current policy of a node
    pub async fn policy(&self, node: NodeId) -> Option<AuthorizationPolicy> {
        self.state.read().await.graph.policy_of(node).cloned()
    }

    pub async fn node(&self, id: NodeId) -> Option<SecurableNode> {
        self.state.read().await.graph.node(id).cloned()
    }

    pub async fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.state.read().await.graph.parent_of(id)
    }

    async fn mutate<T>(
        &self,
        edit: impl FnOnce(&mut ServiceState) -> Result<(T, NodeId)>,
    ) -> Result<T> {
        let (value, _) = self.mutate_counted(edit).await?;
        Ok(value)
    }

    async fn mutate_counted<T>(
        &self,
        edit: impl FnOnce(&mut ServiceState) -> Result<(T, NodeId)>,
    ) -> Result<(T, usize)> {
        let mut state = self.state.write().await;
        let mut staged = state.clone();
        let (value, subtree_root) = edit(&mut staged)?;

        let policies = self.propagate_subtree(&staged, subtree_root)?;
        let count = policies.len();
        staged.graph.apply_policies(&policies)?;
        self.store.persist_batch(policies).await?;

        *state = staged;
        debug!(root = %subtree_root, policies = count, "Mutation committed");
        Ok((value, count))
    }

    fn propagate_subtree(
        &self,
        state: &ServiceState,
        root: NodeId,
    ) -> Result<Vec<AuthorizationPolicy>> {
        let node = state
            .graph
            .node(root)
            .ok_or(AuthorizationError::NodeNotFound { id: root })?;
        let collaboration = state.graph.root_of(root);
        let scope = state.scopes.get(&collaboration).ok_or_else(|| {
            TrellisError::internal(format!("No collaboration scope for tree rooted at {collaboration}"))
        })?;

        let parent = match state.graph.parent_of(root) {
            Some(parent) => {
                let parent_kind = state
                    .graph
                    .node(parent)
                    .map(|n| n.kind)
                    .ok_or(AuthorizationError::NodeNotFound { id: parent })?;
                Some(state.graph.policy_of(parent).ok_or_else(|| {
                    AuthorizationError::not_initialized(parent_kind, parent, "parent authorization policy")
                })?)
            }
            None => Some(&scope.parent_policy),
        };

        let policies = PolicyPropagator::new(&state.graph, &self.profiles).propagate(
            root,
            node.kind,
            parent,
            &scope.context,
        )?;
        Ok(policies)
    }
}

fn require_kind(graph: &ContentGraph, id: NodeId, expected: ResourceKind) -> Result<()> {
    match graph.node(id) {
        Some(node) if node.kind == expected => Ok(()),
        Some(node) => Err(TrellisError::invalid(format!(
            "Expected {expected} at {id}, found {}",
            node.kind
        ))),
        None => Err(TrellisError::not_found(format!("Node not found: {id}"))),
    }
}
