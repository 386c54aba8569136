//! Content tree of a collaboration
//!
//! Nodes reference each other by id only. Each node kind has a fixed set of
//! child slots: single slots are always listed on the node, empty or not,
//! while multi slots list one relation per child.

use std::collections::HashMap;
use trellis_authorization::{
    AuthorizationError, AuthorizationPolicy, AuthorizationResult, ChildRelation, NodeFacts,
    NodeLoader, ResourceKind, SecurableNode,
};
use trellis_core::{NodeId, PolicyId, Result, TrellisError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cardinality {
    One,
    Many,
}

fn child_slots(kind: ResourceKind) -> &'static [(ResourceKind, Cardinality)] {
    use Cardinality::*;
    use ResourceKind::*;
    match kind {
        Collaboration => &[(Callout, Many)],
        Callout => &[(CalloutFraming, One), (Comments, One), (Contribution, Many)],
        CalloutFraming => &[(Whiteboard, One), (Memo, One)],
        Contribution => &[(Post, One), (Whiteboard, One), (Link, One), (Memo, One)],
        Post => &[(Comments, One)],
        Whiteboard | Link | Memo | Comments | InMemory => &[],
    }
}

fn cardinality(parent: ResourceKind, child: ResourceKind) -> Option<Cardinality> {
    child_slots(parent)
        .iter()
        .find(|(kind, _)| *kind == child)
        .map(|(_, cardinality)| *cardinality)
}

/// Nodes plus parent links
#[derive(Debug, Clone, Default)]
pub struct ContentGraph {
    nodes: HashMap<NodeId, SecurableNode>,
    parents: HashMap<NodeId, NodeId>,
    policy_owners: HashMap<PolicyId, NodeId>,
}

impl ContentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SecurableNode> {
        self.nodes.get(&id)
    }

    pub fn policy_of(&self, id: NodeId) -> Option<&AuthorizationPolicy> {
        self.nodes.get(&id).and_then(|node| node.policy.as_ref())
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.parents.get(&id).copied()
    }

    /// Topmost ancestor of `id` (itself when it has no parent)
    pub fn root_of(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent_of(current) {
            current = parent;
        }
        current
    }

    /// Create a node with no parent
    pub fn insert_root(&mut self, kind: ResourceKind, facts: NodeFacts) -> NodeId {
        let mut node = SecurableNode::new(kind, facts);
        node.children = child_slots(kind)
            .iter()
            .filter(|(_, cardinality)| *cardinality == Cardinality::One)
            .map(|(slot, _)| ChildRelation::absent(*slot))
            .collect();

        let id = node.id;
        if let Some(policy) = &node.policy {
            self.policy_owners.insert(policy.id(), id);
        }
        self.nodes.insert(id, node);
        id
    }

    /// Create a node under `parent`
    pub fn attach(&mut self, parent: NodeId, kind: ResourceKind, facts: NodeFacts) -> Result<NodeId> {
        self.check_accepts(parent, kind)?;
        let id = self.insert_root(kind, facts);
        self.link(parent, id, kind)?;
        Ok(id)
    }

    /// Move `id` and its subtree under `new_parent`
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        let kind = self.require(id)?.kind;
        let old_parent = self
            .parent_of(id)
            .ok_or_else(|| TrellisError::invalid(format!("{kind} {id} has no parent to move from")))?;
        self.check_accepts(new_parent, kind)?;

        let mut ancestor = Some(new_parent);
        while let Some(current) = ancestor {
            if current == id {
                return Err(TrellisError::invalid(format!(
                    "Cannot move {kind} {id} into its own subtree"
                )));
            }
            ancestor = self.parent_of(current);
        }

        self.unlink(old_parent, id)?;
        self.link(new_parent, id, kind)
    }

    /// Remove `id` and everything below it, returning the removed policies' ids
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<Vec<PolicyId>> {
        self.require(id)?;
        if let Some(parent) = self.parent_of(id) {
            self.unlink(parent, id)?;
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            self.parents.remove(&current);
            if let Some(node) = self.nodes.remove(&current) {
                pending.extend(node.present_children().map(|(_, child)| child));
                if let Some(policy) = node.policy {
                    self.policy_owners.remove(&policy.id());
                    removed.push(policy.id());
                }
            }
        }
        Ok(removed)
    }

    /// Edit the facts rule builders read
    pub fn update_facts(&mut self, id: NodeId, edit: impl FnOnce(&mut NodeFacts)) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or_else(|| TrellisError::not_found(format!("Node not found: {id}")))?;
        edit(&mut node.facts);
        Ok(())
    }

    /// Store a propagated batch on the nodes owning each policy
    ///
    /// Every owner is checked before anything is written.
    pub fn apply_policies(&mut self, policies: &[AuthorizationPolicy]) -> Result<()> {
        let owners = policies
            .iter()
            .map(|policy| {
                self.policy_owners.get(&policy.id()).copied().ok_or_else(|| {
                    TrellisError::internal(format!("No node owns {}", policy.id()))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for (owner, policy) in owners.into_iter().zip(policies) {
            if let Some(node) = self.nodes.get_mut(&owner) {
                node.policy = Some(policy.clone());
            }
        }
        Ok(())
    }

    fn require(&self, id: NodeId) -> Result<&SecurableNode> {
        self.nodes
            .get(&id)
            .ok_or_else(|| TrellisError::not_found(format!("Node not found: {id}")))
    }

    fn check_accepts(&self, parent: NodeId, kind: ResourceKind) -> Result<()> {
        let parent_node = self.require(parent)?;
        match cardinality(parent_node.kind, kind) {
            None => Err(TrellisError::invalid(format!(
                "A {} cannot hold a {kind}",
                parent_node.kind
            ))),
            Some(Cardinality::One)
                if parent_node
                    .children
                    .iter()
                    .any(|r| r.kind == kind && r.id.is_some()) =>
            {
                Err(TrellisError::invalid(format!(
                    "{} {parent} already has a {kind}",
                    parent_node.kind
                )))
            }
            Some(_) => Ok(()),
        }
    }

    fn link(&mut self, parent: NodeId, child: NodeId, kind: ResourceKind) -> Result<()> {
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or_else(|| TrellisError::not_found(format!("Node not found: {parent}")))?;

        match cardinality(parent_node.kind, kind) {
            Some(Cardinality::One) => {
                let empty_slot = parent_node
                    .children
                    .iter()
                    .position(|r| r.kind == kind && r.id.is_none());
                match empty_slot {
                    Some(index) => parent_node.children[index].id = Some(child),
                    None => parent_node.children.push(ChildRelation::present(kind, child)),
                }
            }
            Some(Cardinality::Many) => parent_node
                .children
                .push(ChildRelation::present(kind, child)),
            None => {
                return Err(TrellisError::invalid(format!(
                    "A {} cannot hold a {kind}",
                    parent_node.kind
                )))
            }
        }
        self.parents.insert(child, parent);
        Ok(())
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or_else(|| TrellisError::not_found(format!("Node not found: {parent}")))?;
        let kind = parent_node.kind;
        parent_node.children.retain_mut(|relation| {
            if relation.id != Some(child) {
                return true;
            }
            match cardinality(kind, relation.kind) {
                Some(Cardinality::One) => {
                    relation.id = None;
                    true
                }
                _ => false,
            }
        });
        self.parents.remove(&child);
        Ok(())
    }
}

impl NodeLoader for ContentGraph {
    fn load_node(&self, id: &NodeId) -> AuthorizationResult<SecurableNode> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or(AuthorizationError::NodeNotFound { id: *id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collaboration_with_callout() -> (ContentGraph, NodeId, NodeId) {
        let mut graph = ContentGraph::new();
        let collaboration = graph.insert_root(ResourceKind::Collaboration, NodeFacts::default());
        let callout = graph
            .attach(collaboration, ResourceKind::Callout, NodeFacts::created_by("user-1"))
            .unwrap();
        (graph, collaboration, callout)
    }

    #[test]
    fn single_slots_are_listed_even_when_empty() {
        let (graph, _, callout) = collaboration_with_callout();
        let node = graph.node(callout).unwrap();
        assert_eq!(
            node.children,
            vec![
                ChildRelation::absent(ResourceKind::CalloutFraming),
                ChildRelation::absent(ResourceKind::Comments),
            ]
        );
    }

    #[test]
    fn single_slot_fills_once() {
        let (mut graph, _, callout) = collaboration_with_callout();
        let comments = graph
            .attach(callout, ResourceKind::Comments, NodeFacts::default())
            .unwrap();
        assert!(graph
            .node(callout)
            .unwrap()
            .children
            .contains(&ChildRelation::present(ResourceKind::Comments, comments)));

        let err = graph
            .attach(callout, ResourceKind::Comments, NodeFacts::default())
            .unwrap_err();
        assert!(matches!(err, TrellisError::Invalid { .. }));
    }

    #[test]
    fn rejects_structurally_invalid_children() {
        let (mut graph, collaboration, _) = collaboration_with_callout();
        let err = graph
            .attach(collaboration, ResourceKind::Post, NodeFacts::default())
            .unwrap_err();
        assert!(matches!(err, TrellisError::Invalid { .. }));
    }

    #[test]
    fn reparent_moves_links_and_refuses_cycles() {
        let (mut graph, collaboration, callout_a) = collaboration_with_callout();
        let callout_b = graph
            .attach(collaboration, ResourceKind::Callout, NodeFacts::default())
            .unwrap();
        let contribution = graph
            .attach(callout_a, ResourceKind::Contribution, NodeFacts::default())
            .unwrap();

        graph.reparent(contribution, callout_b).unwrap();
        assert_eq!(graph.parent_of(contribution), Some(callout_b));
        assert!(graph.node(callout_a).unwrap().present_children().next().is_none());
        assert_eq!(graph.root_of(contribution), collaboration);

        let err = graph.reparent(collaboration, callout_b).unwrap_err();
        assert!(matches!(err, TrellisError::Invalid { .. }));
    }

    #[test]
    fn remove_subtree_reports_policies() {
        let (mut graph, collaboration, callout) = collaboration_with_callout();
        let contribution = graph
            .attach(callout, ResourceKind::Contribution, NodeFacts::default())
            .unwrap();
        let post = graph
            .attach(contribution, ResourceKind::Post, NodeFacts::default())
            .unwrap();
        let expected: Vec<_> = [callout, contribution, post]
            .iter()
            .map(|id| graph.policy_of(*id).unwrap().id())
            .collect();

        let mut removed = graph.remove_subtree(callout).unwrap();
        removed.sort();
        let mut expected = expected;
        expected.sort();
        assert_eq!(removed, expected);
        assert_eq!(graph.len(), 1);
        assert!(graph.node(collaboration).unwrap().children.is_empty());
        assert!(graph.load_node(&post).is_err());
    }

    #[test]
    fn apply_rejects_unknown_policies_without_writing() {
        let (mut graph, collaboration, _) = collaboration_with_callout();
        let mut known = graph.policy_of(collaboration).unwrap().clone();
        known.upsert_credential_rule(trellis_authorization::CredentialRule::registered_access(
            "read",
            [trellis_authorization::Privilege::Read],
        ));
        let stranger = AuthorizationPolicy::new(ResourceKind::Post);

        assert!(graph.apply_policies(&[known.clone(), stranger]).is_err());
        assert!(graph.policy_of(collaboration).unwrap().credential_rules().is_empty());

        graph.apply_policies(&[known.clone()]).unwrap();
        assert_eq!(graph.policy_of(collaboration), Some(&known));
    }
}
