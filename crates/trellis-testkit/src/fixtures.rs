//! Content tree fixtures
//!
//! [`TestTree`] is a bare map of nodes implementing [`NodeLoader`], enough to
//! drive the propagator without the collaboration service on top.

use std::collections::HashMap;
use trellis_authorization::{
    AuthorizationError, AuthorizationPolicy, AuthorizationResult, ChildRelation, ContributionType,
    CredentialCriterion, CredentialKind, CredentialRule, NodeFacts, NodeLoader,
    Privilege, PropagationContext, ResourceKind, SecurableNode,
};
use trellis_core::NodeId;

/// Scope used by the standard fixtures
pub const SPACE: &str = "space-1";

/// In-memory tree of securable nodes
#[derive(Debug, Clone, Default)]
pub struct TestTree {
    nodes: HashMap<NodeId, SecurableNode>,
}

impl TestTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with no parent
    pub fn root(&mut self, kind: ResourceKind, facts: NodeFacts) -> NodeId {
        let node = SecurableNode::new(kind, facts);
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Add a node under `parent`
    pub fn child(&mut self, parent: NodeId, kind: ResourceKind, facts: NodeFacts) -> NodeId {
        let id = self.root(kind, facts);
        self.node_mut(parent)
            .children
            .push(ChildRelation::present(kind, id));
        id
    }

    /// Record an explicitly empty child slot on `parent`
    pub fn absent(&mut self, parent: NodeId, kind: ResourceKind) {
        self.node_mut(parent)
            .children
            .push(ChildRelation::absent(kind));
    }

    /// Move `child` from `from` to `to`
    pub fn reparent(&mut self, child: NodeId, from: NodeId, to: NodeId) {
        let kind = self.node(child).kind;
        self.node_mut(from).children.retain(|r| r.id != Some(child));
        self.node_mut(to)
            .children
            .push(ChildRelation::present(kind, child));
    }

    pub fn node(&self, id: NodeId) -> &SecurableNode {
        self.nodes
            .get(&id)
            .unwrap_or_else(|| panic!("no node {id} in test tree"))
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut SecurableNode {
        self.nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("no node {id} in test tree"))
    }

    pub fn policy(&self, id: NodeId) -> &AuthorizationPolicy {
        self.node(id)
            .policy
            .as_ref()
            .unwrap_or_else(|| panic!("node {id} has no policy"))
    }

    /// Write propagated policies back onto the nodes that own them
    pub fn apply(&mut self, policies: &[AuthorizationPolicy]) {
        for policy in policies {
            let owner = self
                .nodes
                .values_mut()
                .find(|node| node.policy.as_ref().map(AuthorizationPolicy::id) == Some(policy.id()))
                .unwrap_or_else(|| panic!("no owner for {}", policy.id()));
            owner.policy = Some(policy.clone());
        }
    }
}

impl NodeLoader for TestTree {
    fn load_node(&self, id: &NodeId) -> AuthorizationResult<SecurableNode> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or(AuthorizationError::NodeNotFound { id: *id })
    }
}

/// Policy of the space enclosing a collaboration
///
/// Members read and admins manage everything below (cascading); admins also
/// hold a space-local `Grant` that must stay at the space.
pub fn space_policy(space: &str) -> AuthorizationPolicy {
    let admins = CredentialCriterion::new(CredentialKind::space_admin(), space);
    let members = CredentialCriterion::new(CredentialKind::space_member(), space);

    let mut policy = AuthorizationPolicy::new(ResourceKind::InMemory);
    policy.append_credential_rules([
        CredentialRule::new("space-members-read", [Privilege::Read], [members]),
        CredentialRule::new(
            "space-admins-manage",
            [
                Privilege::Read,
                Privilege::Update,
                Privilege::Delete,
            ],
            [admins.clone()],
        ),
        CredentialRule::new("space-admins-grant", [Privilege::Grant], [admins])
            .with_cascade(false),
    ]);
    policy
}

/// Context matching [`space_policy`]
pub fn space_context(space: &str) -> PropagationContext {
    PropagationContext::for_space(space)
}

/// Ids of the standard fixture tree
#[derive(Debug, Clone, Copy)]
pub struct StandardTree {
    pub collaboration: NodeId,
    pub callout_a: NodeId,
    pub callout_b: NodeId,
    pub contribution: NodeId,
    pub post: NodeId,
    pub comments: NodeId,
}

/// collaboration → {callout A → contribution → post → comments, callout B}
///
/// Callout A is created by `user-author`, callout B by `user-b-author`, the
/// contribution and its post by `user-42`. Both callouts accept posts and
/// links. Empty slots are recorded explicitly.
pub fn standard_tree() -> (TestTree, StandardTree) {
    let mut tree = TestTree::new();
    let collaboration = tree.root(ResourceKind::Collaboration, NodeFacts::default());

    let accepts = [ContributionType::Post, ContributionType::Link];
    let callout_a = tree.child(
        collaboration,
        ResourceKind::Callout,
        NodeFacts::created_by("user-author").with_allowed_contributions(accepts),
    );
    tree.absent(callout_a, ResourceKind::CalloutFraming);
    let callout_b = tree.child(
        collaboration,
        ResourceKind::Callout,
        NodeFacts::created_by("user-b-author").with_allowed_contributions(accepts),
    );

    let contribution = tree.child(callout_a, ResourceKind::Contribution, NodeFacts::created_by("user-42"));
    let post = tree.child(contribution, ResourceKind::Post, NodeFacts::created_by("user-42"));
    tree.absent(contribution, ResourceKind::Whiteboard);
    let comments = tree.child(post, ResourceKind::Comments, NodeFacts::default());

    (
        tree,
        StandardTree {
            collaboration,
            callout_a,
            callout_b,
            contribution,
            post,
            comments,
        },
    )
}
