//! The view of a content node the engine works with

use crate::errors::AuthorizationResult;
use crate::policy::{AuthorizationPolicy, ResourceKind};
use crate::rules::Privilege;
use serde::{Deserialize, Serialize};
use trellis_core::{ActorId, NodeId};

/// Publication state of a callout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Draft,
    #[default]
    Published,
    Archived,
}

/// Kind of contribution a callout accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionType {
    Post,
    Whiteboard,
    Link,
    Memo,
}

impl ContributionType {
    /// Resource kind a contribution of this type wraps
    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            ContributionType::Post => ResourceKind::Post,
            ContributionType::Whiteboard => ResourceKind::Whiteboard,
            ContributionType::Link => ResourceKind::Link,
            ContributionType::Memo => ResourceKind::Memo,
        }
    }

    /// Privilege needed to add a contribution of this type to a callout
    pub fn creation_privilege(&self) -> Privilege {
        match self {
            ContributionType::Post => Privilege::CreatePost,
            ContributionType::Whiteboard => Privilege::CreateWhiteboard,
            ContributionType::Memo => Privilege::CreateMemo,
            ContributionType::Link => Privilege::Contribute,
        }
    }
}

/// Entity attributes rule builders read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFacts {
    /// Actor recorded as creator, if any
    pub created_by: Option<ActorId>,
    pub visibility: Visibility,
    /// Contribution types a callout accepts
    pub allowed_contributions: Vec<ContributionType>,
    /// Template callouts are never treated as drafts
    pub is_template: bool,
}

impl NodeFacts {
    /// Facts for an entity with a recorded creator
    pub fn created_by(actor: impl Into<ActorId>) -> Self {
        Self {
            created_by: Some(actor.into()),
            ..Self::default()
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_allowed_contributions(
        mut self,
        types: impl IntoIterator<Item = ContributionType>,
    ) -> Self {
        self.allowed_contributions = types.into_iter().collect();
        self
    }

    pub fn as_template(mut self) -> Self {
        self.is_template = true;
        self
    }
}

/// An optional child slot: `id` is `None` when the slot is empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildRelation {
    pub kind: ResourceKind,
    pub id: Option<NodeId>,
}

impl ChildRelation {
    pub fn present(kind: ResourceKind, id: NodeId) -> Self {
        Self { kind, id: Some(id) }
    }

    pub fn absent(kind: ResourceKind) -> Self {
        Self { kind, id: None }
    }
}

/// A node as returned by a [`NodeLoader`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurableNode {
    pub id: NodeId,
    pub kind: ResourceKind,
    /// `None` only if the owning entity was created without a policy
    pub policy: Option<AuthorizationPolicy>,
    pub facts: NodeFacts,
    pub children: Vec<ChildRelation>,
}

impl SecurableNode {
    /// Node with a fresh empty policy and no children
    pub fn new(kind: ResourceKind, facts: NodeFacts) -> Self {
        Self {
            id: NodeId::new(),
            kind,
            policy: Some(AuthorizationPolicy::new(kind)),
            facts,
            children: Vec::new(),
        }
    }

    /// Ids of populated child slots
    pub fn present_children(&self) -> impl Iterator<Item = (ResourceKind, NodeId)> + '_ {
        self.children
            .iter()
            .filter_map(|relation| relation.id.map(|id| (relation.kind, id)))
    }
}

/// Resolves node ids to nodes for the propagation walk
///
/// Implementations hand out owned snapshots; the engine never writes back
/// through a loader.
pub trait NodeLoader {
    /// Load a node with its child slots
    fn load_node(&self, id: &NodeId) -> AuthorizationResult<SecurableNode>;
}

impl<L: NodeLoader + ?Sized> NodeLoader for &L {
    fn load_node(&self, id: &NodeId) -> AuthorizationResult<SecurableNode> {
        (**self).load_node(id)
    }
}
