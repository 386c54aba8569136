//! Authorization engine errors
//!
//! Three families: invariant failures (`NotInitialized`, `InconsistentRules`,
//! `KindMismatch`) which abort a propagation call, lookup failures surfaced by
//! a [`NodeLoader`](crate::NodeLoader), and `AccessDenied`, the only one a
//! caller is expected to recover from.

use crate::{Privilege, ResourceKind};
use trellis_core::{NodeId, PolicyId, TrellisError};

/// Authorization engine result
pub type AuthorizationResult<T> = std::result::Result<T, AuthorizationError>;

/// Errors raised by rule building, propagation and evaluation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    /// A policy or required relation is absent where the engine expects one
    #[error("Not initialized: {missing} for {kind} {id}")]
    NotInitialized {
        /// Kind of the entity being processed
        kind: ResourceKind,
        /// Entity being processed
        id: NodeId,
        /// What was missing
        missing: String,
    },

    /// The actor lacks the required privilege
    #[error("Authorization: unable to grant '{privilege}' privilege: {context}")]
    AccessDenied {
        /// Privilege that was requested
        privilege: Privilege,
        /// Caller supplied diagnostic
        context: String,
    },

    /// A policy holds two credential rules with the same name
    #[error("Inconsistent rule state: policy {policy} has duplicate rule '{rule}'")]
    InconsistentRules {
        /// Offending policy
        policy: PolicyId,
        /// Duplicated rule name
        rule: String,
    },

    /// The loader could not resolve a node
    #[error("Node not found: {id}")]
    NodeNotFound {
        /// Requested node
        id: NodeId,
    },

    /// The node loaded for an id is not of the kind the caller asked for
    #[error("Node {id} is a {actual}, expected {expected}")]
    KindMismatch {
        /// Requested node
        id: NodeId,
        /// Kind the caller passed in
        expected: ResourceKind,
        /// Kind actually stored
        actual: ResourceKind,
    },
}

impl AuthorizationError {
    /// Create a not-initialized error
    pub fn not_initialized(kind: ResourceKind, id: NodeId, missing: impl Into<String>) -> Self {
        Self::NotInitialized {
            kind,
            id,
            missing: missing.into(),
        }
    }

    /// Create an access denied error
    pub fn access_denied(privilege: Privilege, context: impl Into<String>) -> Self {
        Self::AccessDenied {
            privilege,
            context: context.into(),
        }
    }

    /// True for failures that indicate a bug rather than a user mistake
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized { .. } | Self::InconsistentRules { .. } | Self::KindMismatch { .. }
        )
    }
}

impl From<AuthorizationError> for TrellisError {
    fn from(err: AuthorizationError) -> Self {
        match err {
            AuthorizationError::AccessDenied { .. } => {
                TrellisError::permission_denied(err.to_string())
            }
            AuthorizationError::NodeNotFound { .. } => TrellisError::not_found(err.to_string()),
            AuthorizationError::NotInitialized { .. }
            | AuthorizationError::InconsistentRules { .. }
            | AuthorizationError::KindMismatch { .. } => TrellisError::internal(err.to_string()),
        }
    }
}
