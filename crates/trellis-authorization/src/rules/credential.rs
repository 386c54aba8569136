//! Credentials held by actors and the criteria rules match them against

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a credential, e.g. `GlobalAdmin` or `SpaceMember`
///
/// Kinds are open-ended strings so that deployments can introduce their own;
/// the well-known ones used by the default rule profiles have constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CredentialKind(String);

impl CredentialKind {
    pub const GLOBAL_ADMIN: &'static str = "GlobalAdmin";
    pub const GLOBAL_SUPPORT: &'static str = "GlobalSupport";
    pub const GLOBAL_REGISTERED: &'static str = "GlobalRegistered";
    pub const GLOBAL_ANONYMOUS: &'static str = "GlobalAnonymous";
    pub const GLOBAL_COMMUNITY_READ: &'static str = "GlobalCommunityRead";
    pub const SELF_MANAGEMENT: &'static str = "SelfManagement";
    pub const SPACE_ADMIN: &'static str = "SpaceAdmin";
    pub const SPACE_MEMBER: &'static str = "SpaceMember";

    /// Wrap a kind name
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn global_admin() -> Self {
        Self::new(Self::GLOBAL_ADMIN)
    }

    pub fn global_support() -> Self {
        Self::new(Self::GLOBAL_SUPPORT)
    }

    pub fn global_registered() -> Self {
        Self::new(Self::GLOBAL_REGISTERED)
    }

    pub fn global_anonymous() -> Self {
        Self::new(Self::GLOBAL_ANONYMOUS)
    }

    pub fn self_management() -> Self {
        Self::new(Self::SELF_MANAGEMENT)
    }

    pub fn space_admin() -> Self {
        Self::new(Self::SPACE_ADMIN)
    }

    pub fn space_member() -> Self {
        Self::new(Self::SPACE_MEMBER)
    }

    /// Borrow the kind name
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CredentialKind {
    fn from(kind: &str) -> Self {
        Self::new(kind)
    }
}

/// Platform-wide roles, each backed by one global credential kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GlobalRole {
    /// Platform administrator
    Admin,
    /// Platform support staff
    Support,
    /// May read every community
    CommunityReader,
}

impl GlobalRole {
    /// Credential kind an actor holds when it has this role
    pub fn credential_kind(&self) -> CredentialKind {
        match self {
            GlobalRole::Admin => CredentialKind::global_admin(),
            GlobalRole::Support => CredentialKind::global_support(),
            GlobalRole::CommunityReader => CredentialKind::new(CredentialKind::GLOBAL_COMMUNITY_READ),
        }
    }
}

/// A claim held by an actor: a kind, optionally scoped to a resource
///
/// Global credentials carry an empty scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Credential {
    pub kind: CredentialKind,
    pub scope: String,
}

impl Credential {
    pub fn new(kind: impl Into<CredentialKind>, scope: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            scope: scope.into(),
        }
    }

    /// Credential of the given kind with no scope
    pub fn global(kind: impl Into<CredentialKind>) -> Self {
        Self::new(kind, "")
    }
}

/// A `(kind, scope)` pair a credential rule matches against
///
/// An empty scope is a wildcard: any credential of the kind matches,
/// whatever its own scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CredentialCriterion {
    pub kind: CredentialKind,
    pub scope: String,
}

impl CredentialCriterion {
    pub fn new(kind: impl Into<CredentialKind>, scope: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            scope: scope.into(),
        }
    }

    /// Criterion matching every credential of `kind`
    pub fn wildcard(kind: impl Into<CredentialKind>) -> Self {
        Self::new(kind, "")
    }

    pub fn is_wildcard(&self) -> bool {
        self.scope.is_empty()
    }

    /// Whether `credential` satisfies this criterion
    pub fn matches(&self, credential: &Credential) -> bool {
        self.kind == credential.kind && (self.is_wildcard() || self.scope == credential.scope)
    }
}

impl fmt::Display for CredentialCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard() {
            write!(f, "{}:*", self.kind)
        } else {
            write!(f, "{}:{}", self.kind, self.scope)
        }
    }
}

impl From<CredentialKind> for CredentialCriterion {
    fn from(kind: CredentialKind) -> Self {
        Self::wildcard(kind)
    }
}
