//! Actor and credential fixtures

use trellis_authorization::{Actor, Credential, CredentialKind};
use trellis_core::ActorId;

/// Builder for actors with a hand-picked credential set
///
/// ```rust
/// use trellis_testkit::ActorBuilder;
///
/// let admin = ActorBuilder::new("user-7").self_management().space_admin("space-1").build();
/// assert_eq!(admin.credentials.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct ActorBuilder {
    id: ActorId,
    credentials: Vec<Credential>,
}

impl ActorBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: ActorId::new(id),
            credentials: Vec::new(),
        }
    }

    /// Self-management credential scoped to the actor's own id
    pub fn self_management(mut self) -> Self {
        let scope = self.id.as_str().to_string();
        self.credentials
            .push(Credential::new(CredentialKind::self_management(), scope));
        self
    }

    pub fn registered(self) -> Self {
        self.global(CredentialKind::global_registered())
    }

    pub fn global_admin(self) -> Self {
        self.global(CredentialKind::global_admin())
    }

    pub fn global_support(self) -> Self {
        self.global(CredentialKind::global_support())
    }

    pub fn space_admin(self, space: &str) -> Self {
        self.credential(CredentialKind::space_admin(), space)
    }

    pub fn space_member(self, space: &str) -> Self {
        self.credential(CredentialKind::space_member(), space)
    }

    pub fn global(self, kind: CredentialKind) -> Self {
        self.credential(kind, "")
    }

    pub fn credential(mut self, kind: CredentialKind, scope: &str) -> Self {
        self.credentials.push(Credential::new(kind, scope));
        self
    }

    pub fn build(self) -> Actor {
        Actor {
            id: self.id,
            credentials: self.credentials,
        }
    }
}

/// Registered user owning their self-management credential
pub fn registered_user(id: &str) -> Actor {
    ActorBuilder::new(id).registered().self_management().build()
}

/// Registered member of `space`
pub fn space_member(id: &str, space: &str) -> Actor {
    ActorBuilder::new(id)
        .registered()
        .self_management()
        .space_member(space)
        .build()
}

/// Registered administrator (and member) of `space`
pub fn space_admin(id: &str, space: &str) -> Actor {
    ActorBuilder::new(id)
        .registered()
        .self_management()
        .space_member(space)
        .space_admin(space)
        .build()
}

/// Platform administrator
pub fn global_admin(id: &str) -> Actor {
    ActorBuilder::new(id)
        .registered()
        .self_management()
        .global_admin()
        .build()
}
