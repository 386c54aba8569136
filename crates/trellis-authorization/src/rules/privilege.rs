//! Privilege tokens

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Atomic permission token
///
/// The engine never interprets a privilege; it only moves them between rules
/// and sets. The ordering is used to keep privilege sets deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Privilege {
    Create,
    Read,
    Update,
    Delete,
    Grant,
    Contribute,
    CreatePost,
    CreateWhiteboard,
    CreateMemo,
    CreateMessage,
    ReadUsers,
    UpdateContent,
    UpdateCalloutPublisher,
    MoveContribution,
    MoveContent,
    TransferAccept,
}

impl Privilege {
    /// Every privilege, in declaration order
    pub const ALL: [Privilege; 16] = [
        Privilege::Create,
        Privilege::Read,
        Privilege::Update,
        Privilege::Delete,
        Privilege::Grant,
        Privilege::Contribute,
        Privilege::CreatePost,
        Privilege::CreateWhiteboard,
        Privilege::CreateMemo,
        Privilege::CreateMessage,
        Privilege::ReadUsers,
        Privilege::UpdateContent,
        Privilege::UpdateCalloutPublisher,
        Privilege::MoveContribution,
        Privilege::MoveContent,
        Privilege::TransferAccept,
    ];

    /// Full lifecycle set granted to creators
    pub const LIFECYCLE: [Privilege; 4] = [
        Privilege::Create,
        Privilege::Read,
        Privilege::Update,
        Privilege::Delete,
    ];

    /// Wire name of the privilege
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::Create => "create",
            Privilege::Read => "read",
            Privilege::Update => "update",
            Privilege::Delete => "delete",
            Privilege::Grant => "grant",
            Privilege::Contribute => "contribute",
            Privilege::CreatePost => "create-post",
            Privilege::CreateWhiteboard => "create-whiteboard",
            Privilege::CreateMemo => "create-memo",
            Privilege::CreateMessage => "create-message",
            Privilege::ReadUsers => "read-users",
            Privilege::UpdateContent => "update-content",
            Privilege::UpdateCalloutPublisher => "update-callout-publisher",
            Privilege::MoveContribution => "move-contribution",
            Privilege::MoveContent => "move-content",
            Privilege::TransferAccept => "transfer-accept",
        }
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name that is not the kebab-case form of any [`Privilege`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown privilege '{0}'")]
pub struct UnknownPrivilege(pub String);

impl FromStr for Privilege {
    type Err = UnknownPrivilege;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Privilege::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPrivilege(s.to_string()))
    }
}
