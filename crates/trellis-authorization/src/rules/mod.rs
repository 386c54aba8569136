//! Rule model: privileges, credentials and the two rule shapes a policy holds

mod credential;
mod privilege;
mod rule;

pub use credential::{Credential, CredentialCriterion, CredentialKind, GlobalRole};
pub use privilege::{Privilege, UnknownPrivilege};
pub use rule::{CredentialRule, PrivilegeDerivationRule};
