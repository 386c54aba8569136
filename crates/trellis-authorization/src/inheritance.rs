//! Inheritance operator
//!
//! A child's inherited rules are rebuilt from scratch on every pass: the
//! child's credential rules are discarded and every cascading rule of the
//! parent is copied in unchanged. Derivation rules never cross a node
//! boundary, so the child's own are left alone and the parent's are ignored.

use crate::policy::AuthorizationPolicy;

/// Layer the parent's cascading credential rules onto an emptied child policy
///
/// With no parent the child ends up with no credential rules at all.
pub fn inherit(
    mut child: AuthorizationPolicy,
    parent: Option<&AuthorizationPolicy>,
) -> AuthorizationPolicy {
    child.clear_credential_rules();
    if let Some(parent) = parent {
        child.extend_credential_rules(
            parent
                .credential_rules()
                .iter()
                .filter(|rule| rule.cascade())
                .cloned(),
        );
    }
    child
}
