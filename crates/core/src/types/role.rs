//! Role sets for session gating.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The set of role strings granted to a session.
///
/// Membership accepts both the bare and the `ROLE_`-prefixed spelling of a
/// role: backends built on different security stacks emit `"ADMIN"` or
/// `"ROLE_ADMIN"` for the same grant, and both must gate identically. This
/// is a compatibility rule, not a normalization - the set stores whatever
/// strings the backend sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    /// The empty role set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// True if the set grants `role`, in either spelling.
    #[must_use]
    pub fn has(&self, role: &str) -> bool {
        self.0.contains(role) || self.0.contains(&format!("ROLE_{role}"))
    }

    /// Number of stored role strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no roles are granted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the stored role strings.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl FromIterator<String> for RoleSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
