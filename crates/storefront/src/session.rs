//! Session resolution.
//!
//! The resolver owns the three persisted session slots - token, cached
//! user, cached roles - and keeps them consistent while identity is
//! revalidated asynchronously against `GET /me`. The empty token is the
//! canonical "no session" value and synchronously implies no user and no
//! roles, before any network call resolves.
//!
//! Identity fetches complete out of call order. Each fetch is fenced by a
//! [`RevalidationTicket`] carrying the token that was current when it was
//! issued; a response whose ticket no longer matches the active token is
//! discarded, so a stale fetch can never overwrite a newer login or
//! logout. There is no cancellation beyond this check - a superseded fetch
//! is left to resolve and then dropped.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use copperleaf_core::RoleSet;

use crate::persist::{Storage, keys};

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token; no identity.
    Anonymous,
    /// A token is set and its identity fetch has not resolved yet. Cached
    /// user/roles from a previous run may be shown optimistically.
    Pending,
    /// The token's identity fetch succeeded; user and roles are current.
    Authenticated,
    /// The token failed revalidation and the session was forcibly logged
    /// out. A token that no longer validates is untrusted.
    Rejected,
}

/// The authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
}

/// A successfully revalidated identity: who the token belongs to and what
/// it may do.
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    pub user: Identity,
    pub roles: RoleSet,
}

/// A failed `/me` revalidation; carries the message surfaced as a warning.
#[derive(Debug, Clone, Error)]
#[error("session revalidation failed: {message}")]
pub struct RevalidationFailure {
    pub message: String,
}

/// Fencing token for an in-flight identity fetch.
///
/// Holds the session token that was active when the fetch was issued; the
/// resolver only applies a result whose ticket still matches.
#[derive(Debug, Clone)]
pub struct RevalidationTicket {
    token: String,
}

/// Token/user/roles state machine.
pub struct SessionResolver {
    token: String,
    user: Option<Identity>,
    roles: RoleSet,
    state: SessionState,
    storage: Storage,
}

impl SessionResolver {
    /// Derive the initial state from storage, synchronously.
    ///
    /// An absent or empty persisted token starts `Anonymous`. A non-empty
    /// token starts `Pending` with the cached user/roles loaded
    /// optimistically; the caller is expected to kick off a revalidation.
    #[must_use]
    pub fn load(storage: Storage) -> Self {
        let token = storage.get(keys::TOKEN).unwrap_or_default();
        if token.is_empty() {
            return Self {
                token: String::new(),
                user: None,
                roles: RoleSet::new(),
                state: SessionState::Anonymous,
                storage,
            };
        }

        let user = storage
            .get(keys::USER)
            .and_then(|raw| serde_json::from_str(&raw).ok());
        let roles = storage
            .get(keys::ROLES)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();

        Self {
            token,
            user,
            roles,
            state: SessionState::Pending,
            storage,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The active bearer token; empty means no session.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The cached or verified user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }

    /// The cached or verified role set.
    #[must_use]
    pub const fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Current resolver state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// True if the session grants `role`, accepting both the bare and the
    /// `ROLE_`-prefixed spelling.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.has(role)
    }

    /// Convenience query for the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.has_role("ADMIN")
    }

    /// Convenience query for the user role.
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.has_role("USER")
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Start a session with a fresh token.
    ///
    /// Persists the token, moves to `Pending`, and returns the ticket the
    /// caller must use to apply the identity fetch it now issues. An empty
    /// token is the no-session value and resolves synchronously to
    /// `Anonymous` with no ticket.
    pub fn login(&mut self, token: &str) -> Option<RevalidationTicket> {
        if token.is_empty() {
            self.clear_slots();
            self.state = SessionState::Anonymous;
            return None;
        }

        self.token = token.to_string();
        self.storage.set(keys::TOKEN, token);
        self.state = SessionState::Pending;
        Some(RevalidationTicket {
            token: self.token.clone(),
        })
    }

    /// A ticket for revalidating the current token, if one is set.
    ///
    /// Used at startup to re-verify a persisted token.
    #[must_use]
    pub fn ticket(&self) -> Option<RevalidationTicket> {
        (!self.token.is_empty()).then(|| RevalidationTicket {
            token: self.token.clone(),
        })
    }

    /// Apply the result of an identity fetch.
    ///
    /// Returns `false` when the ticket is stale (its token is no longer
    /// the active one) and the result was discarded. On success the
    /// session becomes `Authenticated` and user/roles are persisted; on
    /// failure the token is untrusted and the session is forcibly logged
    /// out into `Rejected`.
    pub fn apply_revalidation(
        &mut self,
        ticket: &RevalidationTicket,
        outcome: Result<VerifiedIdentity, RevalidationFailure>,
    ) -> bool {
        if ticket.token != self.token {
            tracing::debug!("discarding identity result for a superseded token");
            return false;
        }

        match outcome {
            Ok(identity) => {
                match serde_json::to_string(&identity.user) {
                    Ok(raw) => self.storage.set(keys::USER, &raw),
                    Err(e) => tracing::warn!(error = %e, "identity not persisted"),
                }
                match serde_json::to_string(&identity.roles) {
                    Ok(raw) => self.storage.set(keys::ROLES, &raw),
                    Err(e) => tracing::warn!(error = %e, "roles not persisted"),
                }
                self.user = Some(identity.user);
                self.roles = identity.roles;
                self.state = SessionState::Authenticated;
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "revalidation failed; clearing session");
                self.clear_slots();
                self.state = SessionState::Rejected;
            }
        }
        true
    }

    /// End the session: clear token, user, and roles, in memory and in
    /// storage, and return to `Anonymous`.
    ///
    /// Whether the cart is also emptied is the `clear_cart_on_logout`
    /// policy flag, applied by the caller that owns the cart.
    pub fn logout(&mut self) {
        self.clear_slots();
        self.state = SessionState::Anonymous;
    }

    fn clear_slots(&mut self) {
        self.token.clear();
        self.user = None;
        self.roles = RoleSet::new();
        self.storage.remove(keys::TOKEN);
        self.storage.remove(keys::USER);
        self.storage.remove(keys::ROLES);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::persist::MemoryStore;

    fn storage() -> Storage {
        Storage::new(Arc::new(MemoryStore::new()))
    }

    fn verified(username: &str, roles: &[&str]) -> VerifiedIdentity {
        VerifiedIdentity {
            user: Identity {
                username: username.to_string(),
            },
            roles: roles.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn failure() -> RevalidationFailure {
        RevalidationFailure {
            message: "401 Unauthorized".to_string(),
        }
    }

    #[test]
    fn test_fresh_storage_starts_anonymous() {
        let session = SessionResolver::load(storage());
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(session.token(), "");
        assert!(session.user().is_none());
        assert!(session.roles().is_empty());
    }

    #[test]
    fn test_login_then_success_authenticates_and_persists() {
        let storage = storage();
        let mut session = SessionResolver::load(storage.clone());

        let ticket = session.login("T1").unwrap();
        assert_eq!(session.state(), SessionState::Pending);

        assert!(session.apply_revalidation(&ticket, Ok(verified("ada", &["ROLE_USER"]))));
        assert_eq!(session.state(), SessionState::Authenticated);
        assert_eq!(session.user().unwrap().username, "ada");
        assert!(session.is_user());
        assert!(!session.is_admin());

        // A second resolver over the same storage sees the cached slots.
        let reloaded = SessionResolver::load(storage);
        assert_eq!(reloaded.state(), SessionState::Pending);
        assert_eq!(reloaded.token(), "T1");
        assert_eq!(reloaded.user().unwrap().username, "ada");
        assert!(reloaded.is_user());
    }

    #[test]
    fn test_rejected_revalidation_forces_logout() {
        let storage = storage();
        let mut session = SessionResolver::load(storage.clone());
        let ticket = session.login("T1").unwrap();

        assert!(session.apply_revalidation(&ticket, Err(failure())));
        assert_eq!(session.state(), SessionState::Rejected);
        assert_eq!(session.token(), "");
        assert!(session.user().is_none());
        assert!(session.roles().is_empty());

        // The persisted slots are gone too.
        assert!(storage.get(keys::TOKEN).is_none());
        assert!(storage.get(keys::USER).is_none());
        assert!(storage.get(keys::ROLES).is_none());
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut session = SessionResolver::load(storage());
        let ticket = session.login("T1").unwrap();

        // Logout lands before T1's identity fetch resolves.
        session.logout();
        assert_eq!(session.state(), SessionState::Anonymous);

        // The late response must not resurrect the session.
        assert!(!session.apply_revalidation(&ticket, Ok(verified("ada", &["ROLE_USER"]))));
        assert_eq!(session.state(), SessionState::Anonymous);
        assert!(session.user().is_none());
    }

    #[test]
    fn test_overlapping_logins_keep_the_newest() {
        let mut session = SessionResolver::load(storage());
        let first = session.login("T1").unwrap();
        let second = session.login("T2").unwrap();

        // T2 resolves first and wins.
        assert!(session.apply_revalidation(&second, Ok(verified("bea", &["ROLE_ADMIN"]))));
        // T1's late result is discarded.
        assert!(!session.apply_revalidation(&first, Ok(verified("ada", &["ROLE_USER"]))));

        assert_eq!(session.user().unwrap().username, "bea");
        assert!(session.is_admin());
    }

    #[test]
    fn test_empty_token_login_is_synchronous_anonymous() {
        let mut session = SessionResolver::load(storage());
        let _ = session.login("T1");

        assert!(session.login("").is_none());
        assert_eq!(session.state(), SessionState::Anonymous);
        assert_eq!(session.token(), "");
        assert!(session.user().is_none());
        assert!(session.roles().is_empty());
    }

    #[test]
    fn test_persisted_token_loads_pending_with_cached_identity() {
        let storage = storage();
        storage.set(keys::TOKEN, "T9");
        storage.set(keys::USER, r#"{"username":"cal"}"#);
        storage.set(keys::ROLES, r#"["ROLE_ADMIN"]"#);

        let session = SessionResolver::load(storage);
        assert_eq!(session.state(), SessionState::Pending);
        assert_eq!(session.user().unwrap().username, "cal");
        assert!(session.is_admin());
    }

    #[test]
    fn test_role_spellings_gate_identically() {
        let mut session = SessionResolver::load(storage());
        let ticket = session.login("T1").unwrap();
        session.apply_revalidation(&ticket, Ok(verified("ada", &["ADMIN"])));
        assert!(session.is_admin());

        let mut session = SessionResolver::load(storage());
        let ticket = session.login("T1").unwrap();
        session.apply_revalidation(&ticket, Ok(verified("ada", &["ROLE_ADMIN"])));
        assert!(session.is_admin());
    }
}
