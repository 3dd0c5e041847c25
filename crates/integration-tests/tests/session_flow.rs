//! Session resolution scenarios: slot consistency and fetch fencing.

use copperleaf_core::RoleSet;
use copperleaf_integration_tests::fixtures::storage;
use copperleaf_storefront::persist::keys;
use copperleaf_storefront::session::{
    Identity, RevalidationFailure, SessionResolver, SessionState, VerifiedIdentity,
};

fn verified(username: &str, roles: &[&str]) -> VerifiedIdentity {
    VerifiedIdentity {
        user: Identity {
            username: username.to_string(),
        },
        roles: roles.iter().map(|s| (*s).to_string()).collect::<RoleSet>(),
    }
}

#[test]
fn logout_before_resolution_discards_the_fetch() {
    // login issues T1; logout() lands before T1's /me resolves; the late
    // response must not flip the session back to Authenticated.
    let mut session = SessionResolver::load(storage());
    let ticket = session.login("T1").expect("non-empty token issues a ticket");

    session.logout();

    let applied = session.apply_revalidation(&ticket, Ok(verified("ada", &["ROLE_USER"])));
    assert!(!applied);
    assert_eq!(session.state(), SessionState::Anonymous);
    assert_eq!(session.token(), "");
    assert!(session.user().is_none());
}

#[test]
fn empty_token_is_synchronously_anonymous() {
    let storage = storage();
    let mut session = SessionResolver::load(storage.clone());
    let ticket = session.login("T1").expect("ticket");
    session.apply_revalidation(&ticket, Ok(verified("ada", &["ROLE_USER"])));

    // Setting the empty token needs no network round-trip to take effect.
    let _ = session.login("");
    assert_eq!(session.state(), SessionState::Anonymous);
    assert!(session.user().is_none());
    assert!(session.roles().is_empty());
    assert!(storage.get(keys::TOKEN).is_none());
    assert!(storage.get(keys::USER).is_none());
    assert!(storage.get(keys::ROLES).is_none());
}

#[test]
fn rejected_revalidation_clears_all_three_slots() {
    let storage = storage();
    let mut session = SessionResolver::load(storage.clone());
    let ticket = session.login("T1").expect("ticket");
    session.apply_revalidation(&ticket, Ok(verified("ada", &["ROLE_USER"])));

    // The backend stops honoring the token.
    let ticket = session.ticket().expect("ticket for active token");
    session.apply_revalidation(
        &ticket,
        Err(RevalidationFailure {
            message: "401 Unauthorized".to_string(),
        }),
    );

    assert_eq!(session.state(), SessionState::Rejected);
    assert!(storage.get(keys::TOKEN).is_none());
    assert!(storage.get(keys::USER).is_none());
    assert!(storage.get(keys::ROLES).is_none());

    // The next process start is cleanly anonymous.
    let session = SessionResolver::load(storage);
    assert_eq!(session.state(), SessionState::Anonymous);
}

#[test]
fn cached_identity_is_shown_while_pending() {
    let storage = storage();
    {
        let mut session = SessionResolver::load(storage.clone());
        let ticket = session.login("T1").expect("ticket");
        session.apply_revalidation(&ticket, Ok(verified("ada", &["ROLE_ADMIN"])));
    }

    // Next start: the token revalidates asynchronously, but the cached
    // identity gates optimistically in the meantime.
    let session = SessionResolver::load(storage);
    assert_eq!(session.state(), SessionState::Pending);
    assert_eq!(session.user().expect("cached user").username, "ada");
    assert!(session.is_admin());
}

#[test]
fn role_gating_accepts_both_spellings() {
    for spelling in ["ADMIN", "ROLE_ADMIN"] {
        let mut session = SessionResolver::load(storage());
        let ticket = session.login("T1").expect("ticket");
        session.apply_revalidation(&ticket, Ok(verified("ada", &[spelling])));
        assert!(session.is_admin(), "spelling {spelling} must grant ADMIN");
        assert!(!session.is_user());
    }
}
