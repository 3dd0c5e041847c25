//! Session commands.

use secrecy::SecretString;

use copperleaf_storefront::session::SessionState;
use copperleaf_storefront::state::Storefront;

fn report_state(store: &Storefront) {
    match store.session().state() {
        SessionState::Authenticated => {
            let username = store
                .session()
                .user()
                .map_or("<unknown>", |u| u.username.as_str());
            let roles: Vec<&str> = store.session().roles().iter().collect();
            tracing::info!("Logged in as {username} (roles: {})", roles.join(", "));
        }
        SessionState::Pending => tracing::info!("Session pending revalidation"),
        SessionState::Rejected => {
            tracing::warn!("Session token was rejected; you have been logged out");
        }
        SessionState::Anonymous => tracing::info!("Not logged in"),
    }
}

/// Exchange credentials for a session.
pub async fn login(
    store: &mut Storefront,
    username: &str,
    password: String,
) -> Result<(), Box<dyn std::error::Error>> {
    store
        .login(username, SecretString::from(password))
        .await?;
    report_state(store);
    Ok(())
}

/// Create an account and log it in.
pub async fn register(
    store: &mut Storefront,
    username: &str,
    password: String,
    admin: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    store
        .register(username, SecretString::from(password), admin)
        .await?;
    report_state(store);
    Ok(())
}

/// End the session.
pub fn logout(store: &mut Storefront) {
    store.logout();
    tracing::info!("Logged out");
}

/// Revalidate and show the current session.
pub async fn whoami(store: &mut Storefront) -> Result<(), Box<dyn std::error::Error>> {
    store.revalidate().await?;
    report_state(store);
    Ok(())
}
