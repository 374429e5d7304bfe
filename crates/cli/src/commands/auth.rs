//! Session commands: login, logout, whoami.

use secrecy::SecretString;

use greengrocer_client::session::Session;

/// Generic credential-failure message; deliberately does not distinguish a
/// wrong password from a server error.
const LOGIN_FAILED: &str = "Login failed. Check your username and password and try again.";

/// Sign in and persist the session.
///
/// # Errors
///
/// Returns a generic failure message on any login error; the underlying
/// cause is logged at debug level only.
pub async fn login(
    session: &Session,
    username: &str,
    password: SecretString,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = session.login(username, &password).await {
        tracing::debug!(error = %e, "login failed");
        return Err(LOGIN_FAILED.into());
    }

    let subject = session
        .current_identity()
        .map_or_else(|| username.to_owned(), |identity| identity.subject.to_string());

    #[allow(clippy::print_stdout)]
    {
        println!("Signed in as {subject}");
    }
    Ok(())
}

/// Sign out. Safe to run when already signed out.
pub fn logout(session: &Session) {
    session.logout();

    #[allow(clippy::print_stdout)]
    {
        println!("Signed out");
    }
}

/// Show the current session's identity.
pub fn whoami(session: &Session) {
    #[allow(clippy::print_stdout)]
    {
        match session.current_identity() {
            Some(identity) => println!("Signed in as {}", identity.subject),
            None => println!("Not signed in"),
        }
    }
}
