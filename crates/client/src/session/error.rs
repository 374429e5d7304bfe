//! Authentication error types.

use thiserror::Error;

use super::credentials::CredentialStoreError;

/// Errors that can occur during login.
///
/// The view layer shows one generic credential-failure message for all of
/// these - a wrong password is deliberately indistinguishable from a server
/// error to the user.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login endpoint rejected the request or could not be reached.
    #[error("login rejected")]
    Rejected {
        /// Transport error, when the failure was not an HTTP status.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The login response carried no usable access token.
    #[error("login response missing access token")]
    MissingToken,

    /// The accepted credential could not be persisted.
    #[error("credential store error: {0}")]
    Store(#[from] CredentialStoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::Rejected { source: None };
        assert_eq!(err.to_string(), "login rejected");

        let err = AuthError::MissingToken;
        assert_eq!(err.to_string(), "login response missing access token");
    }
}
