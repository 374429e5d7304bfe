//! User subject identifier.

use core::fmt;

use serde::{Deserialize, Serialize};

/// The subject identifier of an authenticated user.
///
/// Carried in the credential's `sub` claim and sent to the backend as the
/// `X-User-Id` header on every cart request. When no identity can be
/// derived (absent or malformed credential) the anonymous sentinel is used;
/// guarded flows should never reach the backend with it, but the backend
/// tolerates it as an ordinary (empty) cart owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Subject(String);

impl Subject {
    /// Sentinel subject used when no identity is available.
    pub const ANONYMOUS: &'static str = "anon";

    /// Create a subject from a claim value.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self(subject.into())
    }

    /// The anonymous sentinel subject.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Self::ANONYMOUS.to_owned())
    }

    /// Returns the subject as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this is the anonymous sentinel.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0 == Self::ANONYMOUS
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Subject {
    fn from(subject: &str) -> Self {
        Self(subject.to_owned())
    }
}

impl From<String> for Subject {
    fn from(subject: String) -> Self {
        Self(subject)
    }
}
