//! Identity decoding.
//!
//! Derives a display identity from the credential's JWT payload without
//! contacting the server and without verifying the signature - the backend
//! is the authority on validity; this is presentation data only.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use greengrocer_core::Subject;

/// Claims decoded from the current credential.
///
/// A pure projection of the credential: recomputed whenever the credential
/// changes and undefined (absent) when the credential is missing or
/// malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The `sub` claim.
    pub subject: Subject,
    /// The full decoded payload, for display of any other claims.
    pub claims: Value,
}

/// Decode the identity carried by a credential.
///
/// Returns `None` for anything that is not a three-segment token with a
/// base64url JSON payload containing a string `sub` claim. Never fails
/// with an error on malformed input.
#[must_use]
pub fn decode(credential: &SecretString) -> Option<Identity> {
    let token = credential.expose_secret();

    let mut segments = token.split('.');
    let payload = match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return None,
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    let subject = claims.get("sub")?.as_str()?;

    Some(Identity {
        subject: Subject::new(subject),
        claims,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Build an unsigned token with the given payload claims.
    fn token_with_claims(claims: &Value) -> SecretString {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap());
        SecretString::from(format!("{header}.{payload}.signature"))
    }

    #[test]
    fn test_decodes_subject_claim() {
        let token = token_with_claims(&json!({"sub": "alice", "iat": 1_700_000_000}));
        let identity = decode(&token).unwrap();
        assert_eq!(identity.subject.as_str(), "alice");
        assert_eq!(identity.claims["iat"], 1_700_000_000);
    }

    #[test]
    fn test_missing_sub_yields_none() {
        let token = token_with_claims(&json!({"role": "shopper"}));
        assert!(decode(&token).is_none());
    }

    #[test]
    fn test_non_string_sub_yields_none() {
        let token = token_with_claims(&json!({"sub": 42}));
        assert!(decode(&token).is_none());
    }

    #[test]
    fn test_wrong_segment_count_yields_none() {
        assert!(decode(&SecretString::from("")).is_none());
        assert!(decode(&SecretString::from("only-one-segment")).is_none());
        assert!(decode(&SecretString::from("two.segments")).is_none());
        assert!(decode(&SecretString::from("a.b.c.d")).is_none());
    }

    #[test]
    fn test_invalid_base64_yields_none() {
        assert!(decode(&SecretString::from("header.!!!not-base64!!!.sig")).is_none());
    }

    #[test]
    fn test_non_json_payload_yields_none() {
        let payload = URL_SAFE_NO_PAD.encode(b"plain text");
        assert!(decode(&SecretString::from(format!("h.{payload}.s"))).is_none());
    }
}
