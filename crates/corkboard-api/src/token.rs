use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use corkboard_types::api::Claims;

const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 30;
const REFRESH_TOKEN_EXPIRE_DAYS: i64 = 7;

/// Issues and verifies the two token classes. Built once at startup from
/// the configured secret and injected through the app state; the key is
/// never regenerated mid-process, so restarting the service invalidates
/// every outstanding token unless the secret is pinned via configuration.
///
/// Access and refresh tokens are signed with the same key and carry the
/// same {sub, exp} claims; verification does not distinguish them. A
/// refresh token therefore passes anywhere an access token does. This
/// mirrors the reference behavior and is recorded as a known limitation
/// rather than silently fixed.
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenSigner {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Short-lived token sent on every request.
    pub fn issue_access(&self, sub: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(sub, Duration::minutes(ACCESS_TOKEN_EXPIRE_MINUTES))
    }

    /// Long-lived token exchanged for a new pair at /refresh.
    pub fn issue_refresh(&self, sub: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue(sub, Duration::days(REFRESH_TOKEN_EXPIRE_DAYS))
    }

    fn issue(&self, sub: &str, ttl: Duration) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: sub.to_string(),
            exp: (Utc::now() + ttl).timestamp() as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    /// Returns the subject. Fails on a bad signature, an elapsed expiry,
    /// or a missing sub claim.
    pub fn verify(&self, token: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{Header, encode};

    fn signer() -> TokenSigner {
        TokenSigner::new(b"test-secret")
    }

    #[test]
    fn access_token_round_trip() {
        let s = signer();
        let token = s.issue_access("alice").unwrap();
        assert_eq!(s.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn refresh_token_round_trip() {
        let s = signer();
        let token = s.issue_refresh("alice").unwrap();
        assert_eq!(s.verify(&token).unwrap(), "alice");
    }

    #[test]
    fn expired_token_is_rejected() {
        let s = signer();
        // Well past the default validation leeway.
        let token = s.issue("alice", Duration::minutes(-5)).unwrap();
        assert!(s.verify(&token).is_err());
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = signer().issue_access("alice").unwrap();
        let other = TokenSigner::new(b"different-secret");
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let s = signer();
        let mut token = s.issue_access("alice").unwrap();
        token.pop();
        token.push('x');
        assert!(s.verify(&token).is_err());
    }

    #[test]
    fn missing_sub_is_rejected() {
        let s = signer();
        let claims = serde_json::json!({
            "exp": (Utc::now() + Duration::minutes(5)).timestamp(),
        });
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert!(s.verify(&token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(signer().verify("not-a-jwt").is_err());
    }
}
