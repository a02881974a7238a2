//! Signed, time-bound auth tokens (HS256 JWT)

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use postboard_core::{BoardError, Identity, Role, TOKEN_LIFETIME_SECS};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Reason returned when a token is past its expiry
pub const EXPIRED_TOKEN: &str = "Expired Token";
/// Reason returned for a bad signature or malformed payload
pub const INVALID_TOKEN: &str = "Invalid Token";

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username at issuance
    pub name: String,
    /// Email at issuance
    pub email: String,
    /// Role at issuance
    pub usertype: Role,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    fn new(identity: &Identity, now: DateTime<Utc>) -> Self {
        let exp = now + Duration::seconds(TOKEN_LIFETIME_SECS);

        Self {
            sub: identity.subject_id.clone(),
            name: identity.display_name.clone(),
            email: identity.email.clone(),
            usertype: identity.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    fn into_assertion(self) -> Result<Assertion, TokenError> {
        let issued_at = DateTime::from_timestamp(self.iat, 0).ok_or(TokenError::Invalid)?;
        let expires_at = DateTime::from_timestamp(self.exp, 0).ok_or(TokenError::Invalid)?;

        Ok(Assertion {
            identity: Identity {
                subject_id: self.sub,
                email: self.email,
                display_name: self.name,
                role: self.usertype,
            },
            issued_at,
            expires_at,
        })
    }
}

/// Decoded contents of a valid token
#[derive(Debug, Clone, PartialEq)]
pub struct Assertion {
    pub identity: Identity,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Token codec errors
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token encoding failed: {0}")]
    Encoding(String),
    #[error("Token expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

impl From<TokenError> for BoardError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => BoardError::unauthenticated(EXPIRED_TOKEN, "token"),
            TokenError::Invalid => BoardError::unauthenticated(INVALID_TOKEN, "token"),
            TokenError::Encoding(message) => BoardError::internal(message, "token"),
        }
    }
}

/// Issues and verifies auth tokens with one process-wide HMAC secret
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    has_secret: bool,
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("has_secret", &self.has_secret)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            has_secret: !secret.is_empty(),
        }
    }

    /// Issue a token for `identity`, valid for one hour from now
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, TokenError> {
        if !self.has_secret {
            warn!("Refusing to sign a token without a secret key");
            return Err(TokenError::Encoding("missing secret key".to_string()));
        }

        let claims = Claims::new(identity, now);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            warn!("Failed to encode JWT token: {}", e);
            TokenError::Encoding(e.to_string())
        })
    }

    /// Verify signature and expiry against the current time
    pub fn decode(&self, token: &str) -> Result<Assertion, TokenError> {
        self.decode_at(token, Utc::now())
    }

    /// Verify signature, then check expiry against `now`.
    ///
    /// A bad signature is always `Invalid`, even when the token is also expired.
    pub fn decode_at(&self, token: &str, now: DateTime<Utc>) -> Result<Assertion, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                TokenError::Invalid
            })?
            .claims;

        if claims.exp <= claims.iat {
            debug!("Token rejected: exp is not after iat");
            return Err(TokenError::Invalid);
        }

        if now.timestamp() > claims.exp {
            return Err(TokenError::Expired);
        }

        claims.into_assertion()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            subject_id: "6f1c2a4e-user".to_string(),
            email: "a@x.com".to_string(),
            display_name: "alice".to_string(),
            role,
        }
    }

    #[test]
    fn issued_token_decodes_to_same_identity() {
        let codec = TokenCodec::new("secret");
        for role in [Role::Admin, Role::Standard] {
            let token = codec.issue(&identity(role)).unwrap();
            let assertion = codec.decode(&token).unwrap();

            assert_eq!(assertion.identity, identity(role));
            assert_eq!(
                (assertion.expires_at - assertion.issued_at).num_seconds(),
                TOKEN_LIFETIME_SECS
            );
        }
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = TokenCodec::new("secret");
        let issued = Utc::now() - Duration::seconds(TOKEN_LIFETIME_SECS + 5);
        let token = codec.issue_at(&identity(Role::Standard), issued).unwrap();

        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_is_valid_until_expiry_second() {
        let codec = TokenCodec::new("secret");
        let issued = Utc::now();
        let token = codec.issue_at(&identity(Role::Standard), issued).unwrap();

        let at_expiry = issued + Duration::seconds(TOKEN_LIFETIME_SECS);
        assert!(codec.decode_at(&token, at_expiry).is_ok());

        let after_expiry = at_expiry + Duration::seconds(1);
        assert_eq!(
            codec.decode_at(&token, after_expiry),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn tampered_signature_is_invalid() {
        let codec = TokenCodec::new("secret");
        let token = codec.issue(&identity(Role::Standard)).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let signature = &parts[2];
        let first = if signature.starts_with('A') { "B" } else { "A" };
        parts[2] = format!("{}{}", first, &signature[1..]);
        let tampered = parts.join(".");

        assert_eq!(codec.decode(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let token = TokenCodec::new("other")
            .issue(&identity(Role::Admin))
            .unwrap();
        assert_eq!(
            TokenCodec::new("secret").decode(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn expired_and_forged_token_is_invalid() {
        let issued = Utc::now() - Duration::days(2);
        let token = TokenCodec::new("other")
            .issue_at(&identity(Role::Standard), issued)
            .unwrap();
        assert_eq!(
            TokenCodec::new("secret").decode(&token),
            Err(TokenError::Invalid)
        );
    }

    #[test]
    fn garbage_is_invalid() {
        let codec = TokenCodec::new("secret");
        assert_eq!(codec.decode(""), Err(TokenError::Invalid));
        assert_eq!(codec.decode("not.a.token"), Err(TokenError::Invalid));
    }

    #[test]
    fn missing_secret_fails_encoding() {
        let codec = TokenCodec::new("");
        assert!(matches!(
            codec.issue(&identity(Role::Standard)),
            Err(TokenError::Encoding(_))
        ));
    }

    #[test]
    fn token_errors_map_to_reasons() {
        let expired: BoardError = TokenError::Expired.into();
        assert_eq!(expired.public_message(), EXPIRED_TOKEN);
        assert_eq!(expired.status_code(), 401);

        let invalid: BoardError = TokenError::Invalid.into();
        assert_eq!(invalid.public_message(), INVALID_TOKEN);

        let encoding: BoardError = TokenError::Encoding("boom".to_string()).into();
        assert_eq!(encoding.status_code(), 500);
    }
}
