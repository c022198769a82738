//! Token service — HS256 JWT issue/validate.
//!
//! Tokens are stateless: lifecycle is `Issued → Valid → Expired`, driven
//! entirely by the `exp` claim. There is no revocation list; if revocation
//! is ever required this service needs a server-side session store.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Identity;
use crate::config::JwtConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("bad signature")]
    BadSignature,
    #[error("token expired")]
    Expired,
    #[error("missing subject claim")]
    MissingSubject,
}

/// Claim set carried by every issued token. Only `sub` is trusted for
/// authorization; anything else a caller smuggles in is ignored.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Option<String>,
    pub exp: i64,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, algorithm: Algorithm, default_ttl: Duration) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(algorithm),
            validation,
            default_ttl,
        }
    }

    pub fn from_config(jwt: &JwtConfig) -> anyhow::Result<Self> {
        let algorithm: Algorithm = jwt
            .algorithm
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown jwt algorithm '{}'", jwt.algorithm))?;
        Ok(Self::new(
            &jwt.secret_key,
            algorithm,
            Duration::minutes(jwt.token_ttl_minutes),
        ))
    }

    /// Sign a token asserting `identity` until `now + ttl` (configured
    /// default when `ttl` is `None`). Issuance is stateless; issuing twice
    /// yields two independent, equally valid tokens.
    pub fn issue(&self, identity: &Identity, ttl: Option<Duration>) -> anyhow::Result<String> {
        let expires_at = Utc::now() + ttl.unwrap_or(self.default_ttl);
        let claims = Claims {
            sub: Some(identity.username.clone()),
            exp: expires_at.timestamp(),
        };
        encode(&self.header, &claims, &self.encoding)
            .map_err(|e| anyhow::anyhow!("token signing failed: {}", e))
    }

    /// Verify signature and expiry, then rebuild the identity from `sub`.
    /// This is the single authorization gate for protected operations.
    pub fn validate(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                _ => TokenError::Malformed,
            }
        })?;

        // `exp` must be strictly in the future; the library treats the
        // current second as still valid.
        if data.claims.exp <= Utc::now().timestamp() {
            return Err(TokenError::Expired);
        }

        match data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(Identity::new(sub)),
            _ => Err(TokenError::MissingSubject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("unit-test-secret", Algorithm::HS256, Duration::minutes(30))
    }

    #[test]
    fn issue_then_validate_round_trips_identity() {
        let svc = service();
        let identity = Identity::new("testuser");
        let token = svc.issue(&identity, None).unwrap();
        assert_eq!(svc.validate(&token).unwrap(), identity);
    }

    #[test]
    fn zero_ttl_token_is_expired() {
        let svc = service();
        let token = svc.issue(&Identity::new("testuser"), Some(Duration::zero())).unwrap();
        assert_eq!(svc.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn past_expiry_token_is_expired() {
        let svc = service();
        let token = svc
            .issue(&Identity::new("testuser"), Some(Duration::minutes(-5)))
            .unwrap();
        assert_eq!(svc.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn corrupted_signature_is_rejected() {
        let svc = service();
        let token = svc.issue(&Identity::new("testuser"), None).unwrap();

        // Flip the last character of the signature segment.
        let dot = token.rfind('.').unwrap();
        let (head, sig) = token.split_at(dot + 1);
        let mut sig: Vec<u8> = sig.bytes().collect();
        let last = *sig.last().unwrap();
        *sig.last_mut().unwrap() = if last == b'A' { b'B' } else { b'A' };
        let corrupted = format!("{}{}", head, String::from_utf8(sig).unwrap());

        assert_eq!(svc.validate(&corrupted), Err(TokenError::BadSignature));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let svc = service();
        let other = TokenService::new("other-secret", Algorithm::HS256, Duration::minutes(30));
        let token = other.issue(&Identity::new("testuser"), None).unwrap();
        assert_eq!(svc.validate(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn token_without_subject_is_rejected() {
        let svc = service();
        let claims = Claims {
            sub: None,
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        assert_eq!(svc.validate(&token), Err(TokenError::MissingSubject));
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service();
        assert_eq!(svc.validate("not-a-jwt"), Err(TokenError::Malformed));
        assert_eq!(svc.validate(""), Err(TokenError::Malformed));
    }
}
