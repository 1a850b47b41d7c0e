use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// The two token classes, each signed with its own secret
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub sid: String,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Expected a {0:?} token")]
    WrongKind(TokenKind),

    #[error("Token lifetime of {0:?} is out of range")]
    LifetimeOutOfRange(Duration),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub session_id: String,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SigningKeys {
    fn from_secret(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Issues and verifies HS256 access/refresh tokens
pub struct TokenService {
    access: SigningKeys,
    refresh: SigningKeys,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: &SecurityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            access: SigningKeys::from_secret(&config.jwt_secret, config.jwt_expires_in),
            refresh: SigningKeys::from_secret(&config.refresh_token_secret, config.refresh_token_expires_in),
            validation,
        }
    }

    fn keys(&self, kind: TokenKind) -> &SigningKeys {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    /// Start a new session for `user_id`
    pub fn issue_pair(&self, user_id: &str) -> Result<TokenPair, TokenError> {
        let session_id = format!("sess_{}", Uuid::new_v4().simple());
        self.pair_for_session(user_id, &session_id)
    }

    /// Rotate a session: a valid refresh token yields a fresh pair for the same session
    pub fn refresh(&self, refresh_token: &str) -> Result<TokenPair, TokenError> {
        let claims = self.verify(refresh_token, TokenKind::Refresh)?;
        self.pair_for_session(&claims.sub, &claims.sid)
    }

    pub fn verify_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify(token, TokenKind::Refresh)
    }

    fn pair_for_session(&self, user_id: &str, session_id: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.sign(TokenKind::Access, user_id, session_id)?,
            refresh_token: self.sign(TokenKind::Refresh, user_id, session_id)?,
            token_type: "Bearer".to_string(),
            expires_in: self.access.ttl.as_secs(),
            session_id: session_id.to_string(),
        })
    }

    fn sign(&self, kind: TokenKind, user_id: &str, session_id: &str) -> Result<String, TokenError> {
        let keys = self.keys(kind);
        let now = Utc::now().timestamp();
        let exp = i64::try_from(keys.ttl.as_secs())
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .ok_or(TokenError::LifetimeOutOfRange(keys.ttl))?;
        let claims = Claims {
            sub: user_id.to_string(),
            sid: session_id.to_string(),
            typ: kind,
            iat: now,
            exp,
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)?)
    }

    fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation)?;
        if data.claims.typ != kind {
            return Err(TokenError::WrongKind(kind));
        }
        Ok(data.claims)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn security_config() -> SecurityConfig {
        SecurityConfig {
            cors_origin: "http://localhost:5173".to_string(),
            jwt_secret: "access-secret-access-secret-access-secret".to_string(),
            jwt_expires_in: Duration::from_secs(15 * 60),
            refresh_token_secret: "refresh-secret-refresh-secret-refresh-secret".to_string(),
            refresh_token_expires_in: Duration::from_secs(7 * 24 * 3600),
        }
    }

    #[test]
    fn test_issue_and_verify_access() {
        let service = TokenService::new(&security_config());
        let pair = service.issue_pair("user_123").unwrap();

        let claims = service.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.sid, pair.session_id);
        assert_eq!(claims.typ, TokenKind::Access);
        assert_eq!(pair.expires_in, 900);
        assert_eq!(pair.token_type, "Bearer");
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let service = TokenService::new(&security_config());
        let pair = service.issue_pair("user_123").unwrap();

        // Different secret, so signature check fails before the class check
        assert!(service.verify_access(&pair.refresh_token).is_err());
        assert!(service.verify_refresh(&pair.access_token).is_err());
    }

    #[test]
    fn test_class_mismatch_with_shared_secret() {
        let mut config = security_config();
        config.refresh_token_secret = config.jwt_secret.clone();
        let service = TokenService::new(&config);
        let pair = service.issue_pair("user_123").unwrap();

        match service.verify_access(&pair.refresh_token) {
            Err(TokenError::WrongKind(TokenKind::Access)) => {}
            other => panic!("expected WrongKind, got {:?}", other.map(|c| c.typ)),
        }
    }

    #[test]
    fn test_expired_token_rejected() {
        let config = security_config();
        let service = TokenService::new(&config);
        let past = Utc::now().timestamp() - 3600;
        let claims = Claims {
            sub: "user_123".to_string(),
            sid: "sess_old".to_string(),
            typ: TokenKind::Access,
            iat: past - 900,
            exp: past,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .unwrap();

        assert!(service.verify_access(&token).is_err());
    }

    #[test]
    fn test_refresh_keeps_session() {
        let service = TokenService::new(&security_config());
        let pair = service.issue_pair("user_123").unwrap();
        let rotated = service.refresh(&pair.refresh_token).unwrap();

        assert_eq!(rotated.session_id, pair.session_id);
        let claims = service.verify_access(&rotated.access_token).unwrap();
        assert_eq!(claims.sub, "user_123");
    }

    #[test]
    fn test_garbage_rejected() {
        let service = TokenService::new(&security_config());
        assert!(service.verify_access("not-a-jwt").is_err());
    }

    #[test]
    fn test_unrepresentable_lifetime_is_an_error() {
        let mut config = security_config();
        config.jwt_expires_in = Duration::from_secs(9_223_372_036_854_775_000);
        let service = TokenService::new(&config);

        let err = service.issue_pair("user_123").unwrap_err();
        assert!(matches!(err, TokenError::LifetimeOutOfRange(_)));
    }
}
