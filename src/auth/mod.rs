use axum::http::Method;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ApiError;

/// JWT claims: the principal's identity fields plus issue/expiry timestamps.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

/// Authenticated identity reconstructed from a verified token. Never persisted.
#[derive(Clone, Debug)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
    pub username: String,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            username: claims.username,
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    Generation(String),
    MissingSecret,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Generation(msg) => write!(f, "token generation error: {}", msg),
            TokenError::MissingSecret => write!(f, "JWT secret not configured"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Sign a bearer token for the given principal, valid for the configured TTL
/// (7 days by default).
pub fn issue_token(principal: &Principal) -> Result<String, TokenError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let now = Utc::now();
    let ttl = Duration::days(config::config().security.token_ttl_days);
    let claims = Claims {
        user_id: principal.user_id,
        email: principal.email.clone(),
        username: principal.username.clone(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| TokenError::Generation(e.to_string()))
}

/// Validate a bearer token. Malformed, wrongly-signed and expired tokens all
/// come back as `None`; verification never fails the process.
pub fn verify_token(token: &str) -> Option<Claims> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return None;
    }

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Path-identity authorization: the authenticated principal may only address
/// `/api/users/{id}/...` routes for its own id.
pub fn authorize_path_user(principal: &Principal, path_user_id: i64) -> Result<i64, ApiError> {
    if principal.user_id != path_user_id {
        return Err(ApiError::forbidden(
            "Access denied. You can only access your own data.",
        ));
    }
    Ok(path_user_id)
}

/// Resource-ownership authorization: compares the principal against a stored
/// record's owning user id, fetched by the caller beforehand.
pub fn authorize_owner(principal: &Principal, owner_user_id: i64) -> Result<(), ApiError> {
    if principal.user_id != owner_user_id {
        return Err(ApiError::forbidden(
            "Access denied. You can only modify your own resources.",
        ));
    }
    Ok(())
}

/// Routes exempt from authentication: registration, login, and the read-only
/// public catalogs.
const PUBLIC_ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/"),
    ("GET", "/health"),
    ("POST", "/api/users"),
    ("POST", "/api/users/login"),
    ("GET", "/api/achievements"),
    ("GET", "/api/rewards"),
    ("GET", "/api/education/modules"),
    ("GET", "/api/seasonal-challenges"),
    ("GET", "/api/teams"),
    ("GET", "/api/communities"),
    ("GET", "/api/group-goals"),
];

pub fn is_public_endpoint(method: &Method, path: &str) -> bool {
    PUBLIC_ENDPOINTS
        .iter()
        .any(|(m, p)| *m == method.as_str() && *p == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn principal() -> Principal {
        Principal {
            user_id: 42,
            email: "a@x.com".to_string(),
            username: "a".to_string(),
        }
    }

    #[test]
    fn verify_roundtrips_identity_fields() {
        let token = issue_token(&principal()).unwrap();
        let claims = verify_token(&token).expect("freshly issued token must verify");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.username, "a");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_forged_with_other_secret_is_invalid() {
        let now = Utc::now();
        let claims = Claims {
            user_id: 42,
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(7)).timestamp(),
        };
        let forged = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"not-the-server-secret"),
        )
        .unwrap();

        assert!(verify_token(&forged).is_none());
    }

    #[test]
    fn expired_token_is_invalid() {
        let now = Utc::now();
        let claims = Claims {
            user_id: 42,
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let secret = &crate::config::config().security.jwt_secret;
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_token(&token).is_none());
    }

    #[test]
    fn garbage_token_is_invalid() {
        assert!(verify_token("not.a.jwt").is_none());
        assert!(verify_token("").is_none());
    }

    #[test]
    fn path_identity_check() {
        let p = principal();
        assert_eq!(authorize_path_user(&p, 42).unwrap(), 42);
        assert!(authorize_path_user(&p, 7).is_err());
    }

    #[test]
    fn ownership_check() {
        let p = principal();
        assert!(authorize_owner(&p, 42).is_ok());
        assert!(authorize_owner(&p, 9).is_err());
    }

    #[test]
    fn public_endpoint_table() {
        assert!(is_public_endpoint(&Method::POST, "/api/users/login"));
        assert!(is_public_endpoint(&Method::GET, "/api/rewards"));
        assert!(!is_public_endpoint(&Method::POST, "/api/rewards"));
        assert!(!is_public_endpoint(&Method::GET, "/api/users/1"));
        assert!(!is_public_endpoint(&Method::POST, "/api/transactions"));
    }
}
