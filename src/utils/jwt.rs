// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{config::Config, error::AppError, models::user::User, repository::users};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the username.
    pub sub: String,
    /// Issued-at as Unix timestamp.
    pub iat: usize,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

/// Signs a new access token for `username` using the configured algorithm
/// and lifetime.
pub fn sign_jwt(username: &str, config: &Config) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize;

    let claims = Claims {
        sub: username.to_owned(),
        iat: now,
        exp: now + config.jwt_expiration as usize,
    };

    encode(
        &Header::new(config.jwt_algorithm),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies signature, algorithm and expiry, and decodes the claims.
pub fn verify_jwt(token: &str, config: &Config) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(config.jwt_algorithm),
    )
    .map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        AppError::invalid_credentials()
    })?;

    Ok(token_data.claims)
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// The authenticated caller.
///
/// Taking this as a handler argument makes the route protected: the bearer
/// token is validated and its subject resolved to a stored user, otherwise
/// the request is rejected with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SqlitePool: FromRef<S>,
    Config: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(AppError::invalid_credentials)?;

        let config = Config::from_ref(state);
        let claims = verify_jwt(token, &config)?;

        let pool = SqlitePool::from_ref(state);
        let mut conn = pool.acquire().await?;
        let user = users::find_by_username(&mut conn, &claims.sub)
            .await?
            .ok_or_else(|| {
                tracing::debug!("Token subject '{}' no longer exists", claims.sub);
                AppError::invalid_credentials()
            })?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::Algorithm;

    fn config(secret: &str, algorithm: Algorithm, expiration: u64) -> Config {
        Config {
            database_url: "sqlite::memory:".into(),
            jwt_secret: secret.into(),
            jwt_algorithm: algorithm,
            jwt_expiration: expiration,
            ai_api_key: "k".into(),
            ai_model: "m".into(),
            ai_base_url: "http://localhost".into(),
            ai_timeout_secs: 1,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            cors_origins: vec![],
            rust_log: "error".into(),
        }
    }

    #[test]
    fn round_trips_subject() {
        let cfg = config("secret", Algorithm::HS384, 600);
        let token = sign_jwt("ayse", &cfg).unwrap();
        let claims = verify_jwt(&token, &cfg).unwrap();
        assert_eq!(claims.sub, "ayse");
        assert_eq!(claims.exp - claims.iat, 600);
    }

    #[test]
    fn rejects_wrong_secret_and_algorithm() {
        let token = sign_jwt("ayse", &config("secret", Algorithm::HS256, 600)).unwrap();
        assert!(matches!(
            verify_jwt(&token, &config("other", Algorithm::HS256, 600)),
            Err(AppError::AuthError(_))
        ));
        assert!(matches!(
            verify_jwt(&token, &config("secret", Algorithm::HS512, 600)),
            Err(AppError::AuthError(_))
        ));
    }

    #[test]
    fn rejects_expired_token() {
        let cfg = config("secret", Algorithm::HS256, 600);
        let past = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize
            - 3600;
        let claims = Claims { sub: "ayse".into(), iat: past - 600, exp: past };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();
        assert!(verify_jwt(&token, &cfg).is_err());
    }

    #[test]
    fn parses_bearer_header() {
        let (mut parts, _) = axum::http::Request::builder()
            .header(header::AUTHORIZATION, "bearer abc.def")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(bearer_token(&parts), Some("abc.def"));

        parts
            .headers
            .insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
        assert_eq!(bearer_token(&parts), None);
    }
}
