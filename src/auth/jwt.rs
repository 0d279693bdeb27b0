/// JWT Token Generation and Validation
///
/// Two independent token classes share one codec: access tokens (short
/// TTL) and refresh tokens (long TTL), signed with distinct secrets so a
/// leaked access token cannot forge a refresh token. Pure functions over
/// their inputs — no I/O, safe to call from any number of threads.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::claims::Claims;
use crate::configuration::JwtSettings;
use crate::domain::UserRole;
use crate::error::{AppError, AuthError};

/// The access/refresh pair minted wholesale at login, signup and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn sign(claims: &Claims, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify a token against one class's secret.
///
/// Distinguishes *expired* (signature valid, clock past `exp`) from
/// *invalid* (bad signature or malformed): callers react differently —
/// expired is retryable via refresh, invalid is terminal. Zero leeway so
/// expiry takes effect exactly at `exp`.
fn verify(token: &str, secret: &str, config: &JwtSettings) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.leeway = 0;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    })
}

pub fn generate_access_token(
    user_id: &Uuid,
    email: &str,
    role: UserRole,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(
        *user_id,
        email.to_string(),
        role,
        config.access_token_expiry,
        config.issuer.clone(),
    );
    sign(&claims, &config.access_secret)
}

pub fn generate_refresh_token(
    user_id: &Uuid,
    email: &str,
    role: UserRole,
    config: &JwtSettings,
) -> Result<String, AppError> {
    let claims = Claims::new(
        *user_id,
        email.to_string(),
        role,
        config.refresh_token_expiry,
        config.issuer.clone(),
    );
    sign(&claims, &config.refresh_secret)
}

/// Mint a fresh access+refresh pair from the same identity snapshot.
pub fn generate_token_pair(
    user_id: &Uuid,
    email: &str,
    role: UserRole,
    config: &JwtSettings,
) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: generate_access_token(user_id, email, role, config)?,
        refresh_token: generate_refresh_token(user_id, email, role, config)?,
    })
}

pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AuthError> {
    verify(token, &config.access_secret, config)
}

pub fn validate_refresh_token(token: &str, config: &JwtSettings) -> Result<Claims, AuthError> {
    verify(token, &config.refresh_secret, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            access_secret: "access-test-secret-at-least-32-chars-long".to_string(),
            refresh_secret: "refresh-test-secret-at-least-32-chars-xx".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "streamhub-test".to_string(),
        }
    }

    #[test]
    fn access_token_round_trip() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token =
            generate_access_token(&user_id, "admin@example.com", UserRole::SuperAdmin, &config)
                .expect("Failed to generate token");
        let claims = validate_access_token(&token, &config).expect("Failed to validate token");

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, UserRole::SuperAdmin);
        assert_eq!(claims.iss, "streamhub-test");
    }

    #[test]
    fn expired_token_is_reported_as_expired_not_invalid() {
        let mut config = get_test_config();
        config.access_token_expiry = -3600;
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, "admin@example.com", UserRole::User, &config)
            .expect("Failed to generate token");

        assert_eq!(
            validate_access_token(&token, &config),
            Err(AuthError::TokenExpired)
        );
    }

    #[test]
    fn tampered_token_is_invalid() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, "admin@example.com", UserRole::User, &config)
            .expect("Failed to generate token");
        let tampered = format!("{}X", token);

        assert_eq!(
            validate_access_token(&tampered, &config),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn garbage_token_is_invalid() {
        let config = get_test_config();
        assert_eq!(
            validate_access_token("invalid.token.here", &config),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn wrong_issuer_is_invalid() {
        let mut config = get_test_config();
        let user_id = Uuid::new_v4();

        let token = generate_access_token(&user_id, "admin@example.com", UserRole::User, &config)
            .expect("Failed to generate token");

        config.issuer = "someone-else".to_string();
        assert_eq!(
            validate_access_token(&token, &config),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn token_classes_do_not_cross_validate() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let access =
            generate_access_token(&user_id, "admin@example.com", UserRole::MiniAdmin, &config)
                .unwrap();
        let refresh =
            generate_refresh_token(&user_id, "admin@example.com", UserRole::MiniAdmin, &config)
                .unwrap();

        // an access token must never pass as a refresh token, and vice versa
        assert_eq!(
            validate_refresh_token(&access, &config),
            Err(AuthError::TokenInvalid)
        );
        assert_eq!(
            validate_access_token(&refresh, &config),
            Err(AuthError::TokenInvalid)
        );
    }

    #[test]
    fn pair_shares_one_identity_snapshot() {
        let config = get_test_config();
        let user_id = Uuid::new_v4();

        let pair =
            generate_token_pair(&user_id, "admin@example.com", UserRole::MiniAdmin, &config)
                .unwrap();

        let access = validate_access_token(&pair.access_token, &config).unwrap();
        let refresh = validate_refresh_token(&pair.refresh_token, &config).unwrap();
        assert_eq!(access.sub, refresh.sub);
        assert_eq!(access.role, refresh.role);
    }
}
