/// JWT Claims structure
///
/// Payload carried by both token classes: user identity, role, and the
/// standard JWT claims (RFC 7519). Immutable once issued; a refresh mints
/// a whole new pair rather than mutating an existing payload.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::UserRole;
use crate::error::AuthError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// User email
    pub email: String,
    /// Role at issuance time. A role change is picked up on the next
    /// refresh cycle, when the pair is re-minted from the user record.
    pub role: UserRole,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(
        user_id: Uuid,
        email: String,
        role: UserRole,
        expiry_seconds: i64,
        issuer: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            email,
            role,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    /// Extract the user ID from the claims.
    ///
    /// # Errors
    /// Returns `TokenInvalid` if the subject is not a valid UUID — a token
    /// that verified but carries a malformed subject was not minted here.
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenInvalid)
    }
}
