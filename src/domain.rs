/// User model and role hierarchy
///
/// Roles form a strict ordering: SUPER_ADMIN > MINI_ADMIN > USER.
/// Route-level policies are expressed as static sets of permitted roles,
/// evaluated by the auth middleware rather than per handler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    MiniAdmin,
    User,
}

impl UserRole {
    /// Role set for routes restricted to SUPER_ADMIN.
    pub const SUPER_ADMIN_ONLY: &'static [UserRole] = &[UserRole::SuperAdmin];
    /// Role set for routes open to both admin tiers.
    pub const ADMINS: &'static [UserRole] = &[UserRole::SuperAdmin, UserRole::MiniAdmin];
    /// Empty set: any authenticated identity passes.
    pub const ANY_AUTHENTICATED: &'static [UserRole] = &[];

    pub fn is_admin(self) -> bool {
        matches!(self, UserRole::SuperAdmin | UserRole::MiniAdmin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::SuperAdmin => "SUPER_ADMIN",
            UserRole::MiniAdmin => "MINI_ADMIN",
            UserRole::User => "USER",
        }
    }

    pub fn parse(value: &str) -> Option<UserRole> {
        match value {
            "SUPER_ADMIN" => Some(UserRole::SuperAdmin),
            "MINI_ADMIN" => Some(UserRole::MiniAdmin),
            "USER" => Some(UserRole::User),
            _ => None,
        }
    }
}

/// Full user record as held by the credential store.
/// The password hash never leaves the store/service layer.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn to_public(&self) -> UserPublic {
        UserPublic {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            is_blocked: self.is_blocked,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User as exposed over the API: everything except the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub is_blocked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_as_screaming_snake() {
        assert_eq!(
            serde_json::to_value(UserRole::SuperAdmin).unwrap(),
            serde_json::json!("SUPER_ADMIN")
        );
        assert_eq!(
            serde_json::to_value(UserRole::MiniAdmin).unwrap(),
            serde_json::json!("MINI_ADMIN")
        );
        assert_eq!(
            serde_json::to_value(UserRole::User).unwrap(),
            serde_json::json!("USER")
        );
    }

    #[test]
    fn parse_round_trips_as_str() {
        for role in [UserRole::SuperAdmin, UserRole::MiniAdmin, UserRole::User] {
            assert_eq!(UserRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(UserRole::parse("ROOT"), None);
    }

    #[test]
    fn only_admin_tiers_are_admin() {
        assert!(UserRole::SuperAdmin.is_admin());
        assert!(UserRole::MiniAdmin.is_admin());
        assert!(!UserRole::User.is_admin());
    }

    #[test]
    fn public_view_omits_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "$2b$12$secret".to_string(),
            role: UserRole::SuperAdmin,
            is_blocked: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(user.to_public()).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["isBlocked"], false);
        assert_eq!(json["username"], "admin");
    }
}
