/// Credential store
///
/// The auth core reads and writes user records only through the narrow
/// `UserStore` trait. Production runs on Postgres; tests inject the
/// in-memory implementation.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{User, UserRole};
use crate::error::StoreError;

mod memory;
mod postgres;

pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;

/// Insert payload for a new account. The password arrives already hashed;
/// plaintext never crosses this boundary.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    /// Lookup by canonical (lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;

    /// Sets the blocked flag and returns the updated record, or None if the
    /// user no longer exists.
    async fn set_blocked(&self, id: Uuid, blocked: bool) -> Result<Option<User>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// All users, newest first.
    async fn list_all(&self) -> Result<Vec<User>, StoreError>;
}
