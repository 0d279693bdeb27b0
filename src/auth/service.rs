/// Account lifecycle and token issuance
///
/// Every operation goes through the `UserStore` trait and returns typed
/// errors; HTTP translation happens in one place (error.rs). Password
/// hashes never leave this layer.

use serde::Serialize;
use uuid::Uuid;

use crate::auth::jwt::{generate_token_pair, validate_refresh_token, TokenPair};
use crate::auth::password::{hash_password, verify_password, DUMMY_PASSWORD_HASH};
use crate::configuration::JwtSettings;
use crate::domain::{UserPublic, UserRole};
use crate::error::{AppError, AuthError};
use crate::store::{NewUser, UserStore};
use crate::validators::{is_valid_email, is_valid_username};

/// Successful login/signup: sanitized user plus a fresh token pair.
#[derive(Debug, Serialize)]
pub struct LoginOutcome {
    pub user: UserPublic,
    pub tokens: TokenPair,
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

/// Authenticate on the admin entry point.
///
/// Absent user, wrong password and non-admin role all collapse into the
/// same `InvalidCredentials`, and the absent-user path still burns one
/// bcrypt verification so it cannot be told apart by timing. The blocked
/// check runs last: it only fires once the credentials themselves proved
/// valid.
pub async fn login(
    store: &dyn UserStore,
    jwt_config: &JwtSettings,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, AppError> {
    let email = is_valid_email(email)?;

    let user = match store.find_by_email(&email).await? {
        Some(user) => user,
        None => {
            let _ = verify_password(password, DUMMY_PASSWORD_HASH);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    if !verify_password(password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    // this entry point is for admin-capable roles only
    if !user.role.is_admin() {
        return Err(AuthError::InvalidCredentials.into());
    }

    if user.is_blocked {
        return Err(AuthError::AccountBlocked.into());
    }

    let tokens = generate_token_pair(&user.id, &user.email, user.role, jwt_config)?;

    tracing::info!(user_id = %user.id, role = user.role.as_str(), "User logged in");

    Ok(LoginOutcome {
        user: user.to_public(),
        tokens,
    })
}

/// Public self-registration. The role is always USER regardless of input.
pub async fn signup(
    store: &dyn UserStore,
    jwt_config: &JwtSettings,
    input: SignupInput,
) -> Result<LoginOutcome, AppError> {
    let email = is_valid_email(&input.email)?;
    let username = is_valid_username(&input.username)?;
    ensure_not_taken(store, &email, &username).await?;

    let password_hash = hash_password(&input.password)?;
    let user = store
        .insert(NewUser {
            username,
            email,
            password_hash,
            role: UserRole::User,
        })
        .await?;

    let tokens = generate_token_pair(&user.id, &user.email, user.role, jwt_config)?;

    tracing::info!(user_id = %user.id, "User signed up");

    Ok(LoginOutcome {
        user: user.to_public(),
        tokens,
    })
}

/// Privileged creation of admin accounts.
///
/// A MINI_ADMIN requester can only create MINI_ADMIN accounts: the
/// requested role is silently overridden, not rejected. A SUPER_ADMIN
/// requester gets the requested role verbatim; MINI_ADMIN when omitted.
pub async fn register(
    store: &dyn UserStore,
    input: RegisterInput,
    requester_role: UserRole,
) -> Result<UserPublic, AppError> {
    let email = is_valid_email(&input.email)?;
    let username = is_valid_username(&input.username)?;
    ensure_not_taken(store, &email, &username).await?;

    let role = if requester_role == UserRole::MiniAdmin {
        UserRole::MiniAdmin
    } else {
        input.role.unwrap_or(UserRole::MiniAdmin)
    };

    let password_hash = hash_password(&input.password)?;
    let user = store
        .insert(NewUser {
            username,
            email,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(
        user_id = %user.id,
        role = user.role.as_str(),
        requester_role = requester_role.as_str(),
        "User registered"
    );

    Ok(user.to_public())
}

/// Exchange a refresh token for a brand-new access+refresh pair.
///
/// Verifies against the refresh secret only; every verification failure
/// surfaces as `TokenInvalid` (an expired refresh token is not retryable).
/// The user record is re-read so a role change lands in the new pair and a
/// block terminates the session here.
pub async fn refresh(
    store: &dyn UserStore,
    jwt_config: &JwtSettings,
    refresh_token: &str,
) -> Result<TokenPair, AppError> {
    let claims =
        validate_refresh_token(refresh_token, jwt_config).map_err(|_| AuthError::TokenInvalid)?;
    let user_id = claims.user_id()?;

    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or(AuthError::TokenInvalid)?;

    if user.is_blocked {
        return Err(AuthError::AccountBlocked.into());
    }

    let tokens = generate_token_pair(&user.id, &user.email, user.role, jwt_config)?;

    tracing::debug!(user_id = %user.id, "Tokens refreshed");

    Ok(tokens)
}

/// Change the caller's own password. Outstanding tokens remain valid until
/// natural expiry; there is no revocation list to purge.
pub async fn change_password(
    store: &dyn UserStore,
    user_id: Uuid,
    current_password: &str,
    new_password: &str,
) -> Result<(), AppError> {
    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    if !verify_password(current_password, &user.password_hash)? {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(new_password)?;
    store.update_password(user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password changed");

    Ok(())
}

/// Flip the blocked flag on another account. Self-block is categorically
/// forbidden, independent of role.
pub async fn toggle_block(
    store: &dyn UserStore,
    target_id: Uuid,
    requester_id: Uuid,
) -> Result<UserPublic, AppError> {
    if target_id == requester_id {
        return Err(AppError::BadRequest(
            "You cannot block your own account".to_string(),
        ));
    }

    let user = store
        .find_by_id(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    let updated = store
        .set_blocked(target_id, !user.is_blocked)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    tracing::info!(
        user_id = %updated.id,
        blocked = updated.is_blocked,
        requester_id = %requester_id,
        "Block flag toggled"
    );

    Ok(updated.to_public())
}

/// Delete another account. Same self-protection rule as toggle_block.
pub async fn delete_user(
    store: &dyn UserStore,
    target_id: Uuid,
    requester_id: Uuid,
) -> Result<(), AppError> {
    if target_id == requester_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    store
        .find_by_id(target_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User".to_string()))?;

    store.delete(target_id).await?;

    tracing::info!(user_id = %target_id, requester_id = %requester_id, "User deleted");

    Ok(())
}

pub async fn list_users(store: &dyn UserStore) -> Result<Vec<UserPublic>, AppError> {
    let users = store.list_all().await?;
    Ok(users.iter().map(|u| u.to_public()).collect())
}

async fn ensure_not_taken(
    store: &dyn UserStore,
    email: &str,
    username: &str,
) -> Result<(), AppError> {
    if store.find_by_email(email).await?.is_some() {
        return Err(AppError::Conflict("Email".to_string()));
    }
    if store.find_by_username(username).await?.is_some() {
        return Err(AppError::Conflict("Username".to_string()));
    }
    Ok(())
}
