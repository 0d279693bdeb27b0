/// Authentication Routes
///
/// Thin handlers over the auth service: deserialize the camelCase wire
/// DTOs, call the service, wrap the result in the API envelope. The gate
/// middleware has already verified the token and role for protected
/// routes, and left the claims in request extensions.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{self, Claims, RegisterInput, SignupInput};
use crate::configuration::JwtSettings;
use crate::domain::UserRole;
use crate::error::AppError;
use crate::response;
use crate::store::UserStore;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// POST /auth/login — admin-capable roles only (enforced in the service).
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let outcome = auth::login(
        store.get_ref(),
        jwt_config.get_ref(),
        &form.email,
        &form.password,
    )
    .await?;
    Ok(response::ok("Login successful", outcome))
}

/// POST /auth/signup — public self-registration, always USER role.
pub async fn signup(
    form: web::Json<SignupRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let outcome = auth::signup(
        store.get_ref(),
        jwt_config.get_ref(),
        SignupInput {
            username: form.username,
            email: form.email,
            password: form.password,
        },
    )
    .await?;
    Ok(response::created("Signup successful", outcome))
}

/// POST /auth/refresh — exchange a refresh token for a new pair.
pub async fn refresh(
    form: web::Json<RefreshRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let tokens = auth::refresh(store.get_ref(), jwt_config.get_ref(), &form.refresh_token).await?;
    Ok(response::ok("Tokens refreshed", tokens))
}

/// GET /auth/me — echo the verified token payload.
pub async fn me(claims: web::ReqData<Claims>) -> Result<HttpResponse, AppError> {
    Ok(response::ok("Current user", claims.into_inner()))
}

/// PATCH /auth/change-password
pub async fn change_password(
    form: web::Json<ChangePasswordRequest>,
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    auth::change_password(
        store.get_ref(),
        user_id,
        &form.current_password,
        &form.new_password,
    )
    .await?;
    Ok(response::ok_empty("Password changed successfully"))
}

/// POST /auth/register — privileged account creation. The gate admits
/// SUPER_ADMIN and MINI_ADMIN; the service applies the role override for
/// MINI_ADMIN requesters.
pub async fn register(
    form: web::Json<RegisterRequest>,
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let form = form.into_inner();
    let user = auth::register(
        store.get_ref(),
        RegisterInput {
            username: form.username,
            email: form.email,
            password: form.password,
            role: form.role,
        },
        claims.role,
    )
    .await?;
    Ok(response::created("User registered successfully", user))
}

/// GET /auth/users
pub async fn get_users(store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    let users = auth::list_users(store.get_ref()).await?;
    Ok(response::ok("Users retrieved", users))
}

/// DELETE /auth/users/{id} — self-delete forbidden.
pub async fn delete_user(
    path: web::Path<Uuid>,
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let requester_id = claims.user_id()?;
    auth::delete_user(store.get_ref(), path.into_inner(), requester_id).await?;
    Ok(response::no_content())
}

/// PATCH /auth/users/{id}/block — self-block forbidden.
pub async fn toggle_block(
    path: web::Path<Uuid>,
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let requester_id = claims.user_id()?;
    let user = auth::toggle_block(store.get_ref(), path.into_inner(), requester_id).await?;
    let message = if user.is_blocked {
        "User blocked successfully"
    } else {
        "User unblocked successfully"
    };
    Ok(response::ok(message, user))
}
