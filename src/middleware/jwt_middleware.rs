/// JWT Authentication Middleware
///
/// Per-request gate: extract the bearer token, verify the signature,
/// enforce the route's static role set, and inject the verified claims
/// into request extensions for the handler. Stateless — verification is a
/// pure computation, so any number of requests can pass in parallel.
///
/// Failure signals are deliberately distinct: a missing token, an invalid
/// signature and an expired-but-valid signature each produce their own 401
/// message; a valid token with a role outside the allowed set is 403. The
/// client session coordinator keys on the expired variant only.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::auth::validate_access_token;
use crate::configuration::JwtSettings;
use crate::domain::UserRole;
use crate::error::{AppError, AuthError};

pub struct JwtMiddleware {
    jwt_config: JwtSettings,
    allowed_roles: &'static [UserRole],
}

impl JwtMiddleware {
    /// Gate that admits only the given roles. An empty set admits any
    /// authenticated identity.
    pub fn allow(jwt_config: JwtSettings, allowed_roles: &'static [UserRole]) -> Self {
        Self {
            jwt_config,
            allowed_roles,
        }
    }

    /// Gate that only requires a valid access token.
    pub fn authenticated(jwt_config: JwtSettings) -> Self {
        Self::allow(jwt_config, UserRole::ANY_AUTHENTICATED)
    }
}

fn bearer_token(header: Option<&str>) -> Option<&str> {
    header.and_then(|h| h.strip_prefix("Bearer "))
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtMiddlewareService {
            service: Rc::new(service),
            jwt_config: self.jwt_config.clone(),
            allowed_roles: self.allowed_roles,
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: Rc<S>,
    jwt_config: JwtSettings,
    allowed_roles: &'static [UserRole],
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = bearer_token(
            req.headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok()),
        )
        .map(str::to_owned);

        let token = match token {
            Some(token) => token,
            None => {
                tracing::warn!(path = req.path(), "Missing Authorization header");
                return Box::pin(async move {
                    Err(AppError::from(AuthError::MissingToken).into())
                });
            }
        };

        let claims = match validate_access_token(&token, &self.jwt_config) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(path = req.path(), error = %e, "Access token rejected");
                return Box::pin(async move { Err(AppError::from(e).into()) });
            }
        };

        if !self.allowed_roles.is_empty() && !self.allowed_roles.contains(&claims.role) {
            tracing::warn!(
                path = req.path(),
                user_id = %claims.sub,
                role = claims.role.as_str(),
                "Role not permitted for route"
            );
            return Box::pin(async move {
                Err(AppError::from(AuthError::InsufficientRole).into())
            });
        }

        tracing::debug!(
            user_id = %claims.sub,
            role = claims.role.as_str(),
            "Access token validated"
        );
        req.extensions_mut().insert(claims);

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
