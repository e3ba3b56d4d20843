//! JWT authentication middleware.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, ROLE_ADMIN};
use crate::domain::Actor;
use crate::errors::AppError;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i32,
    pub rut: String,
    pub rol: String,
}

impl CurrentUser {
    /// Check if user has admin role.
    pub fn is_admin(&self) -> bool {
        self.rol == ROLE_ADMIN
    }

    /// The requester as passed to services
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.rol.clone())
    }
}

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix(BEARER_TOKEN_PREFIX)
        .ok_or(AppError::Unauthorized)?;

    let claims = state.services.auth.verify_token(token)?;

    let current_user = CurrentUser {
        id: claims.sub,
        rut: claims.rut,
        rol: claims.rol,
    };

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        tracing::debug!("User {} ({}) denied admin route", user.id, user.rol);
        Err(AppError::Forbidden)
    }
}

/// Require `required_role`; admins pass every role check.
pub fn require_role(user: &CurrentUser, required_role: &str) -> Result<(), AppError> {
    if user.rol == required_role || user.is_admin() {
        Ok(())
    } else {
        tracing::debug!("User {} ({}) lacks role {}", user.id, user.rol, required_role);
        Err(AppError::Forbidden)
    }
}
