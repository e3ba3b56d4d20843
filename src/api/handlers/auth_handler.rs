//! Authentication handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{ClientIp, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::UsuarioResponse;
use crate::errors::AppResult;
use crate::services::LoginResponse;

/// Login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    /// RUT or email
    #[validate(length(min = 1, message = "Ingrese RUT o email"))]
    #[schema(example = "12.345.678-5")]
    pub identificador: String,
    #[validate(length(min = 1, message = "Ingrese la contraseña"))]
    #[schema(example = "cerveza123")]
    pub password: String,
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Authentication routes behind the JWT middleware
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// Login with RUT or email
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Inactive account")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let response = state
        .services
        .auth
        .login(payload.identificador, payload.password, ip)
        .await?;

    Ok(Json(response))
}

/// Current authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Authenticated user", body = UsuarioResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UsuarioResponse>> {
    let usuario = state.services.auth.me(user.id).await?;
    Ok(Json(UsuarioResponse::from(usuario)))
}
