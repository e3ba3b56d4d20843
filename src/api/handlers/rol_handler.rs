//! Role handlers.

use axum::{extract::State, response::Json, routing::get, Extension, Router};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::Rol;
use crate::errors::AppResult;
use crate::types::Created;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearRolRequest {
    #[validate(length(min = 1, max = 50, message = "El nombre del rol es obligatorio"))]
    #[schema(example = "SUPERVISOR")]
    pub nombre: String,
    pub descripcion: Option<String>,
}

pub fn rol_routes() -> Router<AppState> {
    Router::new().route("/", get(list_roles).post(create_rol))
}

/// List roles
#[utoipa::path(
    get,
    path = "/api/roles",
    tag = "Roles",
    responses((status = 200, description = "All roles", body = [Rol])),
    security(("bearer_auth" = []))
)]
pub async fn list_roles(State(state): State<AppState>) -> AppResult<Json<Vec<Rol>>> {
    Ok(Json(state.services.roles.list().await?))
}

/// Create a role (admin)
#[utoipa::path(
    post,
    path = "/api/roles",
    tag = "Roles",
    request_body = CrearRolRequest,
    responses(
        (status = 201, description = "Role created", body = Rol),
        (status = 400, description = "Invalid or duplicate name"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_rol(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CrearRolRequest>,
) -> AppResult<Created<Rol>> {
    require_admin(&user)?;
    let rol = state
        .services
        .roles
        .create(&user.actor(), payload.nombre, payload.descripcion)
        .await?;
    Ok(Created(rol))
}
