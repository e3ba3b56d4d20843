//! Staff account handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, patch, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CambiosUsuario, UsuarioResponse};
use crate::errors::AppResult;
use crate::services::{ActividadUsuario, DatosUsuario};
use crate::types::{Created, MessageResponse};

/// New staff account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearUsuarioRequest {
    #[schema(example = "12.345.678-5")]
    pub rut: String,
    #[validate(length(min = 1, max = 120, message = "El nombre es obligatorio"))]
    #[schema(example = "Camila Rojas")]
    pub nombre: String,
    #[validate(email(message = "Email inválido"))]
    #[schema(example = "camila@brewmaster.cl")]
    pub email: String,
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    #[schema(example = "cerveza123", min_length = 6)]
    pub password: String,
    #[schema(example = 2)]
    pub rol_id: i32,
}

/// Partial account update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActualizarUsuarioRequest {
    #[validate(length(min = 1, max = 120, message = "El nombre no puede estar vacío"))]
    pub nombre: Option<String>,
    #[validate(email(message = "Email inválido"))]
    pub email: Option<String>,
    pub rol_id: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActivoRequest {
    pub activo: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PasswordRequest {
    #[validate(length(min = 6, message = "La contraseña debe tener al menos 6 caracteres"))]
    #[schema(min_length = 6)]
    pub password: String,
}

pub fn usuario_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_usuarios).post(create_usuario))
        .route("/:id", get(get_usuario).put(update_usuario))
        .route("/:id/activo", patch(set_activo))
        .route("/:id/password", put(cambiar_password))
        .route("/:id/actividad", get(actividad))
}

/// List staff accounts (admin)
#[utoipa::path(
    get,
    path = "/api/usuarios",
    tag = "Usuarios",
    responses(
        (status = 200, description = "All accounts", body = [UsuarioResponse]),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_usuarios(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UsuarioResponse>>> {
    require_admin(&user)?;
    let usuarios = state.services.usuarios.list().await?;
    Ok(Json(usuarios.into_iter().map(UsuarioResponse::from).collect()))
}

/// Get one account (self or admin)
#[utoipa::path(
    get,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Account", body = UsuarioResponse),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_usuario(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<UsuarioResponse>> {
    let usuario = state.services.usuarios.get(&user.actor(), id).await?;
    Ok(Json(UsuarioResponse::from(usuario)))
}

/// Create an account (admin)
#[utoipa::path(
    post,
    path = "/api/usuarios",
    tag = "Usuarios",
    request_body = CrearUsuarioRequest,
    responses(
        (status = 201, description = "Account created", body = UsuarioResponse),
        (status = 400, description = "Invalid data, invalid RUT, or duplicate RUT/email"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_usuario(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CrearUsuarioRequest>,
) -> AppResult<Created<UsuarioResponse>> {
    require_admin(&user)?;
    let usuario = state
        .services
        .usuarios
        .create(
            &user.actor(),
            DatosUsuario {
                rut: payload.rut,
                nombre: payload.nombre,
                email: payload.email,
                password: payload.password,
                rol_id: payload.rol_id,
            },
        )
        .await?;
    Ok(Created(UsuarioResponse::from(usuario)))
}

/// Update name, email or role (admin)
#[utoipa::path(
    put,
    path = "/api/usuarios/{id}",
    tag = "Usuarios",
    params(("id" = i32, Path, description = "User id")),
    request_body = ActualizarUsuarioRequest,
    responses(
        (status = 200, description = "Account updated", body = UsuarioResponse),
        (status = 400, description = "Invalid data or duplicate email"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_usuario(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ActualizarUsuarioRequest>,
) -> AppResult<Json<UsuarioResponse>> {
    require_admin(&user)?;
    let cambios = CambiosUsuario {
        nombre: payload.nombre,
        email: payload.email,
        rol_id: payload.rol_id,
    };
    let usuario = state.services.usuarios.update(&user.actor(), id, cambios).await?;
    Ok(Json(UsuarioResponse::from(usuario)))
}

/// Activate or deactivate an account (admin)
#[utoipa::path(
    patch,
    path = "/api/usuarios/{id}/activo",
    tag = "Usuarios",
    params(("id" = i32, Path, description = "User id")),
    request_body = ActivoRequest,
    responses(
        (status = 200, description = "Account updated", body = UsuarioResponse),
        (status = 400, description = "Cannot deactivate yourself"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_activo(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ActivoRequest>,
) -> AppResult<Json<UsuarioResponse>> {
    require_admin(&user)?;
    let usuario = state
        .services
        .usuarios
        .set_activo(&user.actor(), id, payload.activo)
        .await?;
    Ok(Json(UsuarioResponse::from(usuario)))
}

/// Change a password (self or admin)
#[utoipa::path(
    put,
    path = "/api/usuarios/{id}/password",
    tag = "Usuarios",
    params(("id" = i32, Path, description = "User id")),
    request_body = PasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Password too short"),
        (status = 403, description = "Not allowed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cambiar_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<PasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .services
        .usuarios
        .cambiar_password(&user.actor(), id, payload.password)
        .await?;
    Ok(Json(MessageResponse::new("Contraseña actualizada")))
}

/// Recent activity of an account (self or admin)
#[utoipa::path(
    get,
    path = "/api/usuarios/{id}/actividad",
    tag = "Usuarios",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 200, description = "Recent sales, movements, registers and logins", body = ActividadUsuario),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn actividad(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ActividadUsuario>> {
    let actividad = state.services.usuarios.actividad(&user.actor(), id).await?;
    Ok(Json(actividad))
}
