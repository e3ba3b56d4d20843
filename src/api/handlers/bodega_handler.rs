//! Warehouse handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::config::ROLE_BODEGUERO;
use crate::domain::{Barril, Bodega, DatosBodega};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Warehouse data for create and replace
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BodegaRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre de la bodega es obligatorio"))]
    #[schema(example = "Bodega Central")]
    pub nombre: String,
    pub ubicacion: Option<String>,
    /// Barrel slots
    #[validate(range(min = 1, message = "La capacidad debe ser mayor a 0"))]
    pub capacidad: Option<i32>,
}

impl From<BodegaRequest> for DatosBodega {
    fn from(req: BodegaRequest) -> Self {
        Self {
            nombre: req.nombre,
            ubicacion: req.ubicacion,
            capacidad: req.capacidad,
        }
    }
}

pub fn bodega_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bodegas).post(create_bodega))
        .route("/:id", get(get_bodega).put(update_bodega).delete(delete_bodega))
        .route("/:id/barriles", get(barriles_bodega))
}

/// List active warehouses
#[utoipa::path(
    get,
    path = "/api/bodegas",
    tag = "Bodegas",
    responses((status = 200, description = "Active warehouses", body = [Bodega])),
    security(("bearer_auth" = []))
)]
pub async fn list_bodegas(State(state): State<AppState>) -> AppResult<Json<Vec<Bodega>>> {
    Ok(Json(state.services.bodegas.list().await?))
}

#[utoipa::path(
    get,
    path = "/api/bodegas/{id}",
    tag = "Bodegas",
    params(("id" = i32, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Warehouse", body = Bodega),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_bodega(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Bodega>> {
    Ok(Json(state.services.bodegas.get(id).await?))
}

/// Create a warehouse (warehouse staff)
#[utoipa::path(
    post,
    path = "/api/bodegas",
    tag = "Bodegas",
    request_body = BodegaRequest,
    responses(
        (status = 201, description = "Warehouse created", body = Bodega),
        (status = 400, description = "Invalid data or duplicate name"),
        (status = 403, description = "Warehouse staff only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_bodega(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<BodegaRequest>,
) -> AppResult<Created<Bodega>> {
    require_role(&user, ROLE_BODEGUERO)?;
    let bodega = state.services.bodegas.create(&user.actor(), payload.into()).await?;
    Ok(Created(bodega))
}

/// Replace a warehouse's data (warehouse staff)
#[utoipa::path(
    put,
    path = "/api/bodegas/{id}",
    tag = "Bodegas",
    params(("id" = i32, Path, description = "Warehouse id")),
    request_body = BodegaRequest,
    responses(
        (status = 200, description = "Warehouse updated", body = Bodega),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_bodega(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<BodegaRequest>,
) -> AppResult<Json<Bodega>> {
    require_role(&user, ROLE_BODEGUERO)?;
    let bodega = state.services.bodegas.update(&user.actor(), id, payload.into()).await?;
    Ok(Json(bodega))
}

/// Deactivate an empty warehouse (warehouse staff)
#[utoipa::path(
    delete,
    path = "/api/bodegas/{id}",
    tag = "Bodegas",
    params(("id" = i32, Path, description = "Warehouse id")),
    responses(
        (status = 204, description = "Warehouse deactivated"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Warehouse still holds barrels")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_bodega(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    require_role(&user, ROLE_BODEGUERO)?;
    state.services.bodegas.deactivate(&user.actor(), id).await?;
    Ok(NoContent)
}

/// Barrels stored in a warehouse
#[utoipa::path(
    get,
    path = "/api/bodegas/{id}/barriles",
    tag = "Bodegas",
    params(("id" = i32, Path, description = "Warehouse id")),
    responses(
        (status = 200, description = "Active barrels", body = [Barril]),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn barriles_bodega(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<Barril>>> {
    Ok(Json(state.services.bodegas.barriles(id).await?))
}
