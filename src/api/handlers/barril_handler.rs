//! Barrel handlers, QR lookup and QR image.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, patch, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::config::ROLE_BODEGUERO;
use crate::domain::{Barril, CambiosBarril, EstadoBarril, FiltroBarriles, NuevoBarril};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, PaginatedMovimientos, PaginationParams};

/// Barrel listing filters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BarrilesQuery {
    pub estado: Option<EstadoBarril>,
    pub bodega_id: Option<i32>,
}

/// New barrel
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearBarrilRequest {
    /// QR payload; generated as `BRL-XXXXXXXX` when omitted
    #[validate(length(max = 64, message = "El código es demasiado largo"))]
    pub codigo: Option<String>,
    #[validate(length(min = 1, max = 100, message = "El tipo de cerveza es obligatorio"))]
    #[schema(example = "Stout")]
    pub tipo_cerveza: String,
    #[schema(example = 50.0)]
    pub capacidad_litros: f64,
    /// Defaults to full capacity
    pub volumen_restante: Option<f64>,
    pub bodega_id: Option<i32>,
    pub ubicacion: Option<String>,
}

/// Partial barrel update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ActualizarBarrilRequest {
    #[validate(length(min = 1, max = 100))]
    pub tipo_cerveza: Option<String>,
    pub capacidad_litros: Option<f64>,
    pub volumen_restante: Option<f64>,
    pub ubicacion: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct EstadoRequest {
    pub estado: EstadoBarril,
    pub detalle: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TrasladoRequest {
    /// Destination warehouse
    pub bodega_id: i32,
    pub detalle: Option<String>,
}

pub fn barril_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_barriles).post(create_barril))
        .route("/qr/:codigo", get(buscar_por_codigo))
        .route("/:id", get(get_barril).put(update_barril).delete(delete_barril))
        .route("/:id/estado", patch(cambiar_estado))
        .route("/:id/traslado", post(trasladar))
        .route("/:id/qr", get(qr_barril))
        .route("/:id/movimientos", get(movimientos_barril))
}

/// List active barrels
#[utoipa::path(
    get,
    path = "/api/barriles",
    tag = "Barriles",
    params(BarrilesQuery),
    responses((status = 200, description = "Active barrels", body = [Barril])),
    security(("bearer_auth" = []))
)]
pub async fn list_barriles(
    State(state): State<AppState>,
    Query(query): Query<BarrilesQuery>,
) -> AppResult<Json<Vec<Barril>>> {
    let filtro = FiltroBarriles {
        estado: query.estado,
        bodega_id: query.bodega_id,
    };
    Ok(Json(state.services.barriles.list(filtro).await?))
}

#[utoipa::path(
    get,
    path = "/api/barriles/{id}",
    tag = "Barriles",
    params(("id" = i32, Path, description = "Barrel id")),
    responses(
        (status = 200, description = "Barrel", body = Barril),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_barril(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Barril>> {
    Ok(Json(state.services.barriles.get(id).await?))
}

/// QR lookup by barrel code
#[utoipa::path(
    get,
    path = "/api/barriles/qr/{codigo}",
    tag = "Barriles",
    params(("codigo" = String, Path, description = "Code read from the QR")),
    responses(
        (status = 200, description = "Barrel", body = Barril),
        (status = 404, description = "Unknown or inactive code")
    ),
    security(("bearer_auth" = []))
)]
pub async fn buscar_por_codigo(
    State(state): State<AppState>,
    Path(codigo): Path<String>,
) -> AppResult<Json<Barril>> {
    Ok(Json(state.services.barriles.por_codigo(&codigo).await?))
}

/// Register a barrel (warehouse staff)
#[utoipa::path(
    post,
    path = "/api/barriles",
    tag = "Barriles",
    request_body = CrearBarrilRequest,
    responses(
        (status = 201, description = "Barrel created", body = Barril),
        (status = 400, description = "Invalid volumes or duplicate code"),
        (status = 403, description = "Warehouse staff only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_barril(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CrearBarrilRequest>,
) -> AppResult<Created<Barril>> {
    require_role(&user, ROLE_BODEGUERO)?;
    let nuevo = NuevoBarril::new(
        payload.codigo,
        payload.tipo_cerveza,
        payload.capacidad_litros,
        payload.volumen_restante,
        payload.bodega_id,
        payload.ubicacion,
    )?;
    let barril = state.services.barriles.create(&user.actor(), nuevo).await?;
    Ok(Created(barril))
}

/// Edit barrel metadata and volume (warehouse staff)
#[utoipa::path(
    put,
    path = "/api/barriles/{id}",
    tag = "Barriles",
    params(("id" = i32, Path, description = "Barrel id")),
    request_body = ActualizarBarrilRequest,
    responses(
        (status = 200, description = "Barrel updated", body = Barril),
        (status = 400, description = "Invalid volumes"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_barril(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<ActualizarBarrilRequest>,
) -> AppResult<Json<Barril>> {
    require_role(&user, ROLE_BODEGUERO)?;
    let cambios = CambiosBarril {
        tipo_cerveza: payload.tipo_cerveza,
        capacidad_litros: payload.capacidad_litros,
        volumen_restante: payload.volumen_restante,
        ubicacion: payload.ubicacion,
    };
    let barril = state.services.barriles.update(&user.actor(), id, cambios).await?;
    Ok(Json(barril))
}

/// Change barrel state (warehouse staff)
#[utoipa::path(
    patch,
    path = "/api/barriles/{id}/estado",
    tag = "Barriles",
    params(("id" = i32, Path, description = "Barrel id")),
    request_body = EstadoRequest,
    responses(
        (status = 200, description = "State changed", body = Barril),
        (status = 400, description = "Transition not allowed"),
        (status = 409, description = "Barrel is in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cambiar_estado(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<EstadoRequest>,
) -> AppResult<Json<Barril>> {
    require_role(&user, ROLE_BODEGUERO)?;
    let barril = state
        .services
        .barriles
        .cambiar_estado(&user.actor(), id, payload.estado, payload.detalle)
        .await?;
    Ok(Json(barril))
}

/// Move a barrel to another warehouse (warehouse staff)
#[utoipa::path(
    post,
    path = "/api/barriles/{id}/traslado",
    tag = "Barriles",
    params(("id" = i32, Path, description = "Barrel id")),
    request_body = TrasladoRequest,
    responses(
        (status = 200, description = "Barrel moved", body = Barril),
        (status = 400, description = "Unknown or same warehouse"),
        (status = 409, description = "Barrel is in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn trasladar(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<TrasladoRequest>,
) -> AppResult<Json<Barril>> {
    require_role(&user, ROLE_BODEGUERO)?;
    let barril = state
        .services
        .barriles
        .trasladar(&user.actor(), id, payload.bodega_id, payload.detalle)
        .await?;
    Ok(Json(barril))
}

/// Deactivate a barrel (warehouse staff)
#[utoipa::path(
    delete,
    path = "/api/barriles/{id}",
    tag = "Barriles",
    params(("id" = i32, Path, description = "Barrel id")),
    responses(
        (status = 204, description = "Barrel deactivated"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Barrel is in use")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_barril(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<NoContent> {
    require_role(&user, ROLE_BODEGUERO)?;
    state.services.barriles.deactivate(id).await?;
    Ok(NoContent)
}

/// QR image of the barrel code
#[utoipa::path(
    get,
    path = "/api/barriles/{id}/qr",
    tag = "Barriles",
    params(("id" = i32, Path, description = "Barrel id")),
    responses(
        (status = 200, description = "SVG image", body = String, content_type = "image/svg+xml"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn qr_barril(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let svg = state.services.barriles.qr_svg(id).await?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}

/// Movement history of a barrel
#[utoipa::path(
    get,
    path = "/api/barriles/{id}/movimientos",
    tag = "Barriles",
    params(("id" = i32, Path, description = "Barrel id"), PaginationParams),
    responses(
        (status = 200, description = "Movements, newest first", body = PaginatedMovimientos),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn movimientos_barril(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(pagina): Query<PaginationParams>,
) -> AppResult<Json<PaginatedMovimientos>> {
    let page = state.services.barriles.movimientos(id, pagina.clone()).await?;
    Ok(Json(Paginated::from_page(page, &pagina)))
}
