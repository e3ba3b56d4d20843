//! Cash-register handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{delete, get, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{AperturaCaja, Barril, Caja, CajaBarril, CierreCaja, ResumenCaja};
use crate::errors::AppResult;
use crate::types::{Created, Paginated, PaginatedCajas, PaginationParams};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct AbrirCajaRequest {
    /// Opening float in CLP; required when a new register is created
    #[validate(range(min = 0, message = "El monto inicial no puede ser negativo"))]
    #[schema(example = 50000)]
    pub monto_inicial: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CerrarCajaRequest {
    /// Counted cash; defaults to the expected amount
    #[validate(range(min = 0, message = "El monto final no puede ser negativo"))]
    pub monto_final: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AsignarBarrilRequest {
    pub barril_id: i32,
}

pub fn caja_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_cajas))
        .route("/abrir", post(abrir_caja))
        .route("/cerrar", post(cerrar_caja))
        .route("/actual", get(caja_actual))
        .route("/:id", get(get_caja))
        .route("/:id/resumen", get(resumen_caja))
        .route("/:id/barriles", get(barriles_caja).post(asignar_barril))
        .route("/:id/barriles/:barril_id", delete(liberar_barril))
}

/// Open the register for the caller
#[utoipa::path(
    post,
    path = "/api/caja/abrir",
    tag = "Caja",
    request_body = AbrirCajaRequest,
    responses(
        (status = 200, description = "Register open; `resultado` tells what happened", body = AperturaCaja),
        (status = 400, description = "Missing or negative float")
    ),
    security(("bearer_auth" = []))
)]
pub async fn abrir_caja(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<AbrirCajaRequest>,
) -> AppResult<Json<AperturaCaja>> {
    let apertura = state
        .services
        .cajas
        .abrir(&user.actor(), payload.monto_inicial)
        .await?;
    Ok(Json(apertura))
}

/// Close the open register (owner or admin)
#[utoipa::path(
    post,
    path = "/api/caja/cerrar",
    tag = "Caja",
    request_body = CerrarCajaRequest,
    responses(
        (status = 200, description = "Register closed with its summary", body = CierreCaja),
        (status = 403, description = "Register owned by another user"),
        (status = 404, description = "No register is open")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cerrar_caja(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CerrarCajaRequest>,
) -> AppResult<Json<CierreCaja>> {
    let cierre = state
        .services
        .cajas
        .cerrar(&user.actor(), payload.monto_final)
        .await?;
    Ok(Json(cierre))
}

/// The open register, or `null`
#[utoipa::path(
    get,
    path = "/api/caja/actual",
    tag = "Caja",
    responses((status = 200, description = "Open register, amounts hidden from other cashiers", body = Option<Caja>)),
    security(("bearer_auth" = []))
)]
pub async fn caja_actual(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Option<Caja>>> {
    Ok(Json(state.services.cajas.actual(&user.actor()).await?))
}

/// Register history, newest first
#[utoipa::path(
    get,
    path = "/api/caja",
    tag = "Caja",
    params(PaginationParams),
    responses((status = 200, description = "Registers", body = PaginatedCajas)),
    security(("bearer_auth" = []))
)]
pub async fn list_cajas(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(pagina): Query<PaginationParams>,
) -> AppResult<Json<PaginatedCajas>> {
    let page = state.services.cajas.list(&user.actor(), pagina.clone()).await?;
    Ok(Json(Paginated::from_page(page, &pagina)))
}

#[utoipa::path(
    get,
    path = "/api/caja/{id}",
    tag = "Caja",
    params(("id" = i32, Path, description = "Register id")),
    responses(
        (status = 200, description = "Register", body = Caja),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_caja(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<Caja>> {
    Ok(Json(state.services.cajas.get(&user.actor(), id).await?))
}

/// Sales, refunds and expected cash of a register (owner or admin)
#[utoipa::path(
    get,
    path = "/api/caja/{id}/resumen",
    tag = "Caja",
    params(("id" = i32, Path, description = "Register id")),
    responses(
        (status = 200, description = "Register summary", body = ResumenCaja),
        (status = 403, description = "Register owned by another user"),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn resumen_caja(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<ResumenCaja>> {
    Ok(Json(state.services.cajas.resumen(&user.actor(), id).await?))
}

/// Barrels currently tapped at a register
#[utoipa::path(
    get,
    path = "/api/caja/{id}/barriles",
    tag = "Caja",
    params(("id" = i32, Path, description = "Register id")),
    responses(
        (status = 200, description = "Active assignments", body = [CajaBarril]),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn barriles_caja(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Vec<CajaBarril>>> {
    Ok(Json(state.services.cajas.barriles(id).await?))
}

/// Tap a barrel at an open register
#[utoipa::path(
    post,
    path = "/api/caja/{id}/barriles",
    tag = "Caja",
    params(("id" = i32, Path, description = "Register id")),
    request_body = AsignarBarrilRequest,
    responses(
        (status = 201, description = "Barrel assigned", body = CajaBarril),
        (status = 400, description = "Register closed or barrel not available"),
        (status = 409, description = "Barrel already assigned")
    ),
    security(("bearer_auth" = []))
)]
pub async fn asignar_barril(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    ValidatedJson(payload): ValidatedJson<AsignarBarrilRequest>,
) -> AppResult<Created<CajaBarril>> {
    let asignacion = state
        .services
        .cajas
        .asignar_barril(&user.actor(), id, payload.barril_id)
        .await?;
    Ok(Created(asignacion))
}

/// Release a barrel from a register
#[utoipa::path(
    delete,
    path = "/api/caja/{id}/barriles/{barril_id}",
    tag = "Caja",
    params(
        ("id" = i32, Path, description = "Register id"),
        ("barril_id" = i32, Path, description = "Barrel id")
    ),
    responses(
        (status = 200, description = "Barrel released", body = Barril),
        (status = 404, description = "Barrel not assigned to this register")
    ),
    security(("bearer_auth" = []))
)]
pub async fn liberar_barril(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, barril_id)): Path<(i32, i32)>,
) -> AppResult<Json<Barril>> {
    let barril = state
        .services
        .cajas
        .liberar_barril(&user.actor(), id, barril_id)
        .await?;
    Ok(Json(barril))
}
