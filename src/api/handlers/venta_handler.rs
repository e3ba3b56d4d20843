//! Sale handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{FiltroVentas, LineaVenta, MetodoPago, Venta};
use crate::errors::AppResult;
use crate::services::DatosVenta;
use crate::types::{Created, Paginated, PaginatedVentas, PaginationParams};

/// Sale listing filters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct VentasQuery {
    pub caja_id: Option<i32>,
    pub usuario_id: Option<i32>,
    /// RFC 3339 lower bound (inclusive)
    pub desde: Option<DateTime<Utc>>,
    /// RFC 3339 upper bound (exclusive)
    pub hasta: Option<DateTime<Utc>>,
}

/// One sold item
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct DetalleVentaRequest {
    /// Barrel the item is poured from
    pub barril_id: Option<i32>,
    #[validate(length(min = 1, max = 200, message = "Cada detalle requiere una descripción"))]
    #[schema(example = "Schop Stout 500cc")]
    pub descripcion: String,
    #[validate(range(min = 1, max = 10000, message = "La cantidad debe estar entre 1 y 10000"))]
    #[schema(example = 2)]
    pub cantidad: i32,
    #[validate(range(
        min = 0,
        max = 100000000,
        message = "El precio unitario debe estar entre 0 y 100000000"
    ))]
    #[schema(example = 3500)]
    pub precio_unitario: i64,
    /// Litres per unit, required with `barril_id`
    #[schema(example = 0.5)]
    pub volumen_litros: Option<f64>,
}

impl From<DetalleVentaRequest> for LineaVenta {
    fn from(req: DetalleVentaRequest) -> Self {
        Self {
            barril_id: req.barril_id,
            descripcion: req.descripcion.trim().to_string(),
            cantidad: req.cantidad,
            precio_unitario: req.precio_unitario,
            volumen_litros: req.volumen_litros.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearVentaRequest {
    pub metodo_pago: MetodoPago,
    /// Discount amount in CLP
    pub descuento: Option<i64>,
    /// Discount percentage (0-100); exclusive with `descuento`
    pub descuento_porcentaje: Option<u8>,
    #[validate(length(min = 1, message = "La venta debe tener al menos un detalle"), nested)]
    pub detalles: Vec<DetalleVentaRequest>,
}

impl From<CrearVentaRequest> for DatosVenta {
    fn from(req: CrearVentaRequest) -> Self {
        Self {
            metodo_pago: req.metodo_pago,
            descuento: req.descuento,
            descuento_porcentaje: req.descuento_porcentaje,
            lineas: req.detalles.into_iter().map(LineaVenta::from).collect(),
        }
    }
}

pub fn venta_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ventas).post(create_venta))
        .route("/:id", get(get_venta))
        .route("/:id/anular", post(anular_venta))
}

/// Register a sale on the open register
#[utoipa::path(
    post,
    path = "/api/ventas",
    tag = "Ventas",
    request_body = CrearVentaRequest,
    responses(
        (status = 201, description = "Sale registered", body = Venta),
        (status = 400, description = "No open register, invalid lines or not enough beer"),
        (status = 403, description = "Register owned by another user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_venta(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CrearVentaRequest>,
) -> AppResult<Created<Venta>> {
    let venta = state.services.ventas.create(&user.actor(), payload.into()).await?;
    Ok(Created(venta))
}

/// List sales, newest first
#[utoipa::path(
    get,
    path = "/api/ventas",
    tag = "Ventas",
    params(VentasQuery, PaginationParams),
    responses(
        (status = 200, description = "Sales", body = PaginatedVentas),
        (status = 400, description = "desde after hasta")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_ventas(
    State(state): State<AppState>,
    Query(query): Query<VentasQuery>,
    Query(pagina): Query<PaginationParams>,
) -> AppResult<Json<PaginatedVentas>> {
    let filtro = FiltroVentas {
        caja_id: query.caja_id,
        usuario_id: query.usuario_id,
        desde: query.desde,
        hasta: query.hasta,
    };
    let page = state.services.ventas.list(filtro, pagina.clone()).await?;
    Ok(Json(Paginated::from_page(page, &pagina)))
}

#[utoipa::path(
    get,
    path = "/api/ventas/{id}",
    tag = "Ventas",
    params(("id" = i32, Path, description = "Sale id")),
    responses(
        (status = 200, description = "Sale with its lines", body = Venta),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_venta(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Venta>> {
    Ok(Json(state.services.ventas.get(id).await?))
}

/// Cancel a sale while its register is open (seller or admin)
#[utoipa::path(
    post,
    path = "/api/ventas/{id}/anular",
    tag = "Ventas",
    params(("id" = i32, Path, description = "Sale id")),
    responses(
        (status = 200, description = "Sale cancelled, beer returned to barrels", body = Venta),
        (status = 403, description = "Not the seller"),
        (status = 409, description = "Already cancelled or register closed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn anular_venta(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> AppResult<Json<Venta>> {
    Ok(Json(state.services.ventas.anular(&user.actor(), id).await?))
}
