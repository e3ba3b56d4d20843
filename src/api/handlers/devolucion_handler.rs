//! Return (refund) handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Devolucion, LineaDevolucion};
use crate::errors::AppResult;
use crate::services::DatosDevolucion;
use crate::types::Created;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DevolucionesQuery {
    pub venta_id: Option<i32>,
}

/// Returned units of one sale line
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct DetalleDevolucionRequest {
    pub venta_detalle_id: i32,
    #[validate(range(min = 1, max = 10000, message = "La cantidad debe estar entre 1 y 10000"))]
    pub cantidad: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CrearDevolucionRequest {
    pub venta_id: i32,
    #[validate(length(min = 1, max = 500, message = "El motivo es obligatorio"))]
    #[schema(example = "Cerveza caliente")]
    pub motivo: String,
    /// Put the returned litres back into their barrels
    #[serde(default)]
    pub reintegrar_volumen: bool,
    #[validate(length(min = 1, message = "La devolución debe tener al menos un detalle"), nested)]
    pub detalles: Vec<DetalleDevolucionRequest>,
}

impl From<CrearDevolucionRequest> for DatosDevolucion {
    fn from(req: CrearDevolucionRequest) -> Self {
        Self {
            venta_id: req.venta_id,
            motivo: req.motivo.trim().to_string(),
            reintegrar_volumen: req.reintegrar_volumen,
            lineas: req
                .detalles
                .into_iter()
                .map(|d| LineaDevolucion {
                    venta_detalle_id: d.venta_detalle_id,
                    cantidad: d.cantidad,
                })
                .collect(),
        }
    }
}

pub fn devolucion_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_devoluciones).post(create_devolucion))
        .route("/:id", get(get_devolucion))
}

/// Register a full or partial return of a completed sale
#[utoipa::path(
    post,
    path = "/api/devoluciones",
    tag = "Devoluciones",
    request_body = CrearDevolucionRequest,
    responses(
        (status = 201, description = "Return registered", body = Devolucion),
        (status = 400, description = "Unknown line or quantity above what was sold"),
        (status = 409, description = "Sale is cancelled")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_devolucion(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CrearDevolucionRequest>,
) -> AppResult<Created<Devolucion>> {
    let devolucion = state
        .services
        .devoluciones
        .create(&user.actor(), payload.into())
        .await?;
    Ok(Created(devolucion))
}

#[utoipa::path(
    get,
    path = "/api/devoluciones",
    tag = "Devoluciones",
    params(DevolucionesQuery),
    responses((status = 200, description = "Returns, newest first", body = [Devolucion])),
    security(("bearer_auth" = []))
)]
pub async fn list_devoluciones(
    State(state): State<AppState>,
    Query(query): Query<DevolucionesQuery>,
) -> AppResult<Json<Vec<Devolucion>>> {
    Ok(Json(state.services.devoluciones.list(query.venta_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/devoluciones/{id}",
    tag = "Devoluciones",
    params(("id" = i32, Path, description = "Return id")),
    responses(
        (status = 200, description = "Return with its lines", body = Devolucion),
        (status = 404, description = "Not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_devolucion(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Devolucion>> {
    Ok(Json(state.services.devoluciones.get(id).await?))
}
