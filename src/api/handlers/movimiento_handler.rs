//! Inventory movement log handlers.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::{require_role, CurrentUser};
use crate::api::AppState;
use crate::config::ROLE_BODEGUERO;
use crate::domain::{FiltroMovimientos, Movimiento, TipoMovimiento};
use crate::errors::AppResult;
use crate::types::{Created, Paginated, PaginatedMovimientos, PaginationParams};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MovimientosQuery {
    pub barril_id: Option<i32>,
    pub tipo: Option<TipoMovimiento>,
    pub usuario_id: Option<i32>,
}

/// Manual log entry
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegistrarMovimientoRequest {
    pub barril_id: i32,
    /// `AJUSTE` or `TRASLADO`; other kinds are written by the system
    pub tipo: TipoMovimiento,
    #[validate(length(max = 500))]
    pub detalle: Option<String>,
}

pub fn movimiento_routes() -> Router<AppState> {
    Router::new().route("/", get(list_movimientos).post(registrar_movimiento))
}

/// Movement log, newest first
#[utoipa::path(
    get,
    path = "/api/movimientos",
    tag = "Movimientos",
    params(MovimientosQuery, PaginationParams),
    responses((status = 200, description = "Movements", body = PaginatedMovimientos)),
    security(("bearer_auth" = []))
)]
pub async fn list_movimientos(
    State(state): State<AppState>,
    Query(query): Query<MovimientosQuery>,
    Query(pagina): Query<PaginationParams>,
) -> AppResult<Json<PaginatedMovimientos>> {
    let filtro = FiltroMovimientos {
        barril_id: query.barril_id,
        tipo: query.tipo,
        usuario_id: query.usuario_id,
    };
    let page = state.services.movimientos.list(filtro, pagina.clone()).await?;
    Ok(Json(Paginated::from_page(page, &pagina)))
}

/// Log a manual entry against a barrel (warehouse staff)
#[utoipa::path(
    post,
    path = "/api/movimientos",
    tag = "Movimientos",
    request_body = RegistrarMovimientoRequest,
    responses(
        (status = 201, description = "Entry logged", body = Movimiento),
        (status = 400, description = "Kind reserved for system operations or unknown barrel")
    ),
    security(("bearer_auth" = []))
)]
pub async fn registrar_movimiento(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<RegistrarMovimientoRequest>,
) -> AppResult<Created<Movimiento>> {
    require_role(&user, ROLE_BODEGUERO)?;
    let movimiento = state
        .services
        .movimientos
        .registrar(&user.actor(), payload.barril_id, payload.tipo, payload.detalle)
        .await?;
    Ok(Created(movimiento))
}
