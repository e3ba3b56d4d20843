//! Audit trail handlers (admin).

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::FiltroAuditoria;
use crate::errors::AppResult;
use crate::types::{Paginated, PaginatedAuditoria, PaginatedLogins, PaginationParams};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditoriaQuery {
    /// Table name, e.g. `usuarios`
    pub entidad: Option<String>,
    pub usuario_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LoginsQuery {
    pub usuario_id: Option<i32>,
}

pub fn auditoria_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_auditoria))
        .route("/login", get(list_logins))
}

/// Administrative changes, newest first
#[utoipa::path(
    get,
    path = "/api/auditoria",
    tag = "Auditoria",
    params(AuditoriaQuery, PaginationParams),
    responses(
        (status = 200, description = "Audit rows", body = PaginatedAuditoria),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_auditoria(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<AuditoriaQuery>,
    Query(pagina): Query<PaginationParams>,
) -> AppResult<Json<PaginatedAuditoria>> {
    require_admin(&user)?;
    let filtro = FiltroAuditoria {
        entidad: query.entidad.filter(|e| !e.trim().is_empty()),
        usuario_id: query.usuario_id,
    };
    let page = state.services.auditoria.list(filtro, pagina.clone()).await?;
    Ok(Json(Paginated::from_page(page, &pagina)))
}

/// Login attempts, newest first
#[utoipa::path(
    get,
    path = "/api/auditoria/login",
    tag = "Auditoria",
    params(LoginsQuery, PaginationParams),
    responses(
        (status = 200, description = "Login attempts", body = PaginatedLogins),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_logins(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<LoginsQuery>,
    Query(pagina): Query<PaginationParams>,
) -> AppResult<Json<PaginatedLogins>> {
    require_admin(&user)?;
    let page = state
        .services
        .auditoria
        .list_login(query.usuario_id, pagina.clone())
        .await?;
    Ok(Json(Paginated::from_page(page, &pagina)))
}
