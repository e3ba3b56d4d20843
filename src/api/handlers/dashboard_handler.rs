//! Dashboard handler.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::ResumenDashboard;
use crate::errors::AppResult;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DashboardQuery {
    /// Window length in days (1-90, default 7)
    pub dias: Option<u32>,
}

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/resumen", get(resumen))
}

/// Sales and inventory overview
#[utoipa::path(
    get,
    path = "/api/dashboard/resumen",
    tag = "Dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Overview", body = ResumenDashboard),
        (status = 400, description = "dias out of range")
    ),
    security(("bearer_auth" = []))
)]
pub async fn resumen(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<ResumenDashboard>> {
    let resumen = state.services.dashboard.resumen(&user.actor(), query.dias).await?;
    Ok(Json(resumen))
}
