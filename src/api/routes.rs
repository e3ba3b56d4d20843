//! Application route configuration.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    auditoria_routes, auth_routes, barril_routes, bodega_routes, caja_routes, dashboard_routes,
    devolucion_routes, movimiento_routes, rol_routes, session_routes, usuario_routes, venta_routes,
};
use super::middleware::auth_middleware;
use super::openapi::ApiDoc;
use super::AppState;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // Health check endpoints
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes(state.clone()))
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Everything under `/api`; only the login route is public.
fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/auth", session_routes())
        .nest("/usuarios", usuario_routes())
        .nest("/roles", rol_routes())
        .nest("/bodegas", bodega_routes())
        .nest("/barriles", barril_routes())
        .nest("/caja", caja_routes())
        .nest("/ventas", venta_routes())
        .nest("/devoluciones", devolucion_routes())
        .nest("/movimientos", movimiento_routes())
        .nest("/dashboard", dashboard_routes())
        .nest("/auditoria", auditoria_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().nest("/auth", auth_routes()).merge(protected)
}

/// `*` allows any origin; otherwise only the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

/// Root endpoint
async fn root() -> &'static str {
    "BrewMaster SIGB API"
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Health check endpoint with database connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status_code, database) = match state.database.ping().await {
        Ok(_) => (
            StatusCode::OK,
            ServiceStatus {
                status: "healthy",
                error: None,
            },
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            ServiceStatus {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        ),
    };

    let response = HealthResponse {
        status: if status_code.is_success() { "healthy" } else { "degraded" },
        services: ServiceHealth { database },
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_accepts_wildcard_and_lists() {
        let _ = cors_layer(&["*".to_string()]);
        let _ = cors_layer(&[
            "http://localhost:5173".to_string(),
            "not a header\n".to_string(),
        ]);
    }
}
