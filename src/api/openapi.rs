//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auditoria_handler, auth_handler, barril_handler, bodega_handler, caja_handler,
    dashboard_handler, devolucion_handler, movimiento_handler, rol_handler, usuario_handler,
    venta_handler,
};
use crate::domain::dashboard::{ConteoEstado, TopCerveza, TotalDia};
use crate::domain::{
    AperturaCaja, Barril, Bodega, Caja, CajaBarril, CierreCaja, Devolucion, DevolucionDetalle,
    EstadoBarril, EstadoCaja, EstadoVenta, IntentoLogin, MetodoPago, Movimiento, RegistroAuditoria,
    ResultadoApertura, ResumenCaja, ResumenDashboard, Rol, TipoMovimiento, TotalMetodo,
    UsuarioResponse, Venta, VentaDetalle,
};
use crate::services::{ActividadUsuario, LoginResponse};
use crate::types::{
    MessageResponse, PaginatedAuditoria, PaginatedCajas, PaginatedLogins, PaginatedMovimientos,
    PaginatedVentas, PaginationMeta,
};

/// OpenAPI documentation for the BrewMaster API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "BrewMaster SIGB",
        version = "0.1.0",
        description = "Inventory and point-of-sale backend for breweries and bars",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:4000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::login,
        auth_handler::me,
        // Users and roles
        usuario_handler::list_usuarios,
        usuario_handler::get_usuario,
        usuario_handler::create_usuario,
        usuario_handler::update_usuario,
        usuario_handler::set_activo,
        usuario_handler::cambiar_password,
        usuario_handler::actividad,
        rol_handler::list_roles,
        rol_handler::create_rol,
        // Warehouses and barrels
        bodega_handler::list_bodegas,
        bodega_handler::get_bodega,
        bodega_handler::create_bodega,
        bodega_handler::update_bodega,
        bodega_handler::delete_bodega,
        bodega_handler::barriles_bodega,
        barril_handler::list_barriles,
        barril_handler::get_barril,
        barril_handler::buscar_por_codigo,
        barril_handler::create_barril,
        barril_handler::update_barril,
        barril_handler::cambiar_estado,
        barril_handler::trasladar,
        barril_handler::delete_barril,
        barril_handler::qr_barril,
        barril_handler::movimientos_barril,
        // Register
        caja_handler::abrir_caja,
        caja_handler::cerrar_caja,
        caja_handler::caja_actual,
        caja_handler::list_cajas,
        caja_handler::get_caja,
        caja_handler::resumen_caja,
        caja_handler::barriles_caja,
        caja_handler::asignar_barril,
        caja_handler::liberar_barril,
        // Sales and returns
        venta_handler::create_venta,
        venta_handler::list_ventas,
        venta_handler::get_venta,
        venta_handler::anular_venta,
        devolucion_handler::create_devolucion,
        devolucion_handler::list_devoluciones,
        devolucion_handler::get_devolucion,
        // Movements, dashboard, audit
        movimiento_handler::list_movimientos,
        movimiento_handler::registrar_movimiento,
        dashboard_handler::resumen,
        auditoria_handler::list_auditoria,
        auditoria_handler::list_logins,
    ),
    components(
        schemas(
            // Domain types
            UsuarioResponse,
            Rol,
            Bodega,
            Barril,
            EstadoBarril,
            Caja,
            EstadoCaja,
            AperturaCaja,
            ResultadoApertura,
            CierreCaja,
            ResumenCaja,
            TotalMetodo,
            CajaBarril,
            Venta,
            VentaDetalle,
            EstadoVenta,
            MetodoPago,
            Devolucion,
            DevolucionDetalle,
            Movimiento,
            TipoMovimiento,
            ResumenDashboard,
            TotalDia,
            ConteoEstado,
            TopCerveza,
            RegistroAuditoria,
            IntentoLogin,
            // Service types
            LoginResponse,
            ActividadUsuario,
            // Request types
            auth_handler::LoginRequest,
            usuario_handler::CrearUsuarioRequest,
            usuario_handler::ActualizarUsuarioRequest,
            usuario_handler::ActivoRequest,
            usuario_handler::PasswordRequest,
            rol_handler::CrearRolRequest,
            bodega_handler::BodegaRequest,
            barril_handler::CrearBarrilRequest,
            barril_handler::ActualizarBarrilRequest,
            barril_handler::EstadoRequest,
            barril_handler::TrasladoRequest,
            caja_handler::AbrirCajaRequest,
            caja_handler::CerrarCajaRequest,
            caja_handler::AsignarBarrilRequest,
            venta_handler::CrearVentaRequest,
            venta_handler::DetalleVentaRequest,
            devolucion_handler::CrearDevolucionRequest,
            devolucion_handler::DetalleDevolucionRequest,
            movimiento_handler::RegistrarMovimientoRequest,
            // Shared response types
            MessageResponse,
            PaginationMeta,
            PaginatedVentas,
            PaginatedMovimientos,
            PaginatedCajas,
            PaginatedAuditoria,
            PaginatedLogins,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and current session"),
        (name = "Usuarios", description = "Staff accounts"),
        (name = "Roles", description = "Roles"),
        (name = "Bodegas", description = "Warehouses"),
        (name = "Barriles", description = "Barrels, QR lookup and history"),
        (name = "Caja", description = "Cash register"),
        (name = "Ventas", description = "Sales"),
        (name = "Devoluciones", description = "Returns and refunds"),
        (name = "Movimientos", description = "Inventory movement log"),
        (name = "Dashboard", description = "Sales and inventory overview"),
        (name = "Auditoria", description = "Audit trail (admin)")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /api/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_protected_and_public_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/auth/login"));
        assert!(doc.paths.paths.contains_key("/api/caja/abrir"));
        assert!(doc.paths.paths.contains_key("/api/barriles/{id}/qr"));
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
