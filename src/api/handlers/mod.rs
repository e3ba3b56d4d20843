//! HTTP request handlers.

pub mod auditoria_handler;
pub mod auth_handler;
pub mod barril_handler;
pub mod bodega_handler;
pub mod caja_handler;
pub mod dashboard_handler;
pub mod devolucion_handler;
pub mod movimiento_handler;
pub mod rol_handler;
pub mod usuario_handler;
pub mod venta_handler;

pub use auditoria_handler::auditoria_routes;
pub use auth_handler::{auth_routes, session_routes};
pub use barril_handler::barril_routes;
pub use bodega_handler::bodega_routes;
pub use caja_handler::caja_routes;
pub use dashboard_handler::dashboard_routes;
pub use devolucion_handler::devolucion_routes;
pub use movimiento_handler::movimiento_routes;
pub use rol_handler::rol_routes;
pub use usuario_handler::usuario_routes;
pub use venta_handler::venta_routes;
