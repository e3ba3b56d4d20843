//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion and reach repositories through the Unit of Work.

mod auditoria_service;
mod auth_service;
mod barril_service;
mod bodega_service;
mod caja_service;
pub mod container;
mod dashboard_service;
mod devolucion_service;
mod movimiento_service;
mod rol_service;
mod usuario_service;
mod venta_service;

pub use container::Services;

pub use auditoria_service::{AuditoriaManager, AuditoriaService};
pub use auth_service::{AuthService, Authenticator, Claims, LoginResponse};
pub use barril_service::{render_qr, BarrilManager, BarrilService};
pub use bodega_service::{BodegaManager, BodegaService};
pub use caja_service::{CajaManager, CajaService};
pub use dashboard_service::{DashboardManager, DashboardService};
pub use devolucion_service::{DatosDevolucion, DevolucionManager, DevolucionService};
pub use movimiento_service::{MovimientoManager, MovimientoService};
pub use rol_service::{RolManager, RolService};
pub use usuario_service::{ActividadUsuario, DatosUsuario, UsuarioManager, UsuarioService};
pub use venta_service::{DatosVenta, VentaManager, VentaService};
