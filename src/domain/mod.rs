//! Domain layer - Core business entities and logic
//!
//! Entities, value objects and the pure rules of the bar: barrel volume
//! accounting, register open/close decisions, sale totals and refunds.
//! Nothing here touches the database.

pub mod auditoria;
pub mod barril;
pub mod bodega;
pub mod caja;
pub mod dashboard;
pub mod devolucion;
pub mod movimiento;
pub mod password;
pub mod rut;
pub mod usuario;
pub mod venta;

pub use auditoria::{FiltroAuditoria, IntentoLogin, NuevaAuditoria, NuevoIntentoLogin, RegistroAuditoria};
pub use barril::{Barril, CambiosBarril, EstadoBarril, FiltroBarriles, NuevoBarril};
pub use bodega::{Bodega, DatosBodega};
pub use caja::{
    AperturaCaja, Caja, CajaBarril, CierreCaja, EstadoCaja, PlanApertura, ResultadoApertura,
    ResumenCaja, TotalMetodo,
};
pub use dashboard::ResumenDashboard;
pub use devolucion::{Devolucion, DevolucionDetalle, LineaDevolucion, NuevaDevolucion};
pub use movimiento::{CambioBarril, FiltroMovimientos, Movimiento, NuevoMovimiento, TipoMovimiento};
pub use password::Password;
pub use rut::Rut;
pub use usuario::{Actor, CambiosUsuario, NuevoUsuario, Rol, Usuario, UsuarioResponse};
pub use venta::{
    Descuento, EstadoVenta, FiltroVentas, LineaVenta, MetodoPago, NuevaVenta, Totales, Venta,
    VentaDetalle,
};
