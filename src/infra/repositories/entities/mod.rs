//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models. Enum
//! columns are plain strings; conversion into domain types is fallible.

pub mod auditoria;
pub mod auditoria_login;
pub mod auditoria_movimiento;
pub mod barril;
pub mod bodega;
pub mod caja;
pub mod caja_barril;
pub mod devolucion;
pub mod devolucion_detalle;
pub mod movimiento;
pub mod rol;
pub mod usuario;
pub mod venta;
pub mod venta_detalle;
