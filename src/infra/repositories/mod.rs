//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.
//! Multi-row writes open their own transaction.

mod auditoria_repository;
mod barril_repository;
mod base;
mod bodega_repository;
mod caja_repository;
mod devolucion_repository;
pub(crate) mod entities;
mod movimiento_repository;
mod usuario_repository;
mod venta_repository;

pub use auditoria_repository::{AuditoriaRepository, AuditoriaStore};
pub use barril_repository::{BarrilRepository, BarrilStore};
pub use bodega_repository::{BodegaRepository, BodegaStore};
pub use caja_repository::{CajaRepository, CajaStore};
pub use devolucion_repository::{DevolucionRepository, DevolucionStore};
pub use movimiento_repository::{MovimientoRepository, MovimientoStore};
pub use usuario_repository::{RolRepository, RolStore, UsuarioRepository, UsuarioStore};
pub use venta_repository::{VentaRepository, VentaStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use auditoria_repository::MockAuditoriaRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use barril_repository::MockBarrilRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use bodega_repository::MockBodegaRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use caja_repository::MockCajaRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use devolucion_repository::MockDevolucionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use movimiento_repository::MockMovimientoRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use usuario_repository::{MockRolRepository, MockUsuarioRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use venta_repository::MockVentaRepository;
