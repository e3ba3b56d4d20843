//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories so services depend on a single
//! handle. Stores open their own transactions for multi-row writes; the
//! unit of work only hands out the repositories.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    AuditoriaRepository, AuditoriaStore, BarrilRepository, BarrilStore, BodegaRepository,
    BodegaStore, CajaRepository, CajaStore, DevolucionRepository, DevolucionStore,
    MovimientoRepository, MovimientoStore, RolRepository, RolStore, UsuarioRepository,
    UsuarioStore, VentaRepository, VentaStore,
};

/// Unit of Work trait for dependency injection.
///
/// Tests provide their own implementation backed by repository mocks.
pub trait UnitOfWork: Send + Sync {
    fn usuarios(&self) -> Arc<dyn UsuarioRepository>;
    fn roles(&self) -> Arc<dyn RolRepository>;
    fn bodegas(&self) -> Arc<dyn BodegaRepository>;
    fn barriles(&self) -> Arc<dyn BarrilRepository>;
    fn movimientos(&self) -> Arc<dyn MovimientoRepository>;
    fn cajas(&self) -> Arc<dyn CajaRepository>;
    fn ventas(&self) -> Arc<dyn VentaRepository>;
    fn devoluciones(&self) -> Arc<dyn DevolucionRepository>;
    fn auditoria(&self) -> Arc<dyn AuditoriaRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    usuarios: Arc<UsuarioStore>,
    roles: Arc<RolStore>,
    bodegas: Arc<BodegaStore>,
    barriles: Arc<BarrilStore>,
    movimientos: Arc<MovimientoStore>,
    cajas: Arc<CajaStore>,
    ventas: Arc<VentaStore>,
    devoluciones: Arc<DevolucionStore>,
    auditoria: Arc<AuditoriaStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            usuarios: Arc::new(UsuarioStore::new(db.clone())),
            roles: Arc::new(RolStore::new(db.clone())),
            bodegas: Arc::new(BodegaStore::new(db.clone())),
            barriles: Arc::new(BarrilStore::new(db.clone())),
            movimientos: Arc::new(MovimientoStore::new(db.clone())),
            cajas: Arc::new(CajaStore::new(db.clone())),
            ventas: Arc::new(VentaStore::new(db.clone())),
            devoluciones: Arc::new(DevolucionStore::new(db.clone())),
            auditoria: Arc::new(AuditoriaStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn usuarios(&self) -> Arc<dyn UsuarioRepository> {
        self.usuarios.clone()
    }

    fn roles(&self) -> Arc<dyn RolRepository> {
        self.roles.clone()
    }

    fn bodegas(&self) -> Arc<dyn BodegaRepository> {
        self.bodegas.clone()
    }

    fn barriles(&self) -> Arc<dyn BarrilRepository> {
        self.barriles.clone()
    }

    fn movimientos(&self) -> Arc<dyn MovimientoRepository> {
        self.movimientos.clone()
    }

    fn cajas(&self) -> Arc<dyn CajaRepository> {
        self.cajas.clone()
    }

    fn ventas(&self) -> Arc<dyn VentaRepository> {
        self.ventas.clone()
    }

    fn devoluciones(&self) -> Arc<dyn DevolucionRepository> {
        self.devoluciones.clone()
    }

    fn auditoria(&self) -> Arc<dyn AuditoriaRepository> {
        self.auditoria.clone()
    }
}
