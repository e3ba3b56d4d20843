//! Service Container - Builds every application service over one unit of work.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::{
    AuditoriaManager, AuditoriaService, AuthService, Authenticator, BarrilManager, BarrilService,
    BodegaManager, BodegaService, CajaManager, CajaService, DashboardManager, DashboardService,
    DevolucionManager, DevolucionService, MovimientoManager, MovimientoService, RolManager,
    RolService, UsuarioManager, UsuarioService, VentaManager, VentaService,
};
use crate::config::Config;
use crate::infra::{Persistence, UnitOfWork};

/// Every service behind its trait object
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<dyn AuthService>,
    pub usuarios: Arc<dyn UsuarioService>,
    pub roles: Arc<dyn RolService>,
    pub bodegas: Arc<dyn BodegaService>,
    pub barriles: Arc<dyn BarrilService>,
    pub movimientos: Arc<dyn MovimientoService>,
    pub cajas: Arc<dyn CajaService>,
    pub ventas: Arc<dyn VentaService>,
    pub devoluciones: Arc<dyn DevolucionService>,
    pub dashboard: Arc<dyn DashboardService>,
    pub auditoria: Arc<dyn AuditoriaService>,
}

impl Services {
    /// Wire the services over any unit of work.
    pub fn new<U: UnitOfWork + 'static>(uow: Arc<U>, config: Config) -> Self {
        let offset = config.business_offset();
        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            usuarios: Arc::new(UsuarioManager::new(uow.clone(), config)),
            roles: Arc::new(RolManager::new(uow.clone())),
            bodegas: Arc::new(BodegaManager::new(uow.clone())),
            barriles: Arc::new(BarrilManager::new(uow.clone())),
            movimientos: Arc::new(MovimientoManager::new(uow.clone())),
            cajas: Arc::new(CajaManager::new(uow.clone(), offset)),
            ventas: Arc::new(VentaManager::new(uow.clone())),
            devoluciones: Arc::new(DevolucionManager::new(uow.clone())),
            dashboard: Arc::new(DashboardManager::new(uow.clone(), offset)),
            auditoria: Arc::new(AuditoriaManager::new(uow)),
        }
    }

    /// Wire the services over the Postgres-backed unit of work.
    pub fn from_connection(db: DatabaseConnection, config: Config) -> Self {
        Self::new(Arc::new(Persistence::new(db)), config)
    }
}
