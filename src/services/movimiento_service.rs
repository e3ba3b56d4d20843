//! Movement log queries and manual entries.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Actor, FiltroMovimientos, Movimiento, NuevoMovimiento, TipoMovimiento};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

#[async_trait]
pub trait MovimientoService: Send + Sync {
    async fn list(
        &self,
        filtro: FiltroMovimientos,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<Movimiento>, u64)>;

    /// Log an informational entry; the barrel itself is not touched
    async fn registrar(
        &self,
        actor: &Actor,
        barril_id: i32,
        tipo: TipoMovimiento,
        detalle: Option<String>,
    ) -> AppResult<Movimiento>;
}

pub struct MovimientoManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> MovimientoManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> MovimientoService for MovimientoManager<U> {
    async fn list(
        &self,
        filtro: FiltroMovimientos,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<Movimiento>, u64)> {
        self.uow.movimientos().list(filtro, pagina).await
    }

    async fn registrar(
        &self,
        actor: &Actor,
        barril_id: i32,
        tipo: TipoMovimiento,
        detalle: Option<String>,
    ) -> AppResult<Movimiento> {
        tipo.validar_manual()?;
        if self.uow.barriles().find_by_id(barril_id).await?.is_none() {
            return Err(AppError::validation(format!("El barril {} no existe", barril_id)));
        }

        let mut nuevo = NuevoMovimiento::new(barril_id, tipo, Some(actor.id));
        if let Some(detalle) = detalle.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) {
            nuevo = nuevo.with_detalle(detalle);
        }
        self.uow.movimientos().create(nuevo).await
    }
}
