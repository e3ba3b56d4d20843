//! Dashboard: loads the window's rows and aggregates them.

use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use std::sync::Arc;

use crate::domain::dashboard::{construir, validar_dias, ventana, DatosDashboard};
use crate::domain::{Actor, FiltroBarriles, ResumenDashboard};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[async_trait]
pub trait DashboardService: Send + Sync {
    /// Summary of the last `dias` business days (default 7)
    async fn resumen(&self, actor: &Actor, dias: Option<u32>) -> AppResult<ResumenDashboard>;
}

pub struct DashboardManager<U: UnitOfWork> {
    uow: Arc<U>,
    offset: FixedOffset,
}

impl<U: UnitOfWork> DashboardManager<U> {
    pub fn new(uow: Arc<U>, offset: FixedOffset) -> Self {
        Self { uow, offset }
    }
}

#[async_trait]
impl<U: UnitOfWork> DashboardService for DashboardManager<U> {
    async fn resumen(&self, actor: &Actor, dias: Option<u32>) -> AppResult<ResumenDashboard> {
        let dias = validar_dias(dias)?;
        let ahora = Utc::now();
        let (desde, hasta) = ventana(ahora, self.offset, dias);

        let (ventas_repo, devoluciones_repo, barriles_repo, cajas_repo) = (
            self.uow.ventas(),
            self.uow.devoluciones(),
            self.uow.barriles(),
            self.uow.cajas(),
        );
        let (ventas, devoluciones, barriles, caja_abierta) = tokio::try_join!(
            ventas_repo.list_between(desde, hasta),
            devoluciones_repo.list_between(desde, hasta),
            barriles_repo.list(FiltroBarriles::default()),
            cajas_repo.find_abierta(),
        )?;
        tracing::debug!(
            "Dashboard over {} days: {} sales, {} returns",
            dias,
            ventas.len(),
            devoluciones.len()
        );

        Ok(construir(
            ahora,
            self.offset,
            dias,
            DatosDashboard {
                ventas: &ventas,
                devoluciones: &devoluciones,
                barriles: &barriles,
                caja_abierta: caja_abierta.map(|c| c.visible_para(actor.id, actor.is_admin())),
            },
        ))
    }
}
