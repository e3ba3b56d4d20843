//! Cash-register workflow.
//!
//! At most one register is open at a time. The database enforces it with
//! `ux_caja_abierta`; when an insert or reopen loses that race the store
//! reports `RegisterAlreadyOpen` and the service re-reads the winner,
//! answering as if it had been open all along.

use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use std::sync::Arc;

use crate::domain::caja::{
    plan_para_abierta, planificar_apertura, resumir, validar_monto, ventana_del_dia,
};
use crate::domain::{
    Actor, AperturaCaja, Barril, Caja, CajaBarril, CierreCaja, PlanApertura, ResultadoApertura,
    ResumenCaja,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

#[async_trait]
pub trait CajaService: Send + Sync {
    /// Open (or reuse, or reopen) the register for the actor
    async fn abrir(&self, actor: &Actor, monto_inicial: Option<i64>) -> AppResult<AperturaCaja>;

    /// Close the open register; owner or admin
    async fn cerrar(&self, actor: &Actor, monto_final: Option<i64>) -> AppResult<CierreCaja>;

    /// The open register as the actor may see it
    async fn actual(&self, actor: &Actor) -> AppResult<Option<Caja>>;

    async fn list(&self, actor: &Actor, pagina: PaginationParams) -> AppResult<(Vec<Caja>, u64)>;

    async fn get(&self, actor: &Actor, id: i32) -> AppResult<Caja>;

    async fn resumen(&self, actor: &Actor, id: i32) -> AppResult<ResumenCaja>;

    async fn barriles(&self, id: i32) -> AppResult<Vec<CajaBarril>>;

    async fn asignar_barril(&self, actor: &Actor, caja_id: i32, barril_id: i32) -> AppResult<CajaBarril>;

    async fn liberar_barril(&self, actor: &Actor, caja_id: i32, barril_id: i32) -> AppResult<Barril>;
}

pub struct CajaManager<U: UnitOfWork> {
    uow: Arc<U>,
    /// Defines the local business day
    offset: FixedOffset,
}

impl<U: UnitOfWork> CajaManager<U> {
    pub fn new(uow: Arc<U>, offset: FixedOffset) -> Self {
        Self { uow, offset }
    }

    async fn ejecutar(&self, plan: PlanApertura, actor: &Actor) -> AppResult<AperturaCaja> {
        let cajas = self.uow.cajas();
        let (caja, resultado) = match plan {
            PlanApertura::Propia { caja, nuevo_monto: Some(monto) } => {
                (cajas.update_monto_inicial(caja.id, monto).await?, ResultadoApertura::Actualizada)
            }
            PlanApertura::Propia { caja, nuevo_monto: None } => (caja, ResultadoApertura::Existente),
            PlanApertura::Ajena(caja) => {
                tracing::warn!(
                    "User {} tried to open register {} owned by {}",
                    actor.id,
                    caja.id,
                    caja.usuario_id
                );
                (caja.masked(), ResultadoApertura::Ajena)
            }
            PlanApertura::Reabrir { caja_id, nuevo_monto } => {
                (cajas.reabrir(caja_id, nuevo_monto).await?, ResultadoApertura::Reabierta)
            }
            PlanApertura::Crear { monto_inicial } => {
                (cajas.create(actor.id, monto_inicial).await?, ResultadoApertura::Creada)
            }
        };

        tracing::info!("Register {} open request by {}: {:?}", caja.id, actor.id, resultado);
        Ok(AperturaCaja { caja, resultado })
    }

    async fn resumen_de(&self, caja: &Caja) -> AppResult<ResumenCaja> {
        let (ventas_repo, devoluciones_repo) = (self.uow.ventas(), self.uow.devoluciones());
        let (ventas, devoluciones) = tokio::try_join!(
            ventas_repo.list_by_caja(caja.id),
            devoluciones_repo.list_by_caja(caja.id),
        )?;
        Ok(resumir(caja, &ventas, &devoluciones))
    }

    async fn existente(&self, id: i32) -> AppResult<Caja> {
        self.uow.cajas().find_by_id(id).await?.ok_or_not_found("Caja")
    }

    /// Load a register the actor operates on: owner or admin.
    async fn operable(&self, actor: &Actor, id: i32) -> AppResult<Caja> {
        let caja = self.existente(id).await?;
        if !actor.puede_actuar_sobre(caja.usuario_id) {
            return Err(AppError::Forbidden);
        }
        Ok(caja)
    }
}

#[async_trait]
impl<U: UnitOfWork> CajaService for CajaManager<U> {
    async fn abrir(&self, actor: &Actor, monto_inicial: Option<i64>) -> AppResult<AperturaCaja> {
        validar_monto(monto_inicial)?;
        let cajas = self.uow.cajas();

        let abierta = cajas.find_abierta().await?;
        let del_dia = match abierta {
            Some(_) => None,
            None => {
                let (desde, hasta) = ventana_del_dia(Utc::now(), self.offset);
                cajas.find_del_dia(actor.id, desde, hasta).await?
            }
        };

        let plan = planificar_apertura(abierta, del_dia, actor.id, monto_inicial)?;
        match self.ejecutar(plan, actor).await {
            Err(AppError::RegisterAlreadyOpen) => {
                tracing::warn!("Register open by {} lost the race, re-reading open register", actor.id);
                let abierta = cajas
                    .find_abierta()
                    .await?
                    .ok_or_else(|| AppError::conflict("La caja cambió de estado, intente nuevamente"))?;
                self.ejecutar(plan_para_abierta(abierta, actor.id, monto_inicial), actor)
                    .await
            }
            other => other,
        }
    }

    async fn cerrar(&self, actor: &Actor, monto_final: Option<i64>) -> AppResult<CierreCaja> {
        let caja = self
            .uow
            .cajas()
            .find_abierta()
            .await?
            .ok_or_not_found("Caja abierta")?;
        if !actor.puede_actuar_sobre(caja.usuario_id) {
            tracing::warn!("User {} tried to close register {} of {}", actor.id, caja.id, caja.usuario_id);
            return Err(AppError::Forbidden);
        }

        validar_monto(monto_final)?;
        let cierre = self.uow.cajas().cerrar(caja.id, monto_final, actor.id).await?;

        tracing::info!(
            "Register {} closed by {} with {:?} (expected {})",
            cierre.caja.id,
            actor.id,
            cierre.caja.monto_final,
            cierre.resumen.monto_esperado
        );
        Ok(cierre)
    }

    async fn actual(&self, actor: &Actor) -> AppResult<Option<Caja>> {
        Ok(self
            .uow
            .cajas()
            .find_abierta()
            .await?
            .map(|caja| caja.visible_para(actor.id, actor.is_admin())))
    }

    async fn list(&self, actor: &Actor, pagina: PaginationParams) -> AppResult<(Vec<Caja>, u64)> {
        let (cajas, total) = self.uow.cajas().list(pagina).await?;
        let visibles = cajas
            .into_iter()
            .map(|caja| caja.visible_para(actor.id, actor.is_admin()))
            .collect();
        Ok((visibles, total))
    }

    async fn get(&self, actor: &Actor, id: i32) -> AppResult<Caja> {
        Ok(self.existente(id).await?.visible_para(actor.id, actor.is_admin()))
    }

    async fn resumen(&self, actor: &Actor, id: i32) -> AppResult<ResumenCaja> {
        let caja = self.operable(actor, id).await?;
        self.resumen_de(&caja).await
    }

    async fn barriles(&self, id: i32) -> AppResult<Vec<CajaBarril>> {
        self.existente(id).await?;
        self.uow.cajas().barriles(id).await
    }

    async fn asignar_barril(&self, actor: &Actor, caja_id: i32, barril_id: i32) -> AppResult<CajaBarril> {
        self.operable(actor, caja_id).await?;
        self.uow.cajas().asignar_barril(caja_id, barril_id, actor.id).await
    }

    async fn liberar_barril(&self, actor: &Actor, caja_id: i32, barril_id: i32) -> AppResult<Barril> {
        self.operable(actor, caja_id).await?;
        self.uow.cajas().liberar_barril(caja_id, barril_id, actor.id).await
    }
}
