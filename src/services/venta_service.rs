//! Sales on the open register.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::venta::calcular_totales;
use crate::domain::{Actor, Descuento, FiltroVentas, LineaVenta, MetodoPago, NuevaVenta, Venta};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

/// Sale as requested by the cashier
#[derive(Debug, Clone)]
pub struct DatosVenta {
    pub metodo_pago: MetodoPago,
    /// Discount amount (CLP)
    pub descuento: Option<i64>,
    /// Discount percentage (0-100)
    pub descuento_porcentaje: Option<u8>,
    pub lineas: Vec<LineaVenta>,
}

#[async_trait]
pub trait VentaService: Send + Sync {
    /// Register a sale on the open register
    async fn create(&self, actor: &Actor, datos: DatosVenta) -> AppResult<Venta>;

    async fn list(&self, filtro: FiltroVentas, pagina: PaginationParams) -> AppResult<(Vec<Venta>, u64)>;

    async fn get(&self, id: i32) -> AppResult<Venta>;

    /// Cancel a sale; seller or admin
    async fn anular(&self, actor: &Actor, id: i32) -> AppResult<Venta>;
}

pub struct VentaManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> VentaManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> VentaService for VentaManager<U> {
    async fn create(&self, actor: &Actor, datos: DatosVenta) -> AppResult<Venta> {
        let caja = self
            .uow
            .cajas()
            .find_abierta()
            .await?
            .ok_or_else(|| AppError::validation("No hay una caja abierta"))?;
        if !actor.puede_actuar_sobre(caja.usuario_id) {
            tracing::warn!("User {} tried to sell on register {} of {}", actor.id, caja.id, caja.usuario_id);
            return Err(AppError::Forbidden);
        }

        let descuento = Descuento::from_request(datos.descuento, datos.descuento_porcentaje)?;
        let totales = calcular_totales(&datos.lineas, descuento)?;

        let venta = self
            .uow
            .ventas()
            .create(NuevaVenta {
                caja_id: caja.id,
                usuario_id: actor.id,
                metodo_pago: datos.metodo_pago,
                totales,
                lineas: datos.lineas,
            })
            .await?;

        tracing::info!("Sale {} for {} on register {}", venta.id, venta.total, caja.id);
        Ok(venta)
    }

    async fn list(&self, filtro: FiltroVentas, pagina: PaginationParams) -> AppResult<(Vec<Venta>, u64)> {
        if let (Some(desde), Some(hasta)) = (filtro.desde, filtro.hasta) {
            if desde > hasta {
                return Err(AppError::validation("desde no puede ser posterior a hasta"));
            }
        }
        self.uow.ventas().list(filtro, pagina).await
    }

    async fn get(&self, id: i32) -> AppResult<Venta> {
        self.uow.ventas().find_by_id(id).await?.ok_or_not_found("Venta")
    }

    async fn anular(&self, actor: &Actor, id: i32) -> AppResult<Venta> {
        let venta = self.get(id).await?;
        if !actor.puede_actuar_sobre(venta.usuario_id) {
            return Err(AppError::Forbidden);
        }

        let venta = self.uow.ventas().anular(id, actor.id).await?;
        tracing::info!("Sale {} cancelled by {}", id, actor.id);
        Ok(venta)
    }
}
