//! Returns against completed sales.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::devolucion::{calcular_devolucion, unidades_devueltas};
use crate::domain::{Actor, Devolucion, LineaDevolucion};
use crate::errors::{AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Return as requested
#[derive(Debug, Clone)]
pub struct DatosDevolucion {
    pub venta_id: i32,
    pub motivo: String,
    pub reintegrar_volumen: bool,
    pub lineas: Vec<LineaDevolucion>,
}

#[async_trait]
pub trait DevolucionService: Send + Sync {
    async fn create(&self, actor: &Actor, datos: DatosDevolucion) -> AppResult<Devolucion>;

    async fn list(&self, venta_id: Option<i32>) -> AppResult<Vec<Devolucion>>;

    async fn get(&self, id: i32) -> AppResult<Devolucion>;
}

pub struct DevolucionManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> DevolucionManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> DevolucionService for DevolucionManager<U> {
    async fn create(&self, actor: &Actor, datos: DatosDevolucion) -> AppResult<Devolucion> {
        let venta = self
            .uow
            .ventas()
            .find_by_id(datos.venta_id)
            .await?
            .ok_or_not_found("Venta")?;
        let previas = self.uow.devoluciones().list(Some(venta.id)).await?;

        let nueva = calcular_devolucion(
            &venta,
            &unidades_devueltas(&previas),
            &datos.lineas,
            actor.id,
            datos.motivo,
            datos.reintegrar_volumen,
        )?;

        let devolucion = self.uow.devoluciones().create(nueva).await?;
        tracing::info!(
            "Return {} of {} on sale {} by {}",
            devolucion.id,
            devolucion.monto,
            venta.id,
            actor.id
        );
        Ok(devolucion)
    }

    async fn list(&self, venta_id: Option<i32>) -> AppResult<Vec<Devolucion>> {
        self.uow.devoluciones().list(venta_id).await
    }

    async fn get(&self, id: i32) -> AppResult<Devolucion> {
        self.uow.devoluciones().find_by_id(id).await?.ok_or_not_found("Devolución")
    }
}
