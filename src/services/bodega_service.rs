//! Warehouse management.

use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;

use crate::domain::auditoria::acciones;
use crate::domain::{Actor, Barril, Bodega, DatosBodega, FiltroBarriles, NuevaAuditoria};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

const ENTIDAD: &str = "bodegas";

#[async_trait]
pub trait BodegaService: Send + Sync {
    /// Active warehouses
    async fn list(&self) -> AppResult<Vec<Bodega>>;

    async fn get(&self, id: i32) -> AppResult<Bodega>;

    async fn create(&self, actor: &Actor, datos: DatosBodega) -> AppResult<Bodega>;

    async fn update(&self, actor: &Actor, id: i32, datos: DatosBodega) -> AppResult<Bodega>;

    /// Deactivate an empty warehouse
    async fn deactivate(&self, actor: &Actor, id: i32) -> AppResult<()>;

    /// Active barrels stored in the warehouse
    async fn barriles(&self, id: i32) -> AppResult<Vec<Barril>>;
}

pub struct BodegaManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> BodegaManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

fn normalizar(datos: DatosBodega) -> AppResult<DatosBodega> {
    let nombre = datos.nombre.trim().to_string();
    if nombre.is_empty() {
        return Err(AppError::validation("El nombre de la bodega es obligatorio"));
    }
    if datos.capacidad.is_some_and(|c| c <= 0) {
        return Err(AppError::validation("La capacidad debe ser mayor a 0"));
    }
    Ok(DatosBodega {
        nombre,
        ubicacion: datos.ubicacion.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
        capacidad: datos.capacidad,
    })
}

#[async_trait]
impl<U: UnitOfWork> BodegaService for BodegaManager<U> {
    async fn list(&self) -> AppResult<Vec<Bodega>> {
        self.uow.bodegas().list(false).await
    }

    async fn get(&self, id: i32) -> AppResult<Bodega> {
        self.uow.bodegas().find_by_id(id).await?.ok_or_not_found("Bodega")
    }

    async fn create(&self, actor: &Actor, datos: DatosBodega) -> AppResult<Bodega> {
        let bodega = self.uow.bodegas().create(normalizar(datos)?).await?;
        self.uow
            .auditoria()
            .registrar(
                NuevaAuditoria::new(actor.id, acciones::CREAR, ENTIDAD, bodega.id)
                    .with_detalle(json!({ "nombre": bodega.nombre })),
            )
            .await?;
        Ok(bodega)
    }

    async fn update(&self, actor: &Actor, id: i32, datos: DatosBodega) -> AppResult<Bodega> {
        let datos = normalizar(datos)?;
        let bodega = self.uow.bodegas().update(id, datos).await?;
        self.uow
            .auditoria()
            .registrar(NuevaAuditoria::new(actor.id, acciones::ACTUALIZAR, ENTIDAD, id))
            .await?;
        Ok(bodega)
    }

    async fn deactivate(&self, actor: &Actor, id: i32) -> AppResult<()> {
        self.get(id).await?;

        let barriles = self.uow.bodegas().count_barriles(id).await?;
        if barriles > 0 {
            tracing::warn!("Refused to deactivate warehouse {} holding {} barrels", id, barriles);
            return Err(AppError::conflict(format!(
                "La bodega tiene {} barriles asignados",
                barriles
            )));
        }

        self.uow.bodegas().deactivate(id).await?;
        self.uow
            .auditoria()
            .registrar(NuevaAuditoria::new(actor.id, acciones::DESACTIVAR, ENTIDAD, id))
            .await
    }

    async fn barriles(&self, id: i32) -> AppResult<Vec<Barril>> {
        self.get(id).await?;
        self.uow
            .barriles()
            .list(FiltroBarriles {
                estado: None,
                bodega_id: Some(id),
            })
            .await
    }
}
