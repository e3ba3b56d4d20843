//! Warehouse repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use super::entities::{barril, bodega};
use crate::domain::{Bodega, DatosBodega};
use crate::errors::{map_unique, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const DUPLICATE_BODEGA: &str = "Ya existe una bodega con ese nombre";

/// Warehouse repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BodegaRepository: Send + Sync {
    /// List warehouses; inactive ones only when asked
    async fn list(&self, incluir_inactivas: bool) -> AppResult<Vec<Bodega>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Bodega>>;

    async fn create(&self, datos: DatosBodega) -> AppResult<Bodega>;

    async fn update(&self, id: i32, datos: DatosBodega) -> AppResult<Bodega>;

    /// Set `activo = false`
    async fn deactivate(&self, id: i32) -> AppResult<()>;

    /// Active barrels currently stored in the warehouse
    async fn count_barriles(&self, id: i32) -> AppResult<u64>;
}

/// Concrete implementation of BodegaRepository
pub struct BodegaStore {
    db: DatabaseConnection,
}

impl BodegaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: i32) -> AppResult<bodega::Model> {
        bodega::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Bodega")
    }
}

#[async_trait]
impl BodegaRepository for BodegaStore {
    async fn list(&self, incluir_inactivas: bool) -> AppResult<Vec<Bodega>> {
        let mut query = bodega::Entity::find().order_by_asc(bodega::Column::Nombre);
        if !incluir_inactivas {
            query = query.filter(bodega::Column::Activo.eq(true));
        }
        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(Bodega::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Bodega>> {
        Ok(bodega::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Bodega::from))
    }

    async fn create(&self, datos: DatosBodega) -> AppResult<Bodega> {
        let model = bodega::ActiveModel {
            nombre: Set(datos.nombre),
            ubicacion: Set(datos.ubicacion),
            capacidad: Set(datos.capacidad),
            activo: Set(true),
            creado_en: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_unique(e, DUPLICATE_BODEGA))?;
        Ok(Bodega::from(model))
    }

    async fn update(&self, id: i32, datos: DatosBodega) -> AppResult<Bodega> {
        let mut active: bodega::ActiveModel = self.load(id).await?.into();
        active.nombre = Set(datos.nombre);
        active.ubicacion = Set(datos.ubicacion);
        active.capacidad = Set(datos.capacidad);
        let model = active
            .update(&self.db)
            .await
            .map_err(|e| map_unique(e, DUPLICATE_BODEGA))?;
        Ok(Bodega::from(model))
    }

    async fn deactivate(&self, id: i32) -> AppResult<()> {
        let mut active: bodega::ActiveModel = self.load(id).await?.into();
        active.activo = Set(false);
        active.update(&self.db).await?;
        Ok(())
    }

    async fn count_barriles(&self, id: i32) -> AppResult<u64> {
        Ok(barril::Entity::find()
            .filter(barril::Column::BodegaId.eq(id))
            .filter(barril::Column::Activo.eq(true))
            .count(&self.db)
            .await?)
    }
}
