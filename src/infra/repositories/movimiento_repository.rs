//! Movement log repository.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use super::base::{fetch_page, insert_movimiento};
use super::entities::movimiento;
use crate::domain::{FiltroMovimientos, Movimiento, NuevoMovimiento};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Movement repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait MovimientoRepository: Send + Sync {
    /// Page of movements, newest first
    async fn list(
        &self,
        filtro: FiltroMovimientos,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<Movimiento>, u64)>;

    /// Latest movements of one user
    async fn list_by_usuario(&self, usuario_id: i32, limit: u64) -> AppResult<Vec<Movimiento>>;

    /// Insert a log entry without touching the barrel
    async fn create(&self, nuevo: NuevoMovimiento) -> AppResult<Movimiento>;
}

/// Concrete implementation of MovimientoRepository
pub struct MovimientoStore {
    db: DatabaseConnection,
}

impl MovimientoStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MovimientoRepository for MovimientoStore {
    async fn list(
        &self,
        filtro: FiltroMovimientos,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<Movimiento>, u64)> {
        let mut query = movimiento::Entity::find()
            .order_by_desc(movimiento::Column::Fecha)
            .order_by_desc(movimiento::Column::Id);
        if let Some(barril_id) = filtro.barril_id {
            query = query.filter(movimiento::Column::BarrilId.eq(barril_id));
        }
        if let Some(tipo) = filtro.tipo {
            query = query.filter(movimiento::Column::Tipo.eq(tipo.as_str()));
        }
        if let Some(usuario_id) = filtro.usuario_id {
            query = query.filter(movimiento::Column::UsuarioId.eq(usuario_id));
        }

        let (models, total) = fetch_page(query, &self.db, &pagina).await?;
        let data = models
            .into_iter()
            .map(Movimiento::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((data, total))
    }

    async fn list_by_usuario(&self, usuario_id: i32, limit: u64) -> AppResult<Vec<Movimiento>> {
        movimiento::Entity::find()
            .filter(movimiento::Column::UsuarioId.eq(usuario_id))
            .order_by_desc(movimiento::Column::Fecha)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Movimiento::try_from)
            .collect()
    }

    async fn create(&self, nuevo: NuevoMovimiento) -> AppResult<Movimiento> {
        let model = insert_movimiento(&self.db, nuevo).await?;
        Movimiento::try_from(model)
    }
}
