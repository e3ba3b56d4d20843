//! Audit trail repository.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

use super::base::fetch_page;
use super::entities::{auditoria, auditoria_login};
use crate::domain::{FiltroAuditoria, IntentoLogin, NuevaAuditoria, NuevoIntentoLogin, RegistroAuditoria};
use crate::errors::AppResult;
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Audit repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuditoriaRepository: Send + Sync {
    /// Record an administrative mutation
    async fn registrar(&self, nueva: NuevaAuditoria) -> AppResult<()>;

    /// Record a login attempt
    async fn registrar_login(&self, intento: NuevoIntentoLogin) -> AppResult<()>;

    async fn list(
        &self,
        filtro: FiltroAuditoria,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<RegistroAuditoria>, u64)>;

    async fn list_login(
        &self,
        usuario_id: Option<i32>,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<IntentoLogin>, u64)>;

    /// Latest login attempts of one account
    async fn list_login_by_usuario(&self, usuario_id: i32, limit: u64) -> AppResult<Vec<IntentoLogin>>;
}

/// Concrete implementation of AuditoriaRepository
pub struct AuditoriaStore {
    db: DatabaseConnection,
}

impl AuditoriaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditoriaRepository for AuditoriaStore {
    async fn registrar(&self, nueva: NuevaAuditoria) -> AppResult<()> {
        auditoria::ActiveModel {
            usuario_id: Set(nueva.usuario_id),
            accion: Set(nueva.accion),
            entidad: Set(nueva.entidad),
            entidad_id: Set(nueva.entidad_id),
            detalle: Set(nueva.detalle),
            fecha: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    async fn registrar_login(&self, intento: NuevoIntentoLogin) -> AppResult<()> {
        auditoria_login::ActiveModel {
            usuario_id: Set(intento.usuario_id),
            identificador: Set(intento.identificador),
            exito: Set(intento.exito),
            ip: Set(intento.ip),
            fecha: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        Ok(())
    }

    async fn list(
        &self,
        filtro: FiltroAuditoria,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<RegistroAuditoria>, u64)> {
        let mut query = auditoria::Entity::find().order_by_desc(auditoria::Column::Fecha);
        if let Some(entidad) = filtro.entidad {
            query = query.filter(auditoria::Column::Entidad.eq(entidad));
        }
        if let Some(usuario_id) = filtro.usuario_id {
            query = query.filter(auditoria::Column::UsuarioId.eq(usuario_id));
        }
        let (models, total) = fetch_page(query, &self.db, &pagina).await?;
        Ok((models.into_iter().map(RegistroAuditoria::from).collect(), total))
    }

    async fn list_login(
        &self,
        usuario_id: Option<i32>,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<IntentoLogin>, u64)> {
        let mut query = auditoria_login::Entity::find().order_by_desc(auditoria_login::Column::Fecha);
        if let Some(usuario_id) = usuario_id {
            query = query.filter(auditoria_login::Column::UsuarioId.eq(usuario_id));
        }
        let (models, total) = fetch_page(query, &self.db, &pagina).await?;
        Ok((models.into_iter().map(IntentoLogin::from).collect(), total))
    }

    async fn list_login_by_usuario(&self, usuario_id: i32, limit: u64) -> AppResult<Vec<IntentoLogin>> {
        let models = auditoria_login::Entity::find()
            .filter(auditoria_login::Column::UsuarioId.eq(usuario_id))
            .order_by_desc(auditoria_login::Column::Fecha)
            .limit(limit)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(IntentoLogin::from).collect())
    }
}
