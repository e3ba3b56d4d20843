//! Audit log queries.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{FiltroAuditoria, IntentoLogin, RegistroAuditoria};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

#[async_trait]
pub trait AuditoriaService: Send + Sync {
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
}

pub struct AuditoriaManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AuditoriaManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuditoriaService for AuditoriaManager<U> {
    async fn list(
        &self,
        filtro: FiltroAuditoria,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<RegistroAuditoria>, u64)> {
        self.uow.auditoria().list(filtro, pagina).await
    }

    async fn list_login(
        &self,
        usuario_id: Option<i32>,
        pagina: PaginationParams,
    ) -> AppResult<(Vec<IntentoLogin>, u64)> {
        self.uow.auditoria().list_login(usuario_id, pagina).await
    }
}
