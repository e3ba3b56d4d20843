//! Role catalogue.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::auditoria::acciones;
use crate::domain::{Actor, NuevaAuditoria, Rol};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait RolService: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Rol>>;

    /// Create a role; names are stored uppercase
    async fn create(&self, actor: &Actor, nombre: String, descripcion: Option<String>) -> AppResult<Rol>;
}

pub struct RolManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RolManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> RolService for RolManager<U> {
    async fn list(&self) -> AppResult<Vec<Rol>> {
        self.uow.roles().list().await
    }

    async fn create(&self, actor: &Actor, nombre: String, descripcion: Option<String>) -> AppResult<Rol> {
        let nombre = nombre.trim().to_uppercase();
        if nombre.is_empty() {
            return Err(AppError::validation("El nombre del rol es obligatorio"));
        }
        let descripcion = descripcion.map(|d| d.trim().to_string()).filter(|d| !d.is_empty());

        let rol = self.uow.roles().create(nombre, descripcion).await?;
        self.uow
            .auditoria()
            .registrar(NuevaAuditoria::new(actor.id, acciones::CREAR, "roles", rol.id))
            .await?;
        Ok(rol)
    }
}
