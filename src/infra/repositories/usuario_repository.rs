//! Staff account and role repositories.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use super::entities::{rol, usuario};
use crate::domain::{CambiosUsuario, NuevoUsuario, Rol, Usuario};
use crate::errors::{map_unique, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Staff account repository trait for dependency injection.
///
/// Accounts are never deleted; `activo` disables them.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UsuarioRepository: Send + Sync {
    /// Find account by ID (active or not)
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Usuario>>;

    /// Find account by normalised RUT
    async fn find_by_rut(&self, rut: &str) -> AppResult<Option<Usuario>>;

    /// Find account by email (case-insensitive)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Usuario>>;

    /// List all accounts ordered by name
    async fn list(&self) -> AppResult<Vec<Usuario>>;

    /// Insert an account; duplicate RUT or email becomes `Duplicate`
    async fn create(&self, nuevo: NuevoUsuario) -> AppResult<Usuario>;

    /// Apply a partial update
    async fn update(&self, id: i32, cambios: CambiosUsuario) -> AppResult<Usuario>;

    /// Enable or disable an account
    async fn set_activo(&self, id: i32, activo: bool) -> AppResult<Usuario>;

    /// Replace the password hash
    async fn set_password(&self, id: i32, password_hash: String) -> AppResult<()>;
}

/// Concrete implementation of UsuarioRepository
pub struct UsuarioStore {
    db: DatabaseConnection,
}

impl UsuarioStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_one(&self, filter: sea_orm::Condition) -> AppResult<Option<Usuario>> {
        let row = usuario::Entity::find()
            .filter(filter)
            .find_also_related(rol::Entity)
            .one(&self.db)
            .await?;
        Ok(row.map(Usuario::from))
    }

    async fn load(&self, id: i32) -> AppResult<usuario::Model> {
        usuario::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Usuario")
    }

    async fn reload(&self, id: i32) -> AppResult<Usuario> {
        self.find_by_id(id).await?.ok_or_not_found("Usuario")
    }
}

const DUPLICATE_USUARIO: &str = "Ya existe un usuario con ese RUT o email";

#[async_trait]
impl UsuarioRepository for UsuarioStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Usuario>> {
        self.find_one(sea_orm::Condition::all().add(usuario::Column::Id.eq(id)))
            .await
    }

    async fn find_by_rut(&self, rut: &str) -> AppResult<Option<Usuario>> {
        self.find_one(sea_orm::Condition::all().add(usuario::Column::Rut.eq(rut)))
            .await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Usuario>> {
        self.find_one(
            sea_orm::Condition::all().add(usuario::Column::Email.eq(email.trim().to_lowercase())),
        )
        .await
    }

    async fn list(&self) -> AppResult<Vec<Usuario>> {
        let rows = usuario::Entity::find()
            .find_also_related(rol::Entity)
            .order_by_asc(usuario::Column::Nombre)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Usuario::from).collect())
    }

    async fn create(&self, nuevo: NuevoUsuario) -> AppResult<Usuario> {
        let now = Utc::now();
        let model = usuario::ActiveModel {
            rut: Set(nuevo.rut.into_string()),
            nombre: Set(nuevo.nombre),
            email: Set(nuevo.email.trim().to_lowercase()),
            password_hash: Set(nuevo.password_hash),
            rol_id: Set(nuevo.rol_id),
            activo: Set(true),
            creado_en: Set(now),
            actualizado_en: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_unique(e, DUPLICATE_USUARIO))?;

        self.reload(model.id).await
    }

    async fn update(&self, id: i32, cambios: CambiosUsuario) -> AppResult<Usuario> {
        let mut active: usuario::ActiveModel = self.load(id).await?.into();

        if let Some(nombre) = cambios.nombre {
            active.nombre = Set(nombre);
        }
        if let Some(email) = cambios.email {
            active.email = Set(email.trim().to_lowercase());
        }
        if let Some(rol_id) = cambios.rol_id {
            active.rol_id = Set(rol_id);
        }
        active.actualizado_en = Set(Utc::now());

        active
            .update(&self.db)
            .await
            .map_err(|e| map_unique(e, DUPLICATE_USUARIO))?;
        self.reload(id).await
    }

    async fn set_activo(&self, id: i32, activo: bool) -> AppResult<Usuario> {
        let mut active: usuario::ActiveModel = self.load(id).await?.into();
        active.activo = Set(activo);
        active.actualizado_en = Set(Utc::now());
        active.update(&self.db).await?;
        self.reload(id).await
    }

    async fn set_password(&self, id: i32, password_hash: String) -> AppResult<()> {
        let mut active: usuario::ActiveModel = self.load(id).await?.into();
        active.password_hash = Set(password_hash);
        active.actualizado_en = Set(Utc::now());
        active.update(&self.db).await?;
        Ok(())
    }
}

/// Role repository trait
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RolRepository: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Rol>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Rol>>;

    async fn find_by_nombre(&self, nombre: &str) -> AppResult<Option<Rol>>;

    /// Insert a role; duplicate name becomes `Duplicate`
    async fn create(&self, nombre: String, descripcion: Option<String>) -> AppResult<Rol>;
}

/// Concrete implementation of RolRepository
pub struct RolStore {
    db: DatabaseConnection,
}

impl RolStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RolRepository for RolStore {
    async fn list(&self) -> AppResult<Vec<Rol>> {
        let models = rol::Entity::find()
            .order_by_asc(rol::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Rol::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Rol>> {
        Ok(rol::Entity::find_by_id(id).one(&self.db).await?.map(Rol::from))
    }

    async fn find_by_nombre(&self, nombre: &str) -> AppResult<Option<Rol>> {
        Ok(rol::Entity::find()
            .filter(rol::Column::Nombre.eq(nombre))
            .one(&self.db)
            .await?
            .map(Rol::from))
    }

    async fn create(&self, nombre: String, descripcion: Option<String>) -> AppResult<Rol> {
        let model = rol::ActiveModel {
            nombre: Set(nombre),
            descripcion: Set(descripcion),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| map_unique(e, "Ya existe un rol con ese nombre"))?;
        Ok(Rol::from(model))
    }
}
