//! Staff account administration.
//!
//! Every mutation leaves an `auditoria` row naming the acting user.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, ACTIVITY_LIMIT};
use crate::domain::auditoria::acciones;
use crate::domain::{
    Actor, Caja, CambiosUsuario, IntentoLogin, Movimiento, NuevaAuditoria, NuevoUsuario, Password,
    Rut, Usuario, UsuarioResponse, Venta,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

const ENTIDAD: &str = "usuarios";

/// Data for a new account, as received
#[derive(Debug, Clone)]
pub struct DatosUsuario {
    pub rut: String,
    pub nombre: String,
    pub email: String,
    pub password: String,
    pub rol_id: i32,
}

/// Recent activity of one account
#[derive(Debug, Serialize, ToSchema)]
pub struct ActividadUsuario {
    pub usuario: UsuarioResponse,
    pub ventas: Vec<Venta>,
    pub movimientos: Vec<Movimiento>,
    pub cajas: Vec<Caja>,
    pub logins: Vec<IntentoLogin>,
}

/// Account service trait for dependency injection.
///
/// Admin-only operations are gated by the handlers; operations open to
/// "self or admin" check the actor here.
#[async_trait]
pub trait UsuarioService: Send + Sync {
    async fn list(&self) -> AppResult<Vec<Usuario>>;

    async fn get(&self, actor: &Actor, id: i32) -> AppResult<Usuario>;

    async fn create(&self, actor: &Actor, datos: DatosUsuario) -> AppResult<Usuario>;

    async fn update(&self, actor: &Actor, id: i32, cambios: CambiosUsuario) -> AppResult<Usuario>;

    /// Activate or deactivate; nobody deactivates themselves
    async fn set_activo(&self, actor: &Actor, id: i32, activo: bool) -> AppResult<Usuario>;

    async fn cambiar_password(&self, actor: &Actor, id: i32, password: String) -> AppResult<()>;

    async fn actividad(&self, actor: &Actor, id: i32) -> AppResult<ActividadUsuario>;
}

/// Concrete implementation of UsuarioService using Unit of Work.
pub struct UsuarioManager<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> UsuarioManager<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }

    async fn existente(&self, id: i32) -> AppResult<Usuario> {
        self.uow.usuarios().find_by_id(id).await?.ok_or_not_found("Usuario")
    }

    async fn validar_rol(&self, rol_id: i32) -> AppResult<()> {
        if self.uow.roles().find_by_id(rol_id).await?.is_none() {
            return Err(AppError::validation(format!("El rol {} no existe", rol_id)));
        }
        Ok(())
    }

    async fn auditar(&self, nueva: NuevaAuditoria) -> AppResult<()> {
        self.uow.auditoria().registrar(nueva).await
    }
}

fn validar_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    let valido = email
        .split_once('@')
        .is_some_and(|(local, dominio)| !local.is_empty() && dominio.contains('.'));
    if !valido {
        return Err(AppError::validation("Email inválido"));
    }
    Ok(email)
}

fn validar_nombre(nombre: &str) -> AppResult<String> {
    let nombre = nombre.trim();
    if nombre.is_empty() {
        return Err(AppError::validation("El nombre es obligatorio"));
    }
    Ok(nombre.to_string())
}

#[async_trait]
impl<U: UnitOfWork> UsuarioService for UsuarioManager<U> {
    async fn list(&self) -> AppResult<Vec<Usuario>> {
        self.uow.usuarios().list().await
    }

    async fn get(&self, actor: &Actor, id: i32) -> AppResult<Usuario> {
        if !actor.puede_actuar_sobre(id) {
            return Err(AppError::Forbidden);
        }
        self.existente(id).await
    }

    async fn create(&self, actor: &Actor, datos: DatosUsuario) -> AppResult<Usuario> {
        let rut = Rut::parse(&datos.rut)?;
        let nombre = validar_nombre(&datos.nombre)?;
        let email = validar_email(&datos.email)?;
        self.validar_rol(datos.rol_id).await?;
        let password_hash = Password::new(&datos.password, self.config.bcrypt_cost)?.into_string();

        let usuario = self
            .uow
            .usuarios()
            .create(NuevoUsuario {
                rut,
                nombre,
                email,
                password_hash,
                rol_id: datos.rol_id,
            })
            .await?;

        self.auditar(
            NuevaAuditoria::new(actor.id, acciones::CREAR, ENTIDAD, usuario.id).with_detalle(json!({
                "rut": usuario.rut,
                "email": usuario.email,
                "rol": usuario.rol,
            })),
        )
        .await?;

        tracing::info!("User {} created by {}", usuario.id, actor.id);
        Ok(usuario)
    }

    async fn update(&self, actor: &Actor, id: i32, cambios: CambiosUsuario) -> AppResult<Usuario> {
        if cambios.is_empty() {
            return Err(AppError::validation("No hay cambios que aplicar"));
        }

        let cambios = CambiosUsuario {
            nombre: cambios.nombre.as_deref().map(validar_nombre).transpose()?,
            email: cambios.email.as_deref().map(validar_email).transpose()?,
            rol_id: cambios.rol_id,
        };
        if let Some(rol_id) = cambios.rol_id {
            self.validar_rol(rol_id).await?;
        }

        let detalle = json!({
            "nombre": cambios.nombre,
            "email": cambios.email,
            "rol_id": cambios.rol_id,
        });
        let usuario = self.uow.usuarios().update(id, cambios).await?;

        self.auditar(NuevaAuditoria::new(actor.id, acciones::ACTUALIZAR, ENTIDAD, id).with_detalle(detalle))
            .await?;
        Ok(usuario)
    }

    async fn set_activo(&self, actor: &Actor, id: i32, activo: bool) -> AppResult<Usuario> {
        if !activo && actor.id == id {
            return Err(AppError::validation("No puede desactivar su propia cuenta"));
        }

        let usuario = self.uow.usuarios().set_activo(id, activo).await?;
        let accion = if activo { acciones::ACTIVAR } else { acciones::DESACTIVAR };
        self.auditar(NuevaAuditoria::new(actor.id, accion, ENTIDAD, id)).await?;

        tracing::info!("User {} set activo={} by {}", id, activo, actor.id);
        Ok(usuario)
    }

    async fn cambiar_password(&self, actor: &Actor, id: i32, password: String) -> AppResult<()> {
        if !actor.puede_actuar_sobre(id) {
            return Err(AppError::Forbidden);
        }
        self.existente(id).await?;

        let hash = Password::new(&password, self.config.bcrypt_cost)?.into_string();
        self.uow.usuarios().set_password(id, hash).await?;
        self.auditar(NuevaAuditoria::new(actor.id, acciones::CAMBIAR_PASSWORD, ENTIDAD, id))
            .await
    }

    async fn actividad(&self, actor: &Actor, id: i32) -> AppResult<ActividadUsuario> {
        if !actor.puede_actuar_sobre(id) {
            return Err(AppError::Forbidden);
        }
        let usuario = self.existente(id).await?;

        let (ventas_repo, movimientos_repo, cajas_repo, auditoria_repo) = (
            self.uow.ventas(),
            self.uow.movimientos(),
            self.uow.cajas(),
            self.uow.auditoria(),
        );
        let (ventas, movimientos, cajas, logins) = tokio::try_join!(
            ventas_repo.list_by_usuario(id, ACTIVITY_LIMIT),
            movimientos_repo.list_by_usuario(id, ACTIVITY_LIMIT),
            cajas_repo.list_by_usuario(id, ACTIVITY_LIMIT),
            auditoria_repo.list_login_by_usuario(id, ACTIVITY_LIMIT),
        )?;

        Ok(ActividadUsuario {
            usuario: UsuarioResponse::from(usuario),
            ventas,
            movimientos,
            cajas,
            logins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_trimmed_and_lowercased() {
        assert_eq!(validar_email("  Camila@BrewMaster.cl ").unwrap(), "camila@brewmaster.cl");
        assert!(validar_email("sin-arroba").is_err());
        assert!(validar_email("@dominio.cl").is_err());
    }

    #[test]
    fn test_blank_name_is_rejected() {
        assert!(validar_nombre("   ").is_err());
        assert_eq!(validar_nombre(" Pedro ").unwrap(), "Pedro");
    }
}
