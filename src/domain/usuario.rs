//! Staff accounts and roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::ROLE_ADMIN;

use super::Rut;

/// Role assigned to staff accounts (`roles` table)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Rol {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "CAJERO")]
    pub nombre: String,
    pub descripcion: Option<String>,
}

impl Rol {
    pub fn is_admin(&self) -> bool {
        self.nombre == ROLE_ADMIN
    }
}

/// Authenticated requester, as seen by the services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub rol: String,
}

impl Actor {
    pub fn new(id: i32, rol: impl Into<String>) -> Self {
        Self { id, rol: rol.into() }
    }

    pub fn is_admin(&self) -> bool {
        self.rol == ROLE_ADMIN
    }

    /// Admins act on anyone, other roles only on themselves.
    pub fn puede_actuar_sobre(&self, usuario_id: i32) -> bool {
        self.is_admin() || self.id == usuario_id
    }
}

/// Staff account entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i32,
    pub rut: String,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub rol_id: i32,
    /// Role name, resolved through `rol_id`
    pub rol: String,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

impl Usuario {
    pub fn is_admin(&self) -> bool {
        self.rol == ROLE_ADMIN
    }
}

/// Data needed to insert a new account
#[derive(Debug, Clone)]
pub struct NuevoUsuario {
    pub rut: Rut,
    pub nombre: String,
    pub email: String,
    pub password_hash: String,
    pub rol_id: i32,
}

/// Partial update of an account
#[derive(Debug, Clone, Default)]
pub struct CambiosUsuario {
    pub nombre: Option<String>,
    pub email: Option<String>,
    pub rol_id: Option<i32>,
}

impl CambiosUsuario {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none() && self.email.is_none() && self.rol_id.is_none()
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsuarioResponse {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "12345678-5")]
    pub rut: String,
    #[schema(example = "Camila Rojas")]
    pub nombre: String,
    #[schema(example = "camila@brewmaster.cl")]
    pub email: String,
    pub rol_id: i32,
    #[schema(example = "CAJERO")]
    pub rol: String,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
}

impl From<Usuario> for UsuarioResponse {
    fn from(usuario: Usuario) -> Self {
        Self {
            id: usuario.id,
            rut: usuario.rut,
            nombre: usuario.nombre,
            email: usuario.email,
            rol_id: usuario.rol_id,
            rol: usuario.rol,
            activo: usuario.activo,
            creado_en: usuario.creado_en,
        }
    }
}
