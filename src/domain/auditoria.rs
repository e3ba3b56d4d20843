//! Audit trail records.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Row of `auditoria`: one administrative mutation
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RegistroAuditoria {
    pub id: i32,
    pub usuario_id: Option<i32>,
    #[schema(example = "CREAR")]
    pub accion: String,
    #[schema(example = "usuarios")]
    pub entidad: String,
    pub entidad_id: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub detalle: Option<Value>,
    pub fecha: DateTime<Utc>,
}

/// Audit row to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NuevaAuditoria {
    pub usuario_id: Option<i32>,
    pub accion: String,
    pub entidad: String,
    pub entidad_id: Option<i32>,
    pub detalle: Option<Value>,
}

impl NuevaAuditoria {
    pub fn new(usuario_id: i32, accion: &str, entidad: &str, entidad_id: i32) -> Self {
        Self {
            usuario_id: Some(usuario_id),
            accion: accion.to_string(),
            entidad: entidad.to_string(),
            entidad_id: Some(entidad_id),
            detalle: None,
        }
    }

    pub fn with_detalle(mut self, detalle: Value) -> Self {
        self.detalle = Some(detalle);
        self
    }
}

/// Row of `auditoria_login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct IntentoLogin {
    pub id: i32,
    /// Matched account, if any
    pub usuario_id: Option<i32>,
    /// RUT or email as typed
    pub identificador: String,
    pub exito: bool,
    pub ip: Option<String>,
    pub fecha: DateTime<Utc>,
}

/// Login attempt to be recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuevoIntentoLogin {
    pub usuario_id: Option<i32>,
    pub identificador: String,
    pub exito: bool,
    pub ip: Option<String>,
}

/// Filters for the audit listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltroAuditoria {
    pub entidad: Option<String>,
    pub usuario_id: Option<i32>,
}

/// Audit action names
pub mod acciones {
    pub const CREAR: &str = "CREAR";
    pub const ACTUALIZAR: &str = "ACTUALIZAR";
    pub const ACTIVAR: &str = "ACTIVAR";
    pub const DESACTIVAR: &str = "DESACTIVAR";
    pub const CAMBIAR_PASSWORD: &str = "CAMBIAR_PASSWORD";
}
