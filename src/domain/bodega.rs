//! Warehouse entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Warehouse where barrels are stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Bodega {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "Bodega Central")]
    pub nombre: String,
    #[schema(example = "Av. Providencia 1234")]
    pub ubicacion: Option<String>,
    /// Barrel slots, when limited
    pub capacidad: Option<i32>,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
}

/// Data for creating or replacing a warehouse
#[derive(Debug, Clone)]
pub struct DatosBodega {
    pub nombre: String,
    pub ubicacion: Option<String>,
    pub capacidad: Option<i32>,
}
