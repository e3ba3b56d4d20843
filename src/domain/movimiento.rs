//! Inventory movement log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::EstadoBarril;
use crate::errors::{AppError, AppResult};

/// Kind of logged inventory event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoMovimiento {
    Creacion,
    Asignacion,
    Liberacion,
    Venta,
    Devolucion,
    CambioEstado,
    Traslado,
    Ajuste,
}

impl TipoMovimiento {
    pub const ALL: [TipoMovimiento; 8] = [
        TipoMovimiento::Creacion,
        TipoMovimiento::Asignacion,
        TipoMovimiento::Liberacion,
        TipoMovimiento::Venta,
        TipoMovimiento::Devolucion,
        TipoMovimiento::CambioEstado,
        TipoMovimiento::Traslado,
        TipoMovimiento::Ajuste,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TipoMovimiento::Creacion => "CREACION",
            TipoMovimiento::Asignacion => "ASIGNACION",
            TipoMovimiento::Liberacion => "LIBERACION",
            TipoMovimiento::Venta => "VENTA",
            TipoMovimiento::Devolucion => "DEVOLUCION",
            TipoMovimiento::CambioEstado => "CAMBIO_ESTADO",
            TipoMovimiento::Traslado => "TRASLADO",
            TipoMovimiento::Ajuste => "AJUSTE",
        }
    }

    /// Types that may be logged by hand without touching the barrel.
    pub fn es_manual(&self) -> bool {
        matches!(self, TipoMovimiento::Ajuste | TipoMovimiento::Traslado)
    }

    /// Reject types whose side effects only the system may produce.
    pub fn validar_manual(&self) -> AppResult<()> {
        if self.es_manual() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Los movimientos {} se registran automáticamente",
                self
            )))
        }
    }
}

impl fmt::Display for TipoMovimiento {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TipoMovimiento {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TipoMovimiento::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::validation(format!("Tipo de movimiento inválido: {}", s)))
    }
}

/// Logged inventory event tied to a barrel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Movimiento {
    pub id: i32,
    pub barril_id: i32,
    pub usuario_id: Option<i32>,
    pub tipo: TipoMovimiento,
    pub bodega_origen_id: Option<i32>,
    pub bodega_destino_id: Option<i32>,
    /// Litres moved by the event, when it moves beer
    pub volumen_litros: Option<f64>,
    pub detalle: Option<String>,
    pub fecha: DateTime<Utc>,
}

/// Movement to be inserted
#[derive(Debug, Clone, PartialEq)]
pub struct NuevoMovimiento {
    pub barril_id: i32,
    pub usuario_id: Option<i32>,
    pub tipo: TipoMovimiento,
    pub bodega_origen_id: Option<i32>,
    pub bodega_destino_id: Option<i32>,
    pub volumen_litros: Option<f64>,
    pub detalle: Option<String>,
}

impl NuevoMovimiento {
    pub fn new(barril_id: i32, tipo: TipoMovimiento, usuario_id: Option<i32>) -> Self {
        Self {
            barril_id,
            usuario_id,
            tipo,
            bodega_origen_id: None,
            bodega_destino_id: None,
            volumen_litros: None,
            detalle: None,
        }
    }

    pub fn with_detalle(mut self, detalle: impl Into<String>) -> Self {
        self.detalle = Some(detalle.into());
        self
    }

    pub fn with_volumen(mut self, litros: f64) -> Self {
        self.volumen_litros = Some(litros);
        self
    }

    pub fn with_bodegas(mut self, origen: Option<i32>, destino: Option<i32>) -> Self {
        self.bodega_origen_id = origen;
        self.bodega_destino_id = destino;
        self
    }
}

/// Filters for movement listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltroMovimientos {
    pub barril_id: Option<i32>,
    pub tipo: Option<TipoMovimiento>,
    pub usuario_id: Option<i32>,
}

/// Before/after snapshot of a barrel, written to `auditoria_movimientos`
#[derive(Debug, Clone, PartialEq)]
pub struct CambioBarril {
    pub estado_anterior: EstadoBarril,
    pub estado_nuevo: EstadoBarril,
    pub volumen_anterior: f64,
    pub volumen_nuevo: f64,
}
