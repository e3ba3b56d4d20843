//! Barrel (keg) entity and volume rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{BARRIL_CODE_PREFIX, LOW_VOLUME_RATIO};
use crate::errors::{AppError, AppResult};

/// Volumes closer than this are treated as equal (litres)
const VOLUME_EPSILON: f64 = 1e-6;

/// Barrel lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoBarril {
    /// Stored, with beer, not connected to any register
    Disponible,
    /// Connected to an open register
    EnUso,
    Vacio,
    Mantencion,
}

impl EstadoBarril {
    pub const ALL: [EstadoBarril; 4] = [
        EstadoBarril::Disponible,
        EstadoBarril::EnUso,
        EstadoBarril::Vacio,
        EstadoBarril::Mantencion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoBarril::Disponible => "DISPONIBLE",
            EstadoBarril::EnUso => "EN_USO",
            EstadoBarril::Vacio => "VACIO",
            EstadoBarril::Mantencion => "MANTENCION",
        }
    }
}

impl fmt::Display for EstadoBarril {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoBarril {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EstadoBarril::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::validation(format!("Estado de barril inválido: {}", s)))
    }
}

/// Barrel entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Barril {
    #[schema(example = 12)]
    pub id: i32,
    /// QR payload
    #[schema(example = "BRL-3F2A9C01")]
    pub codigo: String,
    #[schema(example = "IPA")]
    pub tipo_cerveza: String,
    #[schema(example = 50.0)]
    pub capacidad_litros: f64,
    #[schema(example = 32.5)]
    pub volumen_restante: f64,
    pub estado: EstadoBarril,
    pub bodega_id: Option<i32>,
    pub ubicacion: Option<String>,
    pub activo: bool,
    pub creado_en: DateTime<Utc>,
    pub actualizado_en: DateTime<Utc>,
}

impl Barril {
    /// Remaining volume as a fraction of capacity (0.0 - 1.0)
    pub fn fraccion_restante(&self) -> f64 {
        if self.capacidad_litros <= 0.0 {
            return 0.0;
        }
        (self.volumen_restante / self.capacidad_litros).clamp(0.0, 1.0)
    }

    /// True for barrels with beer left but under the low-volume threshold.
    pub fn bajo_volumen(&self) -> bool {
        self.activo && self.volumen_restante > VOLUME_EPSILON && self.fraccion_restante() < LOW_VOLUME_RATIO
    }

    /// Check that `litros` can be poured from this barrel.
    pub fn validar_consumo(&self, litros: f64) -> AppResult<()> {
        if !self.activo {
            return Err(AppError::validation(format!("El barril {} está dado de baja", self.codigo)));
        }
        if self.estado != EstadoBarril::EnUso {
            return Err(AppError::validation(format!(
                "El barril {} no está conectado a la caja (estado {})",
                self.codigo, self.estado
            )));
        }
        if litros > self.volumen_restante + VOLUME_EPSILON {
            return Err(AppError::validation(format!(
                "Volumen insuficiente en barril {}: quedan {:.2} L, se requieren {:.2} L",
                self.codigo, self.volumen_restante, litros
            )));
        }
        Ok(())
    }

    /// Volume and state after pouring `litros` (already validated).
    pub fn tras_consumo(&self, litros: f64) -> (f64, EstadoBarril) {
        let restante = (self.volumen_restante - litros).max(0.0);
        if restante <= VOLUME_EPSILON {
            (0.0, EstadoBarril::Vacio)
        } else {
            (restante, self.estado)
        }
    }

    /// Volume and state after giving `litros` back (returns, cancellations).
    ///
    /// Volume is capped at capacity. An emptied barrel comes back `EN_USO`
    /// while still assigned to a register, `DISPONIBLE` otherwise.
    pub fn tras_reintegro(&self, litros: f64, asignado: bool) -> (f64, EstadoBarril) {
        let volumen = (self.volumen_restante + litros).min(self.capacidad_litros);
        let estado = match self.estado {
            EstadoBarril::Vacio if volumen > VOLUME_EPSILON => {
                if asignado {
                    EstadoBarril::EnUso
                } else {
                    EstadoBarril::Disponible
                }
            }
            estado => estado,
        };
        (volumen, estado)
    }

    /// Check a manual state change requested through the API.
    pub fn validar_cambio_estado(&self, nuevo: EstadoBarril) -> AppResult<()> {
        if nuevo == EstadoBarril::EnUso {
            return Err(AppError::validation(
                "Un barril pasa a EN_USO solo al asignarlo a una caja",
            ));
        }
        if self.estado == EstadoBarril::EnUso {
            return Err(AppError::conflict(
                "El barril está asignado a una caja; libérelo antes de cambiar su estado",
            ));
        }
        if nuevo == EstadoBarril::Disponible && self.volumen_restante <= VOLUME_EPSILON {
            return Err(AppError::validation("Un barril sin volumen no puede quedar DISPONIBLE"));
        }
        Ok(())
    }

    /// Check that the barrel can be connected to a register.
    pub fn validar_asignacion(&self) -> AppResult<()> {
        if !self.activo {
            return Err(AppError::validation("El barril está dado de baja"));
        }
        if self.estado != EstadoBarril::Disponible {
            return Err(AppError::conflict(format!(
                "El barril {} no está disponible (estado {})",
                self.codigo, self.estado
            )));
        }
        if self.volumen_restante <= VOLUME_EPSILON {
            return Err(AppError::validation("El barril no tiene volumen"));
        }
        Ok(())
    }

    /// State after a manual volume adjustment.
    pub fn estado_tras_ajuste(&self, volumen: f64, asignado: bool) -> EstadoBarril {
        match self.estado {
            EstadoBarril::Disponible | EstadoBarril::EnUso if volumen <= VOLUME_EPSILON => {
                EstadoBarril::Vacio
            }
            EstadoBarril::Vacio if volumen > VOLUME_EPSILON => {
                if asignado {
                    EstadoBarril::EnUso
                } else {
                    EstadoBarril::Disponible
                }
            }
            estado => estado,
        }
    }

    /// Check a transfer to another warehouse.
    pub fn validar_traslado(&self, bodega_destino_id: i32) -> AppResult<()> {
        if self.estado == EstadoBarril::EnUso {
            return Err(AppError::conflict(
                "El barril está asignado a una caja; libérelo antes de trasladarlo",
            ));
        }
        if self.bodega_id == Some(bodega_destino_id) {
            return Err(AppError::validation("El barril ya está en esa bodega"));
        }
        Ok(())
    }

    /// Check that the barrel can be retired.
    pub fn validar_baja(&self) -> AppResult<()> {
        if self.estado == EstadoBarril::EnUso {
            return Err(AppError::conflict(
                "El barril está asignado a una caja; libérelo antes de darlo de baja",
            ));
        }
        Ok(())
    }

    /// State after being released from a register.
    pub fn estado_tras_liberacion(&self) -> EstadoBarril {
        if self.volumen_restante <= VOLUME_EPSILON {
            EstadoBarril::Vacio
        } else {
            EstadoBarril::Disponible
        }
    }
}

/// Generate a fresh barrel code (`BRL-` + 8 hex digits)
pub fn generar_codigo() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{}{}", BARRIL_CODE_PREFIX, hex[..8].to_ascii_uppercase())
}

/// Filters for barrel listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltroBarriles {
    pub estado: Option<EstadoBarril>,
    pub bodega_id: Option<i32>,
}

/// Validated data for a new barrel
#[derive(Debug, Clone)]
pub struct NuevoBarril {
    pub codigo: String,
    pub tipo_cerveza: String,
    pub capacidad_litros: f64,
    pub volumen_restante: f64,
    pub bodega_id: Option<i32>,
    pub ubicacion: Option<String>,
}

impl NuevoBarril {
    /// Build a new barrel, defaulting code and volume.
    pub fn new(
        codigo: Option<String>,
        tipo_cerveza: String,
        capacidad_litros: f64,
        volumen_restante: Option<f64>,
        bodega_id: Option<i32>,
        ubicacion: Option<String>,
    ) -> AppResult<Self> {
        validar_volumenes(capacidad_litros, volumen_restante.unwrap_or(capacidad_litros))?;

        let codigo = codigo
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(generar_codigo);

        Ok(Self {
            codigo,
            tipo_cerveza: tipo_cerveza.trim().to_string(),
            capacidad_litros,
            volumen_restante: volumen_restante.unwrap_or(capacidad_litros),
            bodega_id,
            ubicacion,
        })
    }

    /// Initial state: a barrel created empty is `VACIO`.
    pub fn estado_inicial(&self) -> EstadoBarril {
        if self.volumen_restante <= VOLUME_EPSILON {
            EstadoBarril::Vacio
        } else {
            EstadoBarril::Disponible
        }
    }
}

/// Partial update of barrel metadata
#[derive(Debug, Clone, Default)]
pub struct CambiosBarril {
    pub tipo_cerveza: Option<String>,
    pub capacidad_litros: Option<f64>,
    pub volumen_restante: Option<f64>,
    pub ubicacion: Option<String>,
}

impl CambiosBarril {
    /// Validate the update against the current barrel.
    pub fn validar(&self, actual: &Barril) -> AppResult<()> {
        let capacidad = self.capacidad_litros.unwrap_or(actual.capacidad_litros);
        let volumen = self.volumen_restante.unwrap_or(actual.volumen_restante);
        validar_volumenes(capacidad, volumen)
    }

    /// True when the update changes the remaining volume.
    pub fn cambia_volumen(&self, actual: &Barril) -> bool {
        self.volumen_restante
            .map(|v| (v - actual.volumen_restante).abs() > VOLUME_EPSILON)
            .unwrap_or(false)
    }
}

fn validar_volumenes(capacidad: f64, volumen: f64) -> AppResult<()> {
    if !capacidad.is_finite() || capacidad <= 0.0 {
        return Err(AppError::validation("La capacidad debe ser mayor a 0"));
    }
    if !volumen.is_finite() || volumen < 0.0 {
        return Err(AppError::validation("El volumen restante no puede ser negativo"));
    }
    if volumen > capacidad + VOLUME_EPSILON {
        return Err(AppError::validation("El volumen restante no puede superar la capacidad"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barril(estado: EstadoBarril, capacidad: f64, volumen: f64) -> Barril {
        Barril {
            id: 1,
            codigo: "BRL-TEST0001".to_string(),
            tipo_cerveza: "Stout".to_string(),
            capacidad_litros: capacidad,
            volumen_restante: volumen,
            estado,
            bodega_id: None,
            ubicacion: None,
            activo: true,
            creado_en: Utc::now(),
            actualizado_en: Utc::now(),
        }
    }

    #[test]
    fn test_estado_round_trips_through_str() {
        for estado in EstadoBarril::ALL {
            assert_eq!(estado.as_str().parse::<EstadoBarril>().unwrap(), estado);
        }
        assert_eq!("en_uso".parse::<EstadoBarril>().unwrap(), EstadoBarril::EnUso);
        assert!("ROTO".parse::<EstadoBarril>().is_err());
    }

    #[test]
    fn test_consumo_requires_en_uso_and_volume() {
        let disponible = barril(EstadoBarril::Disponible, 50.0, 50.0);
        assert!(disponible.validar_consumo(0.5).is_err());

        let en_uso = barril(EstadoBarril::EnUso, 50.0, 1.0);
        assert!(en_uso.validar_consumo(1.0).is_ok());
        assert!(en_uso.validar_consumo(1.5).is_err());
    }

    #[test]
    fn test_consumo_to_zero_empties_barrel() {
        let en_uso = barril(EstadoBarril::EnUso, 30.0, 1.0);
        assert_eq!(en_uso.tras_consumo(1.0), (0.0, EstadoBarril::Vacio));
        assert_eq!(en_uso.tras_consumo(0.4), (0.6, EstadoBarril::EnUso));
    }

    #[test]
    fn test_reintegro_caps_at_capacity_and_revives_empty_barrel() {
        let vacio = barril(EstadoBarril::Vacio, 30.0, 0.0);
        assert_eq!(vacio.tras_reintegro(0.5, true), (0.5, EstadoBarril::EnUso));
        assert_eq!(vacio.tras_reintegro(0.5, false), (0.5, EstadoBarril::Disponible));

        let casi_lleno = barril(EstadoBarril::EnUso, 30.0, 29.8);
        assert_eq!(casi_lleno.tras_reintegro(1.0, true), (30.0, EstadoBarril::EnUso));
    }

    #[test]
    fn test_manual_state_change_rules() {
        let vacio = barril(EstadoBarril::Vacio, 30.0, 0.0);
        assert!(vacio.validar_cambio_estado(EstadoBarril::Mantencion).is_ok());
        assert!(vacio.validar_cambio_estado(EstadoBarril::Disponible).is_err());
        assert!(vacio.validar_cambio_estado(EstadoBarril::EnUso).is_err());

        let en_uso = barril(EstadoBarril::EnUso, 30.0, 10.0);
        assert!(matches!(
            en_uso.validar_cambio_estado(EstadoBarril::Mantencion),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_nuevo_barril_defaults() {
        let nuevo = NuevoBarril::new(None, " IPA ".into(), 50.0, None, None, None).unwrap();
        assert!(nuevo.codigo.starts_with(BARRIL_CODE_PREFIX));
        assert_eq!(nuevo.codigo.len(), BARRIL_CODE_PREFIX.len() + 8);
        assert_eq!(nuevo.tipo_cerveza, "IPA");
        assert_eq!(nuevo.volumen_restante, 50.0);
        assert_eq!(nuevo.estado_inicial(), EstadoBarril::Disponible);
    }

    #[test]
    fn test_nuevo_barril_rejects_bad_volumes() {
        assert!(NuevoBarril::new(None, "IPA".into(), 0.0, None, None, None).is_err());
        assert!(NuevoBarril::new(None, "IPA".into(), 30.0, Some(31.0), None, None).is_err());
        assert!(NuevoBarril::new(None, "IPA".into(), 30.0, Some(-1.0), None, None).is_err());
    }

    #[test]
    fn test_bajo_volumen_threshold() {
        assert!(barril(EstadoBarril::EnUso, 50.0, 5.0).bajo_volumen());
        assert!(!barril(EstadoBarril::EnUso, 50.0, 10.0).bajo_volumen());
        assert!(!barril(EstadoBarril::Vacio, 50.0, 0.0).bajo_volumen());
    }

    #[test]
    fn test_volume_adjustment_moves_between_vacio_and_stock() {
        let disponible = barril(EstadoBarril::Disponible, 50.0, 10.0);
        assert_eq!(disponible.estado_tras_ajuste(0.0, false), EstadoBarril::Vacio);
        assert_eq!(disponible.estado_tras_ajuste(5.0, false), EstadoBarril::Disponible);

        let vacio = barril(EstadoBarril::Vacio, 50.0, 0.0);
        assert_eq!(vacio.estado_tras_ajuste(20.0, false), EstadoBarril::Disponible);

        let mantencion = barril(EstadoBarril::Mantencion, 50.0, 0.0);
        assert_eq!(mantencion.estado_tras_ajuste(20.0, false), EstadoBarril::Mantencion);
    }

    #[test]
    fn test_transfer_rules() {
        let mut b = barril(EstadoBarril::Disponible, 50.0, 10.0);
        b.bodega_id = Some(1);
        assert!(b.validar_traslado(2).is_ok());
        assert!(b.validar_traslado(1).is_err());

        b.estado = EstadoBarril::EnUso;
        assert!(matches!(b.validar_traslado(2), Err(AppError::Conflict(_))));
        assert!(b.validar_baja().is_err());
    }

    #[test]
    fn test_asignacion_requires_disponible() {
        assert!(barril(EstadoBarril::Disponible, 50.0, 20.0).validar_asignacion().is_ok());
        assert!(matches!(
            barril(EstadoBarril::EnUso, 50.0, 20.0).validar_asignacion(),
            Err(AppError::Conflict(_))
        ));
    }
}
