//! Sales, line items and total computation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::config::{MAX_LINE_QUANTITY, MAX_UNIT_PRICE};
use crate::errors::{AppError, AppResult};

const AMOUNT_OVERFLOW: &str = "El monto de la venta excede el máximo permitido";

/// Payment method of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MetodoPago {
    Efectivo,
    Debito,
    Credito,
    Transferencia,
}

impl MetodoPago {
    pub const ALL: [MetodoPago; 4] = [
        MetodoPago::Efectivo,
        MetodoPago::Debito,
        MetodoPago::Credito,
        MetodoPago::Transferencia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetodoPago::Efectivo => "EFECTIVO",
            MetodoPago::Debito => "DEBITO",
            MetodoPago::Credito => "CREDITO",
            MetodoPago::Transferencia => "TRANSFERENCIA",
        }
    }
}

impl fmt::Display for MetodoPago {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetodoPago {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetodoPago::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::validation(format!("Método de pago inválido: {}", s)))
    }
}

/// Sale state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoVenta {
    Completada,
    Anulada,
}

impl EstadoVenta {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoVenta::Completada => "COMPLETADA",
            EstadoVenta::Anulada => "ANULADA",
        }
    }
}

impl FromStr for EstadoVenta {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COMPLETADA" => Ok(EstadoVenta::Completada),
            "ANULADA" => Ok(EstadoVenta::Anulada),
            other => Err(AppError::validation(format!("Estado de venta inválido: {}", other))),
        }
    }
}

/// Sale line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct VentaDetalle {
    pub id: i32,
    pub venta_id: i32,
    /// Barrel the beer was poured from (draft lines only)
    pub barril_id: Option<i32>,
    #[schema(example = "Schop IPA 500cc")]
    pub descripcion: String,
    pub cantidad: i32,
    #[schema(example = 4500)]
    pub precio_unitario: i64,
    /// Litres poured per unit
    #[schema(example = 0.5)]
    pub volumen_litros: f64,
    pub subtotal: i64,
}

impl VentaDetalle {
    /// Litres this line took from its barrel
    pub fn litros(&self) -> f64 {
        self.volumen_litros * f64::from(self.cantidad)
    }
}

/// Sale with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Venta {
    pub id: i32,
    pub caja_id: i32,
    pub usuario_id: i32,
    pub metodo_pago: MetodoPago,
    pub subtotal: i64,
    pub descuento: i64,
    pub total: i64,
    pub estado: EstadoVenta,
    pub fecha: DateTime<Utc>,
    pub detalles: Vec<VentaDetalle>,
}

impl Venta {
    pub fn is_anulada(&self) -> bool {
        self.estado == EstadoVenta::Anulada
    }

    /// Litres poured per barrel, over all draft lines
    pub fn consumo_por_barril(&self) -> BTreeMap<i32, f64> {
        let mut consumo = BTreeMap::new();
        for detalle in &self.detalles {
            if let Some(barril_id) = detalle.barril_id {
                *consumo.entry(barril_id).or_insert(0.0) += detalle.litros();
            }
        }
        consumo
    }
}

/// Requested line item
#[derive(Debug, Clone, PartialEq)]
pub struct LineaVenta {
    pub barril_id: Option<i32>,
    pub descripcion: String,
    pub cantidad: i32,
    pub precio_unitario: i64,
    pub volumen_litros: f64,
}

impl LineaVenta {
    pub fn subtotal(&self) -> AppResult<i64> {
        i64::from(self.cantidad)
            .checked_mul(self.precio_unitario)
            .ok_or_else(|| AppError::validation(AMOUNT_OVERFLOW))
    }

    pub fn litros(&self) -> f64 {
        self.volumen_litros * f64::from(self.cantidad)
    }

    fn validar(&self) -> AppResult<()> {
        if self.descripcion.trim().is_empty() {
            return Err(AppError::validation("Cada detalle requiere una descripción"));
        }
        if self.cantidad <= 0 {
            return Err(AppError::validation("La cantidad debe ser mayor a 0"));
        }
        if self.cantidad > MAX_LINE_QUANTITY {
            return Err(AppError::validation(format!(
                "La cantidad no puede superar {}",
                MAX_LINE_QUANTITY
            )));
        }
        if self.precio_unitario < 0 {
            return Err(AppError::validation("El precio unitario no puede ser negativo"));
        }
        if self.precio_unitario > MAX_UNIT_PRICE {
            return Err(AppError::validation(format!(
                "El precio unitario no puede superar {}",
                MAX_UNIT_PRICE
            )));
        }
        if !self.volumen_litros.is_finite() || self.volumen_litros < 0.0 {
            return Err(AppError::validation("El volumen por unidad no puede ser negativo"));
        }
        if self.barril_id.is_some() && self.volumen_litros <= 0.0 {
            return Err(AppError::validation(
                "Un detalle asociado a un barril requiere volumen_litros",
            ));
        }
        Ok(())
    }
}

/// Discount requested for a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descuento {
    Monto(i64),
    Porcentaje(u8),
}

impl Descuento {
    /// Resolve the discount from the two optional request fields.
    pub fn from_request(monto: Option<i64>, porcentaje: Option<u8>) -> AppResult<Option<Self>> {
        match (monto, porcentaje) {
            (Some(_), Some(_)) => Err(AppError::validation(
                "Indique descuento o descuento_porcentaje, no ambos",
            )),
            (Some(m), None) => Ok(Some(Descuento::Monto(m))),
            (None, Some(p)) => Ok(Some(Descuento::Porcentaje(p))),
            (None, None) => Ok(None),
        }
    }

    fn monto_sobre(&self, subtotal: i64) -> AppResult<i64> {
        match *self {
            Descuento::Monto(m) if m < 0 => {
                Err(AppError::validation("El descuento no puede ser negativo"))
            }
            Descuento::Monto(m) if m > subtotal => {
                Err(AppError::validation("El descuento no puede superar el subtotal"))
            }
            Descuento::Monto(m) => Ok(m),
            Descuento::Porcentaje(p) if p > 100 => {
                Err(AppError::validation("El porcentaje de descuento debe estar entre 0 y 100"))
            }
            // Rounded half up
            Descuento::Porcentaje(p) => subtotal
                .checked_mul(i64::from(p))
                .and_then(|v| v.checked_add(50))
                .map(|v| v / 100)
                .ok_or_else(|| AppError::validation(AMOUNT_OVERFLOW)),
        }
    }
}

/// Computed money totals of a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totales {
    pub subtotal: i64,
    pub descuento: i64,
    pub total: i64,
}

/// Validate lines and compute subtotal, discount and total.
pub fn calcular_totales(lineas: &[LineaVenta], descuento: Option<Descuento>) -> AppResult<Totales> {
    if lineas.is_empty() {
        return Err(AppError::validation("La venta debe tener al menos un detalle"));
    }
    for linea in lineas {
        linea.validar()?;
    }

    let subtotal = lineas.iter().try_fold(0i64, |acc, linea| {
        acc.checked_add(linea.subtotal()?)
            .ok_or_else(|| AppError::validation(AMOUNT_OVERFLOW))
    })?;
    let descuento = match descuento {
        Some(d) => d.monto_sobre(subtotal)?,
        None => 0,
    };

    Ok(Totales {
        subtotal,
        descuento,
        total: subtotal - descuento,
    })
}

/// Litres requested per barrel, summing lines that share a barrel
pub fn consumo_solicitado(lineas: &[LineaVenta]) -> BTreeMap<i32, f64> {
    let mut consumo = BTreeMap::new();
    for linea in lineas {
        if let Some(barril_id) = linea.barril_id {
            *consumo.entry(barril_id).or_insert(0.0) += linea.litros();
        }
    }
    consumo
}

/// Sale ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NuevaVenta {
    pub caja_id: i32,
    pub usuario_id: i32,
    pub metodo_pago: MetodoPago,
    pub totales: Totales,
    pub lineas: Vec<LineaVenta>,
}

/// Filters for sale listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FiltroVentas {
    pub caja_id: Option<i32>,
    pub usuario_id: Option<i32>,
    pub desde: Option<DateTime<Utc>>,
    pub hasta: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linea(barril_id: Option<i32>, cantidad: i32, precio: i64, litros: f64) -> LineaVenta {
        LineaVenta {
            barril_id,
            descripcion: "Schop".to_string(),
            cantidad,
            precio_unitario: precio,
            volumen_litros: litros,
        }
    }

    #[test]
    fn test_totals_without_discount() {
        let lineas = vec![linea(Some(1), 2, 4500, 0.5), linea(None, 1, 3000, 0.0)];
        let totales = calcular_totales(&lineas, None).unwrap();
        assert_eq!(totales, Totales { subtotal: 12000, descuento: 0, total: 12000 });
    }

    #[test]
    fn test_percentage_discount_rounds_half_up() {
        let lineas = vec![linea(None, 1, 3990, 0.0)];
        // 10% of 3990 = 399
        let totales = calcular_totales(&lineas, Some(Descuento::Porcentaje(10))).unwrap();
        assert_eq!(totales.descuento, 399);
        assert_eq!(totales.total, 3591);

        // 15% of 4990 = 748.5 -> 749
        let lineas = vec![linea(None, 1, 4990, 0.0)];
        let totales = calcular_totales(&lineas, Some(Descuento::Porcentaje(15))).unwrap();
        assert_eq!(totales.descuento, 749);
    }

    #[test]
    fn test_discount_cannot_exceed_subtotal() {
        let lineas = vec![linea(None, 1, 1000, 0.0)];
        assert!(calcular_totales(&lineas, Some(Descuento::Monto(1001))).is_err());
        assert!(calcular_totales(&lineas, Some(Descuento::Monto(-1))).is_err());
        assert!(calcular_totales(&lineas, Some(Descuento::Porcentaje(101))).is_err());
        let gratis = calcular_totales(&lineas, Some(Descuento::Monto(1000))).unwrap();
        assert_eq!(gratis.total, 0);
    }

    #[test]
    fn test_invalid_lines_are_rejected() {
        assert!(calcular_totales(&[], None).is_err());
        assert!(calcular_totales(&[linea(None, 0, 1000, 0.0)], None).is_err());
        assert!(calcular_totales(&[linea(None, 1, -5, 0.0)], None).is_err());
        assert!(calcular_totales(&[linea(Some(2), 1, 1000, 0.0)], None).is_err());
    }

    #[test]
    fn test_oversized_lines_are_rejected() {
        let caro = linea(None, 2, i64::MAX / 2 + 1, 0.0);
        assert!(matches!(calcular_totales(&[caro], None), Err(AppError::Validation(_))));
        assert!(calcular_totales(&[linea(None, MAX_LINE_QUANTITY + 1, 1000, 0.0)], None).is_err());
    }

    #[test]
    fn test_subtotal_overflow_is_a_validation_error() {
        let tope = linea(None, MAX_LINE_QUANTITY, MAX_UNIT_PRICE, 0.0);
        assert_eq!(tope.subtotal().unwrap(), 1_000_000_000_000);

        let desborde = linea(None, 1, i64::MAX, 0.0);
        assert!(matches!(desborde.subtotal(), Ok(i64::MAX)));
        assert!(linea(None, 2, i64::MAX, 0.0).subtotal().is_err());
        assert!(Descuento::Porcentaje(50).monto_sobre(i64::MAX).is_err());
    }

    #[test]
    fn test_both_discount_fields_rejected() {
        assert!(Descuento::from_request(Some(100), Some(10)).is_err());
        assert_eq!(
            Descuento::from_request(None, Some(10)).unwrap(),
            Some(Descuento::Porcentaje(10))
        );
    }

    #[test]
    fn test_consumption_is_grouped_by_barrel() {
        let lineas = vec![
            linea(Some(1), 2, 4500, 0.5),
            linea(Some(1), 1, 3500, 0.33),
            linea(Some(2), 3, 4500, 0.5),
            linea(None, 1, 2000, 0.0),
        ];
        let consumo = consumo_solicitado(&lineas);
        assert_eq!(consumo.len(), 2);
        assert!((consumo[&1] - 1.33).abs() < 1e-9);
        assert!((consumo[&2] - 1.5).abs() < 1e-9);
    }
}
