//! Returns against completed sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

use super::{EstadoVenta, Venta};
use crate::errors::{AppError, AppResult};

/// Returned line item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DevolucionDetalle {
    pub id: i32,
    pub devolucion_id: i32,
    pub venta_detalle_id: i32,
    pub cantidad: i32,
    pub monto: i64,
}

/// Return with its line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Devolucion {
    pub id: i32,
    pub venta_id: i32,
    /// Register of the original sale
    pub caja_id: i32,
    pub usuario_id: i32,
    pub motivo: String,
    /// Refunded amount
    pub monto: i64,
    pub reintegra_volumen: bool,
    pub fecha: DateTime<Utc>,
    pub detalles: Vec<DevolucionDetalle>,
}

/// Requested return line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineaDevolucion {
    pub venta_detalle_id: i32,
    pub cantidad: i32,
}

/// Computed line of a return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineaCalculada {
    pub venta_detalle_id: i32,
    pub cantidad: i32,
    pub monto: i64,
}

/// Return ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NuevaDevolucion {
    pub venta_id: i32,
    pub caja_id: i32,
    pub usuario_id: i32,
    pub motivo: String,
    pub reintegra_volumen: bool,
    pub lineas: Vec<LineaCalculada>,
    pub monto: i64,
    /// Litres going back to each barrel (empty unless `reintegra_volumen`)
    pub reintegros: BTreeMap<i32, f64>,
}

/// Refund of `cantidad` units, carrying the sale's discount ratio.
///
/// Computed in `i128` so the intermediate product cannot overflow.
fn reembolso(cantidad: i32, precio_unitario: i64, total: i64, subtotal: i64) -> AppResult<i64> {
    if subtotal <= 0 {
        return Ok(0);
    }
    let bruto = i128::from(cantidad) * i128::from(precio_unitario);
    i64::try_from(bruto * i128::from(total) / i128::from(subtotal))
        .map_err(|_| AppError::validation("El monto de la devolución excede el máximo permitido"))
}

/// Validate a return against its sale and compute refunds.
///
/// `ya_devuelto` maps `venta_detalle_id` to units returned earlier. Each
/// line refund carries the sale's discount proportionally:
/// `floor(cantidad * precio_unitario * total / subtotal)`.
pub fn calcular_devolucion(
    venta: &Venta,
    ya_devuelto: &HashMap<i32, i32>,
    lineas: &[LineaDevolucion],
    usuario_id: i32,
    motivo: String,
    reintegra_volumen: bool,
) -> AppResult<NuevaDevolucion> {
    if venta.estado != EstadoVenta::Completada {
        return Err(AppError::conflict("Solo se pueden devolver ventas completadas"));
    }
    if motivo.trim().is_empty() {
        return Err(AppError::validation("La devolución requiere un motivo"));
    }
    if lineas.is_empty() {
        return Err(AppError::validation("La devolución debe tener al menos un detalle"));
    }

    // Merge repeated lines for the same sale item
    let mut solicitadas: BTreeMap<i32, i32> = BTreeMap::new();
    for linea in lineas {
        if linea.cantidad <= 0 {
            return Err(AppError::validation("La cantidad a devolver debe ser mayor a 0"));
        }
        let total = solicitadas.entry(linea.venta_detalle_id).or_insert(0);
        *total = total
            .checked_add(linea.cantidad)
            .ok_or_else(|| AppError::validation("La cantidad a devolver excede el máximo permitido"))?;
    }

    let mut calculadas = Vec::with_capacity(solicitadas.len());
    let mut reintegros = BTreeMap::new();

    for (detalle_id, cantidad) in solicitadas {
        let detalle = venta
            .detalles
            .iter()
            .find(|d| d.id == detalle_id)
            .ok_or_else(|| {
                AppError::validation(format!(
                    "El detalle {} no pertenece a la venta {}",
                    detalle_id, venta.id
                ))
            })?;

        let devuelto = ya_devuelto.get(&detalle_id).copied().unwrap_or(0);
        let disponible = detalle.cantidad - devuelto;
        if cantidad > disponible {
            return Err(AppError::validation(format!(
                "Solo quedan {} unidades por devolver de \"{}\"",
                disponible.max(0),
                detalle.descripcion
            )));
        }

        let monto = reembolso(cantidad, detalle.precio_unitario, venta.total, venta.subtotal)?;

        if reintegra_volumen {
            if let Some(barril_id) = detalle.barril_id {
                *reintegros.entry(barril_id).or_insert(0.0) +=
                    detalle.volumen_litros * f64::from(cantidad);
            }
        }

        calculadas.push(LineaCalculada {
            venta_detalle_id: detalle_id,
            cantidad,
            monto,
        });
    }

    let monto = calculadas.iter().map(|l| l.monto).sum();

    Ok(NuevaDevolucion {
        venta_id: venta.id,
        caja_id: venta.caja_id,
        usuario_id,
        motivo: motivo.trim().to_string(),
        reintegra_volumen,
        lineas: calculadas,
        monto,
        reintegros,
    })
}

/// Units already returned per sale item, over previous returns
pub fn unidades_devueltas(devoluciones: &[Devolucion]) -> HashMap<i32, i32> {
    let mut devuelto = HashMap::new();
    for detalle in devoluciones.iter().flat_map(|d| d.detalles.iter()) {
        *devuelto.entry(detalle.venta_detalle_id).or_insert(0) += detalle.cantidad;
    }
    devuelto
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetodoPago, VentaDetalle};

    fn venta(subtotal: i64, descuento: i64) -> Venta {
        Venta {
            id: 10,
            caja_id: 3,
            usuario_id: 1,
            metodo_pago: MetodoPago::Efectivo,
            subtotal,
            descuento,
            total: subtotal - descuento,
            estado: EstadoVenta::Completada,
            fecha: Utc::now(),
            detalles: vec![
                VentaDetalle {
                    id: 100,
                    venta_id: 10,
                    barril_id: Some(7),
                    descripcion: "Schop Lager".to_string(),
                    cantidad: 3,
                    precio_unitario: 4000,
                    volumen_litros: 0.5,
                    subtotal: 12000,
                },
                VentaDetalle {
                    id: 101,
                    venta_id: 10,
                    barril_id: None,
                    descripcion: "Papas fritas".to_string(),
                    cantidad: 1,
                    precio_unitario: 3000,
                    volumen_litros: 0.0,
                    subtotal: 3000,
                },
            ],
        }
    }

    #[test]
    fn test_refund_without_discount() {
        let nueva = calcular_devolucion(
            &venta(15000, 0),
            &HashMap::new(),
            &[LineaDevolucion { venta_detalle_id: 100, cantidad: 2 }],
            1,
            "Cerveza tibia".into(),
            true,
        )
        .unwrap();

        assert_eq!(nueva.monto, 8000);
        assert_eq!(nueva.caja_id, 3);
        assert_eq!(nueva.reintegros.get(&7), Some(&1.0));
    }

    #[test]
    fn test_refund_applies_discount_ratio() {
        // total 12000 over subtotal 15000: 8000 * 0.8 = 6400
        let nueva = calcular_devolucion(
            &venta(15000, 3000),
            &HashMap::new(),
            &[LineaDevolucion { venta_detalle_id: 100, cantidad: 2 }],
            1,
            "Error de pedido".into(),
            false,
        )
        .unwrap();

        assert_eq!(nueva.monto, 6400);
        assert!(nueva.reintegros.is_empty());
    }

    #[test]
    fn test_cannot_return_more_than_sold_minus_returned() {
        let ya_devuelto = HashMap::from([(100, 2)]);
        let err = calcular_devolucion(
            &venta(15000, 0),
            &ya_devuelto,
            &[LineaDevolucion { venta_detalle_id: 100, cantidad: 2 }],
            1,
            "Otra".into(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("Solo quedan 1")));
    }

    #[test]
    fn test_repeated_lines_are_merged_before_checking() {
        let lineas = [
            LineaDevolucion { venta_detalle_id: 100, cantidad: 2 },
            LineaDevolucion { venta_detalle_id: 100, cantidad: 2 },
        ];
        assert!(calcular_devolucion(&venta(15000, 0), &HashMap::new(), &lineas, 1, "x".into(), false)
            .is_err());
    }

    #[test]
    fn test_foreign_line_and_cancelled_sale_are_rejected() {
        let foreign = [LineaDevolucion { venta_detalle_id: 999, cantidad: 1 }];
        assert!(calcular_devolucion(&venta(15000, 0), &HashMap::new(), &foreign, 1, "x".into(), false)
            .is_err());

        let mut anulada = venta(15000, 0);
        anulada.estado = EstadoVenta::Anulada;
        let ok_line = [LineaDevolucion { venta_detalle_id: 101, cantidad: 1 }];
        assert!(matches!(
            calcular_devolucion(&anulada, &HashMap::new(), &ok_line, 1, "x".into(), false),
            Err(AppError::Conflict(_))
        ));
    }

    #[test]
    fn test_repeated_lines_summing_past_i32_are_rejected() {
        let lineas = [
            LineaDevolucion { venta_detalle_id: 100, cantidad: i32::MAX },
            LineaDevolucion { venta_detalle_id: 100, cantidad: 1 },
        ];
        let err = calcular_devolucion(&venta(15000, 0), &HashMap::new(), &lineas, 1, "x".into(), false)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_refund_of_large_amounts_does_not_overflow() {
        // bruto * total exceeds i64 before dividing
        let total = 900_000_000_000_000_000;
        let subtotal = 1_000_000_000_000_000_000;
        assert_eq!(
            reembolso(1000, 10_000_000_000_000, total, subtotal).unwrap(),
            9_000_000_000_000_000
        );
        assert!(reembolso(i32::MAX, i64::MAX, 1, 1).is_err());
        assert_eq!(reembolso(1, 5000, 0, 0).unwrap(), 0);
    }
}
