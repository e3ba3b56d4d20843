//! Dashboard aggregation.
//!
//! The dashboard service loads the rows of the requested window and hands
//! them to [`construir`]; everything here is pure so it can be unit tested.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use utoipa::ToSchema;

use super::caja::{totales_por_metodo, ventana_del_dia, TotalMetodo};
use super::{Barril, Caja, Devolucion, EstadoBarril, Venta};
use crate::config::{DEFAULT_DASHBOARD_DAYS, MAX_DASHBOARD_DAYS};
use crate::errors::{AppError, AppResult};

/// Beer types listed in the ranking
const TOP_CERVEZAS: usize = 5;

/// Sales of one local business day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TotalDia {
    #[schema(value_type = String, example = "2024-05-10")]
    pub fecha: NaiveDate,
    pub cantidad_ventas: u64,
    pub total: i64,
}

/// Barrel count for one state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ConteoEstado {
    pub estado: EstadoBarril,
    pub cantidad: u64,
}

/// Litres sold of one beer type
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TopCerveza {
    pub tipo_cerveza: String,
    pub litros: f64,
}

/// Dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ResumenDashboard {
    pub dias: u32,
    pub desde: DateTime<Utc>,
    pub hasta: DateTime<Utc>,
    pub hoy: TotalDia,
    pub total_periodo: i64,
    pub cantidad_ventas_periodo: u64,
    pub devoluciones_periodo: i64,
    pub por_metodo: Vec<TotalMetodo>,
    pub por_dia: Vec<TotalDia>,
    pub barriles_por_estado: Vec<ConteoEstado>,
    pub barriles_bajo_volumen: Vec<Barril>,
    pub top_cervezas: Vec<TopCerveza>,
    pub caja_abierta: Option<Caja>,
}

/// Validate the `dias` query parameter.
pub fn validar_dias(dias: Option<u32>) -> AppResult<u32> {
    let dias = dias.unwrap_or(DEFAULT_DASHBOARD_DAYS);
    if dias == 0 || dias > MAX_DASHBOARD_DAYS {
        return Err(AppError::validation(format!(
            "dias debe estar entre 1 y {}",
            MAX_DASHBOARD_DAYS
        )));
    }
    Ok(dias)
}

/// UTC bounds covering the last `dias` business days, today included.
pub fn ventana(ahora: DateTime<Utc>, offset: FixedOffset, dias: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let (inicio_hoy, fin_hoy) = ventana_del_dia(ahora, offset);
    (inicio_hoy - Duration::days(i64::from(dias) - 1), fin_hoy)
}

/// Rows loaded for the dashboard window
pub struct DatosDashboard<'a> {
    pub ventas: &'a [Venta],
    pub devoluciones: &'a [Devolucion],
    /// All active barrels, used for state counts and beer types
    pub barriles: &'a [Barril],
    pub caja_abierta: Option<Caja>,
}

/// Build the dashboard for the window ending at `ahora`.
pub fn construir(
    ahora: DateTime<Utc>,
    offset: FixedOffset,
    dias: u32,
    datos: DatosDashboard<'_>,
) -> ResumenDashboard {
    let (desde, hasta) = ventana(ahora, offset, dias);
    let hoy_local = ahora.with_timezone(&offset).date_naive();

    let vigentes: Vec<&Venta> = datos
        .ventas
        .iter()
        .filter(|v| !v.is_anulada() && v.fecha >= desde && v.fecha < hasta)
        .collect();

    // Zero-filled buckets, oldest first
    let mut por_dia: BTreeMap<NaiveDate, TotalDia> = (0..dias)
        .map(|i| {
            let fecha = hoy_local - Duration::days(i64::from(i));
            (
                fecha,
                TotalDia {
                    fecha,
                    cantidad_ventas: 0,
                    total: 0,
                },
            )
        })
        .collect();

    for venta in &vigentes {
        let fecha = venta.fecha.with_timezone(&offset).date_naive();
        if let Some(dia) = por_dia.get_mut(&fecha) {
            dia.cantidad_ventas += 1;
            dia.total += venta.total;
        }
    }

    let hoy = por_dia.get(&hoy_local).cloned().unwrap_or(TotalDia {
        fecha: hoy_local,
        cantidad_ventas: 0,
        total: 0,
    });

    let barriles_por_estado = EstadoBarril::ALL
        .into_iter()
        .map(|estado| ConteoEstado {
            estado,
            cantidad: datos
                .barriles
                .iter()
                .filter(|b| b.activo && b.estado == estado)
                .count() as u64,
        })
        .collect();

    let mut barriles_bajo_volumen: Vec<Barril> = datos
        .barriles
        .iter()
        .filter(|b| b.bajo_volumen())
        .cloned()
        .collect();
    barriles_bajo_volumen.sort_by(|a, b| a.fraccion_restante().total_cmp(&b.fraccion_restante()));

    let devoluciones_periodo = datos
        .devoluciones
        .iter()
        .filter(|d| d.fecha >= desde && d.fecha < hasta)
        .map(|d| d.monto)
        .sum();

    ResumenDashboard {
        dias,
        desde,
        hasta,
        hoy,
        total_periodo: vigentes.iter().map(|v| v.total).sum(),
        cantidad_ventas_periodo: vigentes.len() as u64,
        devoluciones_periodo,
        por_metodo: totales_por_metodo(vigentes.iter().copied()),
        por_dia: por_dia.into_values().collect(),
        barriles_por_estado,
        barriles_bajo_volumen,
        top_cervezas: top_cervezas(&vigentes, datos.barriles),
        caja_abierta: datos.caja_abierta,
    }
}

fn top_cervezas(ventas: &[&Venta], barriles: &[Barril]) -> Vec<TopCerveza> {
    let tipos: HashMap<i32, &str> = barriles
        .iter()
        .map(|b| (b.id, b.tipo_cerveza.as_str()))
        .collect();

    let mut litros: HashMap<&str, f64> = HashMap::new();
    for detalle in ventas.iter().flat_map(|v| v.detalles.iter()) {
        let Some(tipo) = detalle.barril_id.and_then(|id| tipos.get(&id)) else {
            continue;
        };
        *litros.entry(tipo).or_insert(0.0) += detalle.litros();
    }

    let mut ranking: Vec<TopCerveza> = litros
        .into_iter()
        .map(|(tipo, litros)| TopCerveza {
            tipo_cerveza: tipo.to_string(),
            litros,
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.litros
            .total_cmp(&a.litros)
            .then_with(|| a.tipo_cerveza.cmp(&b.tipo_cerveza))
    });
    ranking.truncate(TOP_CERVEZAS);
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EstadoVenta, MetodoPago, VentaDetalle};
    use chrono::TimeZone;

    fn offset() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    fn barril(id: i32, tipo: &str, estado: EstadoBarril, volumen: f64) -> Barril {
        Barril {
            id,
            codigo: format!("BRL-{:08}", id),
            tipo_cerveza: tipo.to_string(),
            capacidad_litros: 50.0,
            volumen_restante: volumen,
            estado,
            bodega_id: None,
            ubicacion: None,
            activo: true,
            creado_en: Utc::now(),
            actualizado_en: Utc::now(),
        }
    }

    fn venta(fecha: DateTime<Utc>, total: i64, barril_id: i32, cantidad: i32) -> Venta {
        Venta {
            id: 1,
            caja_id: 1,
            usuario_id: 1,
            metodo_pago: MetodoPago::Efectivo,
            subtotal: total,
            descuento: 0,
            total,
            estado: EstadoVenta::Completada,
            fecha,
            detalles: vec![VentaDetalle {
                id: 1,
                venta_id: 1,
                barril_id: Some(barril_id),
                descripcion: "Schop".into(),
                cantidad,
                precio_unitario: total / i64::from(cantidad),
                volumen_litros: 0.5,
                subtotal: total,
            }],
        }
    }

    #[test]
    fn test_dias_bounds() {
        assert_eq!(validar_dias(None).unwrap(), DEFAULT_DASHBOARD_DAYS);
        assert!(validar_dias(Some(0)).is_err());
        assert!(validar_dias(Some(MAX_DASHBOARD_DAYS + 1)).is_err());
        assert_eq!(validar_dias(Some(30)).unwrap(), 30);
    }

    #[test]
    fn test_days_without_sales_are_zero_filled() {
        let ahora = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();
        let ventas = vec![venta(ahora - Duration::hours(1), 9000, 1, 2)];
        let barriles = vec![barril(1, "IPA", EstadoBarril::EnUso, 30.0)];

        let resumen = construir(
            ahora,
            offset(),
            3,
            DatosDashboard {
                ventas: &ventas,
                devoluciones: &[],
                barriles: &barriles,
                caja_abierta: None,
            },
        );

        assert_eq!(resumen.por_dia.len(), 3);
        assert_eq!(resumen.por_dia[0].total, 0);
        assert_eq!(resumen.por_dia[1].total, 0);
        assert_eq!(resumen.por_dia[2].total, 9000);
        assert_eq!(resumen.hoy.cantidad_ventas, 1);
        assert_eq!(resumen.total_periodo, 9000);
    }

    #[test]
    fn test_sales_outside_window_and_cancelled_are_ignored() {
        let ahora = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();
        let mut anulada = venta(ahora, 5000, 1, 1);
        anulada.estado = EstadoVenta::Anulada;
        let ventas = vec![venta(ahora - Duration::days(10), 7000, 1, 1), anulada];

        let resumen = construir(
            ahora,
            offset(),
            7,
            DatosDashboard {
                ventas: &ventas,
                devoluciones: &[],
                barriles: &[],
                caja_abierta: None,
            },
        );

        assert_eq!(resumen.cantidad_ventas_periodo, 0);
        assert!(resumen.por_metodo.is_empty());
    }

    #[test]
    fn test_barrel_counts_low_volume_and_ranking() {
        let ahora = Utc.with_ymd_and_hms(2024, 5, 10, 18, 0, 0).unwrap();
        let barriles = vec![
            barril(1, "IPA", EstadoBarril::EnUso, 4.0),
            barril(2, "Stout", EstadoBarril::EnUso, 40.0),
            barril(3, "Lager", EstadoBarril::Disponible, 50.0),
            barril(4, "Lager", EstadoBarril::Vacio, 0.0),
        ];
        let ventas = vec![
            venta(ahora, 9000, 1, 2),
            venta(ahora, 18000, 2, 4),
            venta(ahora, 4500, 1, 1),
        ];

        let resumen = construir(
            ahora,
            offset(),
            1,
            DatosDashboard {
                ventas: &ventas,
                devoluciones: &[],
                barriles: &barriles,
                caja_abierta: None,
            },
        );

        let en_uso = resumen
            .barriles_por_estado
            .iter()
            .find(|c| c.estado == EstadoBarril::EnUso)
            .unwrap();
        assert_eq!(en_uso.cantidad, 2);
        assert_eq!(resumen.barriles_por_estado.len(), 4);

        assert_eq!(resumen.barriles_bajo_volumen.len(), 1);
        assert_eq!(resumen.barriles_bajo_volumen[0].id, 1);

        assert_eq!(resumen.top_cervezas[0].tipo_cerveza, "Stout");
        assert!((resumen.top_cervezas[0].litros - 2.0).abs() < 1e-9);
        assert!((resumen.top_cervezas[1].litros - 1.5).abs() < 1e-9);
    }
}
