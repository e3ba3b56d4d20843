//! Cash-register sessions.
//!
//! At most one register is `ABIERTA` at a time; the database enforces it
//! through `ux_caja_abierta`. This module holds the decisions around that
//! invariant (who may touch the open register, when a same-day register is
//! reopened) and the closing summary. Persistence and the conflict retry
//! live in the caja service.

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use super::{Devolucion, MetodoPago, Venta};
use crate::errors::{AppError, AppResult};

/// Register state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EstadoCaja {
    Abierta,
    Cerrada,
}

impl EstadoCaja {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstadoCaja::Abierta => "ABIERTA",
            EstadoCaja::Cerrada => "CERRADA",
        }
    }
}

impl fmt::Display for EstadoCaja {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstadoCaja {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ABIERTA" => Ok(EstadoCaja::Abierta),
            "CERRADA" => Ok(EstadoCaja::Cerrada),
            other => Err(AppError::validation(format!("Estado de caja inválido: {}", other))),
        }
    }
}

/// Cash-register session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Caja {
    #[schema(example = 42)]
    pub id: i32,
    /// Owner: the user who opened it
    pub usuario_id: i32,
    pub estado: EstadoCaja,
    /// Opening float (CLP)
    #[schema(example = 50000)]
    pub monto_inicial: i64,
    /// Closing float (CLP)
    pub monto_final: Option<i64>,
    pub fecha_apertura: DateTime<Utc>,
    pub fecha_cierre: Option<DateTime<Utc>>,
}

impl Caja {
    pub fn is_abierta(&self) -> bool {
        self.estado == EstadoCaja::Abierta
    }

    pub fn is_owned_by(&self, usuario_id: i32) -> bool {
        self.usuario_id == usuario_id
    }

    /// Copy safe to show to someone who does not own the register.
    pub fn masked(&self) -> Caja {
        Caja {
            monto_inicial: 0,
            monto_final: None,
            ..self.clone()
        }
    }

    /// The register as seen by `usuario_id`.
    pub fn visible_para(self, usuario_id: i32, is_admin: bool) -> Caja {
        if is_admin || self.is_owned_by(usuario_id) {
            self
        } else {
            self.masked()
        }
    }
}

/// Outcome reported by `POST /api/caja/abrir`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultadoApertura {
    /// A new register was inserted
    Creada,
    /// The user's register from earlier today was reopened
    Reabierta,
    /// The user already had it open; the float was updated
    Actualizada,
    /// The user already had it open; nothing changed
    Existente,
    /// Someone else has the register open; masked copy returned
    Ajena,
}

/// Register returned by an open request, with what happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AperturaCaja {
    pub caja: Caja,
    pub resultado: ResultadoApertura,
}

/// What an open request has to do, decided from current database state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanApertura {
    /// Requester owns the open register; update the float if given
    Propia { caja: Caja, nuevo_monto: Option<i64> },
    /// Someone else owns the open register
    Ajena(Caja),
    /// Reopen the requester's register from the same day
    Reabrir { caja_id: i32, nuevo_monto: Option<i64> },
    /// Insert a new register
    Crear { monto_inicial: i64 },
}

/// Reject negative floats.
pub fn validar_monto(monto: Option<i64>) -> AppResult<()> {
    match monto {
        Some(m) if m < 0 => Err(AppError::validation("El monto no puede ser negativo")),
        _ => Ok(()),
    }
}

/// Branch on an already-open register.
pub fn plan_para_abierta(abierta: Caja, usuario_id: i32, monto: Option<i64>) -> PlanApertura {
    if abierta.is_owned_by(usuario_id) {
        PlanApertura::Propia {
            caja: abierta,
            nuevo_monto: monto,
        }
    } else {
        PlanApertura::Ajena(abierta)
    }
}

/// Decide how to serve an open request.
///
/// `abierta` is the currently open register, `del_dia` the requester's
/// register opened earlier in the same business day (if any).
pub fn planificar_apertura(
    abierta: Option<Caja>,
    del_dia: Option<Caja>,
    usuario_id: i32,
    monto: Option<i64>,
) -> AppResult<PlanApertura> {
    validar_monto(monto)?;

    if let Some(caja) = abierta {
        return Ok(plan_para_abierta(caja, usuario_id, monto));
    }

    if let Some(caja) = del_dia {
        return Ok(PlanApertura::Reabrir {
            caja_id: caja.id,
            nuevo_monto: monto,
        });
    }

    match monto {
        Some(monto_inicial) => Ok(PlanApertura::Crear { monto_inicial }),
        None => Err(AppError::validation(
            "monto_inicial es obligatorio para abrir una caja nueva",
        )),
    }
}

/// UTC bounds `[inicio, fin)` of the business day containing `ahora`.
pub fn ventana_del_dia(ahora: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let local = ahora.with_timezone(&offset);
    let midnight = local.date_naive().and_time(NaiveTime::MIN);
    let inicio = offset
        .from_local_datetime(&midnight)
        .single()
        .map(|d| d.with_timezone(&Utc))
        // Fixed offsets never produce ambiguous local times
        .unwrap_or(ahora);
    (inicio, inicio + Duration::days(1))
}

/// Sales total for one payment method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TotalMetodo {
    pub metodo_pago: MetodoPago,
    pub cantidad: u64,
    pub total: i64,
}

/// Derived summary of a register
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResumenCaja {
    pub caja_id: i32,
    pub monto_inicial: i64,
    /// Non-cancelled sales
    pub cantidad_ventas: u64,
    pub total_ventas: i64,
    pub total_descuentos: i64,
    pub por_metodo: Vec<TotalMetodo>,
    pub cantidad_anuladas: u64,
    pub total_devoluciones: i64,
    /// Sales minus refunds
    pub ventas_netas: i64,
    /// Opening float plus net sales
    pub monto_esperado: i64,
}

/// Group non-cancelled sales by payment method, in `MetodoPago::ALL` order.
pub fn totales_por_metodo<'a>(ventas: impl IntoIterator<Item = &'a Venta>) -> Vec<TotalMetodo> {
    let mut totales: Vec<TotalMetodo> = MetodoPago::ALL
        .into_iter()
        .map(|metodo_pago| TotalMetodo {
            metodo_pago,
            cantidad: 0,
            total: 0,
        })
        .collect();

    for venta in ventas.into_iter().filter(|v| !v.is_anulada()) {
        if let Some(slot) = totales.iter_mut().find(|t| t.metodo_pago == venta.metodo_pago) {
            slot.cantidad += 1;
            slot.total += venta.total;
        }
    }

    totales.retain(|t| t.cantidad > 0);
    totales
}

/// Summarise a register from its sales and the returns booked against it.
pub fn resumir(caja: &Caja, ventas: &[Venta], devoluciones: &[Devolucion]) -> ResumenCaja {
    let vigentes: Vec<&Venta> = ventas.iter().filter(|v| !v.is_anulada()).collect();
    let total_ventas: i64 = vigentes.iter().map(|v| v.total).sum();
    let total_descuentos: i64 = vigentes.iter().map(|v| v.descuento).sum();
    let total_devoluciones: i64 = devoluciones
        .iter()
        .filter(|d| d.caja_id == caja.id)
        .map(|d| d.monto)
        .sum();
    let ventas_netas = total_ventas - total_devoluciones;

    ResumenCaja {
        caja_id: caja.id,
        monto_inicial: caja.monto_inicial,
        cantidad_ventas: vigentes.len() as u64,
        total_ventas,
        total_descuentos,
        por_metodo: totales_por_metodo(vigentes.iter().copied()),
        cantidad_anuladas: (ventas.len() - vigentes.len()) as u64,
        total_devoluciones,
        ventas_netas,
        monto_esperado: caja.monto_inicial + ventas_netas,
    }
}

/// Closing float: the explicit override, or the expected amount.
pub fn monto_cierre(resumen: &ResumenCaja, override_monto: Option<i64>) -> AppResult<i64> {
    validar_monto(override_monto)?;
    Ok(override_monto.unwrap_or(resumen.monto_esperado))
}

/// Closed register with its summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CierreCaja {
    pub caja: Caja,
    pub resumen: ResumenCaja,
}

/// Active barrel assignment to a register (`caja_barriles`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CajaBarril {
    pub id: i32,
    pub caja_id: i32,
    pub barril_id: i32,
    pub asignado_en: DateTime<Utc>,
    pub liberado_en: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EstadoVenta, Venta};

    fn caja(id: i32, usuario_id: i32, estado: EstadoCaja, monto: i64) -> Caja {
        Caja {
            id,
            usuario_id,
            estado,
            monto_inicial: monto,
            monto_final: None,
            fecha_apertura: Utc::now(),
            fecha_cierre: None,
        }
    }

    fn venta(caja_id: i32, metodo: MetodoPago, total: i64, estado: EstadoVenta) -> Venta {
        Venta {
            id: 0,
            caja_id,
            usuario_id: 1,
            metodo_pago: metodo,
            subtotal: total,
            descuento: 0,
            total,
            estado,
            fecha: Utc::now(),
            detalles: vec![],
        }
    }

    #[test]
    fn test_new_register_requires_float() {
        let err = planificar_apertura(None, None, 1, None).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("monto_inicial")));

        assert_eq!(
            planificar_apertura(None, None, 1, Some(30000)).unwrap(),
            PlanApertura::Crear { monto_inicial: 30000 }
        );
    }

    #[test]
    fn test_owner_updates_open_register() {
        let abierta = caja(5, 1, EstadoCaja::Abierta, 20000);
        let plan = planificar_apertura(Some(abierta.clone()), None, 1, Some(25000)).unwrap();
        assert_eq!(
            plan,
            PlanApertura::Propia { caja: abierta, nuevo_monto: Some(25000) }
        );
    }

    #[test]
    fn test_other_user_gets_foreign_plan() {
        let abierta = caja(5, 1, EstadoCaja::Abierta, 20000);
        let plan = planificar_apertura(Some(abierta.clone()), None, 2, Some(1000)).unwrap();
        assert_eq!(plan, PlanApertura::Ajena(abierta));
    }

    #[test]
    fn test_same_day_register_is_reopened_without_float() {
        let anterior = caja(4, 1, EstadoCaja::Cerrada, 20000);
        let plan = planificar_apertura(None, Some(anterior), 1, None).unwrap();
        assert_eq!(plan, PlanApertura::Reabrir { caja_id: 4, nuevo_monto: None });
    }

    #[test]
    fn test_negative_float_rejected() {
        assert!(planificar_apertura(None, None, 1, Some(-1)).is_err());
    }

    #[test]
    fn test_masked_copy_hides_amounts() {
        let mut abierta = caja(5, 1, EstadoCaja::Abierta, 20000);
        abierta.monto_final = Some(1);
        let masked = abierta.clone().visible_para(2, false);
        assert_eq!(masked.monto_inicial, 0);
        assert_eq!(masked.monto_final, None);
        assert_eq!(masked.id, 5);

        assert_eq!(abierta.clone().visible_para(1, false), abierta);
        assert_eq!(abierta.clone().visible_para(2, true), abierta);
    }

    #[test]
    fn test_summary_ignores_cancelled_and_groups_by_method() {
        let c = caja(7, 1, EstadoCaja::Abierta, 50000);
        let ventas = vec![
            venta(7, MetodoPago::Efectivo, 9000, EstadoVenta::Completada),
            venta(7, MetodoPago::Debito, 4500, EstadoVenta::Completada),
            venta(7, MetodoPago::Efectivo, 3000, EstadoVenta::Completada),
            venta(7, MetodoPago::Credito, 8000, EstadoVenta::Anulada),
        ];

        let resumen = resumir(&c, &ventas, &[]);
        assert_eq!(resumen.cantidad_ventas, 3);
        assert_eq!(resumen.cantidad_anuladas, 1);
        assert_eq!(resumen.total_ventas, 16500);
        assert_eq!(
            resumen.por_metodo,
            vec![
                TotalMetodo { metodo_pago: MetodoPago::Efectivo, cantidad: 2, total: 12000 },
                TotalMetodo { metodo_pago: MetodoPago::Debito, cantidad: 1, total: 4500 },
            ]
        );
        assert_eq!(resumen.monto_esperado, 66500);
    }

    #[test]
    fn test_closing_float_is_initial_plus_net_sales_unless_overridden() {
        let c = caja(7, 1, EstadoCaja::Abierta, 50000);
        let ventas = vec![venta(7, MetodoPago::Efectivo, 10000, EstadoVenta::Completada)];
        let devolucion = Devolucion {
            id: 1,
            venta_id: 0,
            caja_id: 7,
            usuario_id: 1,
            motivo: "x".into(),
            monto: 2500,
            reintegra_volumen: false,
            fecha: Utc::now(),
            detalles: vec![],
        };

        let resumen = resumir(&c, &ventas, &[devolucion]);
        assert_eq!(resumen.ventas_netas, 7500);
        assert_eq!(monto_cierre(&resumen, None).unwrap(), 57500);
        assert_eq!(monto_cierre(&resumen, Some(57000)).unwrap(), 57000);
        assert!(monto_cierre(&resumen, Some(-10)).is_err());
    }

    #[test]
    fn test_business_day_window_uses_local_midnight() {
        let offset = FixedOffset::west_opt(3 * 3600).unwrap();
        // 02:00 UTC on the 10th is 23:00 local on the 9th
        let ahora = Utc.with_ymd_and_hms(2024, 5, 10, 2, 0, 0).unwrap();
        let (inicio, fin) = ventana_del_dia(ahora, offset);
        assert_eq!(inicio, Utc.with_ymd_and_hms(2024, 5, 9, 3, 0, 0).unwrap());
        assert_eq!(fin, Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap());
    }
}
