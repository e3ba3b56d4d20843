//! Cash-register service tests.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::FixedOffset;
use mockall::predicate::eq;

use brewmaster::domain::caja::{monto_cierre, resumir};
use brewmaster::domain::{Caja, CierreCaja, MetodoPago, ResultadoApertura, Venta};
use brewmaster::errors::AppError;
use brewmaster::infra::repositories::{MockCajaRepository, MockDevolucionRepository, MockVentaRepository};
use brewmaster::services::{CajaManager, CajaService};

use common::{admin, caja_abierta, caja_cerrada, cajero, venta, TestUnitOfWork};

fn chile() -> FixedOffset {
    FixedOffset::west_opt(3 * 3600).unwrap()
}

fn manager(uow: TestUnitOfWork) -> CajaManager<TestUnitOfWork> {
    CajaManager::new(uow.into_arc(), chile())
}

#[tokio::test]
async fn test_open_creates_register_when_none_exists() {
    let mut cajas = MockCajaRepository::new();
    cajas.expect_find_abierta().times(1).returning(|| Ok(None));
    cajas.expect_find_del_dia().returning(|_, _, _| Ok(None));
    cajas
        .expect_create()
        .with(eq(7), eq(50_000))
        .times(1)
        .returning(|usuario_id, monto| Ok(caja_abierta(1, usuario_id, monto)));

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));
    let apertura = service.abrir(&cajero(7), Some(50_000)).await.unwrap();

    assert_eq!(apertura.resultado, ResultadoApertura::Creada);
    assert_eq!(apertura.caja.monto_inicial, 50_000);
}

#[tokio::test]
async fn test_open_new_register_requires_float() {
    let mut cajas = MockCajaRepository::new();
    cajas.expect_find_abierta().returning(|| Ok(None));
    cajas.expect_find_del_dia().returning(|_, _, _| Ok(None));
    cajas.expect_create().never();

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));
    let err = service.abrir(&cajero(7), None).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_open_rejects_negative_float() {
    let service = manager(TestUnitOfWork::new());
    let err = service.abrir(&cajero(7), Some(-1)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_open_by_other_user_returns_masked_register() {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(|| Ok(Some(caja_abierta(3, 2, 80_000))));
    cajas.expect_create().never();
    cajas.expect_update_monto_inicial().never();

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));
    let apertura = service.abrir(&cajero(7), Some(10_000)).await.unwrap();

    assert_eq!(apertura.resultado, ResultadoApertura::Ajena);
    assert_eq!(apertura.caja.id, 3);
    assert_eq!(apertura.caja.monto_inicial, 0);
    assert_eq!(apertura.caja.monto_final, None);
}

#[tokio::test]
async fn test_owner_reopen_updates_float() {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(|| Ok(Some(caja_abierta(3, 7, 80_000))));
    cajas
        .expect_update_monto_inicial()
        .with(eq(3), eq(60_000))
        .times(1)
        .returning(|id, monto| Ok(caja_abierta(id, 7, monto)));

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));
    let apertura = service.abrir(&cajero(7), Some(60_000)).await.unwrap();

    assert_eq!(apertura.resultado, ResultadoApertura::Actualizada);
    assert_eq!(apertura.caja.monto_inicial, 60_000);
}

#[tokio::test]
async fn test_owner_without_float_gets_existing_register() {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(|| Ok(Some(caja_abierta(3, 7, 80_000))));

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));
    let apertura = service.abrir(&cajero(7), None).await.unwrap();

    assert_eq!(apertura.resultado, ResultadoApertura::Existente);
    assert_eq!(apertura.caja.monto_inicial, 80_000);
}

#[tokio::test]
async fn test_same_day_register_is_reopened() {
    let mut cajas = MockCajaRepository::new();
    cajas.expect_find_abierta().returning(|| Ok(None));
    cajas
        .expect_find_del_dia()
        .withf(|usuario_id, desde, hasta| *usuario_id == 7 && desde < hasta)
        .returning(|_, _, _| Ok(Some(caja_cerrada(4, 7, 30_000))));
    cajas
        .expect_reabrir()
        .with(eq(4), eq(None))
        .times(1)
        .returning(|id, _| Ok(caja_abierta(id, 7, 30_000)));
    cajas.expect_create().never();

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));
    let apertura = service.abrir(&cajero(7), None).await.unwrap();

    assert_eq!(apertura.resultado, ResultadoApertura::Reabierta);
    assert_eq!(apertura.caja.id, 4);
    assert!(apertura.caja.is_abierta());
}

/// What the store answers for a close of `caja` holding `ventas`.
fn cierre(caja: Caja, ventas: Vec<Venta>, monto_final: Option<i64>) -> CierreCaja {
    let resumen = resumir(&caja, &ventas, &[]);
    let mut cerrada = caja_cerrada(caja.id, caja.usuario_id, caja.monto_inicial);
    cerrada.monto_final = Some(monto_cierre(&resumen, monto_final).unwrap());
    CierreCaja { caja: cerrada, resumen }
}

#[tokio::test]
async fn test_close_defaults_to_expected_amount() {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(|| Ok(Some(caja_abierta(1, 7, 50_000))));
    cajas
        .expect_cerrar()
        .with(eq(1), eq(None), eq(7))
        .times(1)
        .returning(|id, monto, _| {
            Ok(cierre(
                caja_abierta(id, 7, 50_000),
                vec![venta(1, id, 7, MetodoPago::Efectivo, 2)],
                monto,
            ))
        });

    // The summary is built by the store under the register lock
    let mut ventas = MockVentaRepository::new();
    ventas.expect_list_by_caja().never();
    let mut devoluciones = MockDevolucionRepository::new();
    devoluciones.expect_list_by_caja().never();

    let uow = TestUnitOfWork::new()
        .with_cajas(cajas)
        .with_ventas(ventas)
        .with_devoluciones(devoluciones);
    let cierre = manager(uow).cerrar(&cajero(7), None).await.unwrap();

    assert_eq!(cierre.caja.monto_final, Some(59_000));
    assert_eq!(cierre.resumen.total_ventas, 9_000);
    assert_eq!(cierre.resumen.monto_esperado, 59_000);
}

#[tokio::test]
async fn test_close_forwards_counted_amount() {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(|| Ok(Some(caja_abierta(1, 7, 50_000))));
    cajas
        .expect_cerrar()
        .with(eq(1), eq(Some(58_500)), eq(2))
        .times(1)
        .returning(|id, monto, _| {
            Ok(cierre(
                caja_abierta(id, 7, 50_000),
                vec![venta(1, id, 7, MetodoPago::Debito, 2)],
                monto,
            ))
        });

    let uow = TestUnitOfWork::new().with_cajas(cajas);
    let cierre = manager(uow).cerrar(&admin(2), Some(58_500)).await.unwrap();

    assert_eq!(cierre.caja.monto_final, Some(58_500));
    assert_eq!(cierre.resumen.monto_esperado, 59_000);
}

#[tokio::test]
async fn test_close_rejects_negative_count_before_locking() {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(|| Ok(Some(caja_abierta(1, 7, 50_000))));
    cajas.expect_cerrar().never();

    let err = manager(TestUnitOfWork::new().with_cajas(cajas))
        .cerrar(&cajero(7), Some(-1))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

/// `find_abierta` answers `None` first, then `segunda`.
fn abierta_tras_carrera(cajas: &mut MockCajaRepository, segunda: Option<Caja>) {
    let llamadas = AtomicUsize::new(0);
    cajas.expect_find_abierta().times(2).returning(move || {
        if llamadas.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(None)
        } else {
            Ok(segunda.clone())
        }
    });
}

#[tokio::test]
async fn test_lost_create_race_resolves_to_owner_branch() {
    let mut cajas = MockCajaRepository::new();
    abierta_tras_carrera(&mut cajas, Some(caja_abierta(5, 7, 20_000)));
    cajas.expect_find_del_dia().returning(|_, _, _| Ok(None));
    cajas
        .expect_create()
        .times(1)
        .returning(|_, _| Err(AppError::RegisterAlreadyOpen));
    cajas
        .expect_update_monto_inicial()
        .with(eq(5), eq(30_000))
        .times(1)
        .returning(|id, monto| Ok(caja_abierta(id, 7, monto)));

    let apertura = manager(TestUnitOfWork::new().with_cajas(cajas))
        .abrir(&cajero(7), Some(30_000))
        .await
        .unwrap();

    assert_eq!(apertura.resultado, ResultadoApertura::Actualizada);
    assert_eq!(apertura.caja.id, 5);
    assert_eq!(apertura.caja.monto_inicial, 30_000);
}

#[tokio::test]
async fn test_lost_reopen_race_resolves_to_masked_branch() {
    let mut cajas = MockCajaRepository::new();
    abierta_tras_carrera(&mut cajas, Some(caja_abierta(6, 2, 40_000)));
    cajas
        .expect_find_del_dia()
        .returning(|_, _, _| Ok(Some(caja_cerrada(4, 7, 30_000))));
    cajas
        .expect_reabrir()
        .times(1)
        .returning(|_, _| Err(AppError::RegisterAlreadyOpen));
    cajas.expect_update_monto_inicial().never();

    let apertura = manager(TestUnitOfWork::new().with_cajas(cajas))
        .abrir(&cajero(7), None)
        .await
        .unwrap();

    assert_eq!(apertura.resultado, ResultadoApertura::Ajena);
    assert_eq!(apertura.caja.id, 6);
    assert_eq!(apertura.caja.monto_inicial, 0);
}

#[tokio::test]
async fn test_lost_race_without_open_register_is_conflict() {
    let mut cajas = MockCajaRepository::new();
    abierta_tras_carrera(&mut cajas, None);
    cajas.expect_find_del_dia().returning(|_, _, _| Ok(None));
    cajas
        .expect_create()
        .times(1)
        .returning(|_, _| Err(AppError::RegisterAlreadyOpen));

    let err = manager(TestUnitOfWork::new().with_cajas(cajas))
        .abrir(&cajero(7), Some(30_000))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(msg) if msg.contains("cambió de estado")));
}

#[tokio::test]
async fn test_close_by_other_cashier_is_forbidden() {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(|| Ok(Some(caja_abierta(1, 7, 50_000))));
    cajas.expect_cerrar().never();

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));
    let err = service.cerrar(&cajero(8), None).await.unwrap_err();

    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_close_without_open_register_is_not_found() {
    let mut cajas = MockCajaRepository::new();
    cajas.expect_find_abierta().returning(|| Ok(None));

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));
    let err = service.cerrar(&cajero(7), None).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_current_register_visibility() {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(|| Ok(Some(caja_abierta(1, 7, 50_000))));

    let service = manager(TestUnitOfWork::new().with_cajas(cajas));

    let ajena = service.actual(&cajero(8)).await.unwrap().unwrap();
    assert_eq!(ajena.monto_inicial, 0);

    let propia = service.actual(&cajero(7)).await.unwrap().unwrap();
    assert_eq!(propia.monto_inicial, 50_000);

    let vista_admin = service.actual(&admin(1)).await.unwrap().unwrap();
    assert_eq!(vista_admin.monto_inicial, 50_000);
}
