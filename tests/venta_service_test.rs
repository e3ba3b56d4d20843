//! Sale and return service tests.

mod common;

use chrono::{Duration, Utc};
use mockall::predicate::eq;

use brewmaster::domain::{
    Devolucion, DevolucionDetalle, EstadoVenta, FiltroVentas, LineaDevolucion, LineaVenta,
    MetodoPago,
};
use brewmaster::errors::AppError;
use brewmaster::infra::repositories::{MockCajaRepository, MockDevolucionRepository, MockVentaRepository};
use brewmaster::services::{
    DatosDevolucion, DatosVenta, DevolucionManager, DevolucionService, VentaManager, VentaService,
};
use brewmaster::types::PaginationParams;

use common::{admin, caja_abierta, cajero, venta, TestUnitOfWork};

fn schop(cantidad: i32) -> LineaVenta {
    LineaVenta {
        barril_id: Some(1),
        descripcion: "Schop IPA 500cc".to_string(),
        cantidad,
        precio_unitario: 4500,
        volumen_litros: 0.5,
    }
}

fn datos_venta(descuento_porcentaje: Option<u8>) -> DatosVenta {
    DatosVenta {
        metodo_pago: MetodoPago::Efectivo,
        descuento: None,
        descuento_porcentaje,
        lineas: vec![schop(2)],
    }
}

fn cajas_con_abierta(usuario_id: i32) -> MockCajaRepository {
    let mut cajas = MockCajaRepository::new();
    cajas
        .expect_find_abierta()
        .returning(move || Ok(Some(caja_abierta(1, usuario_id, 50_000))));
    cajas
}

#[tokio::test]
async fn test_sale_applies_percentage_discount() {
    let mut ventas = MockVentaRepository::new();
    ventas
        .expect_create()
        .withf(|nueva| {
            nueva.caja_id == 1
                && nueva.usuario_id == 7
                && nueva.totales.subtotal == 9_000
                && nueva.totales.descuento == 900
                && nueva.totales.total == 8_100
        })
        .times(1)
        .returning(|nueva| {
            let mut v = venta(5, nueva.caja_id, nueva.usuario_id, nueva.metodo_pago, 2);
            v.descuento = nueva.totales.descuento;
            v.total = nueva.totales.total;
            Ok(v)
        });

    let uow = TestUnitOfWork::new()
        .with_cajas(cajas_con_abierta(7))
        .with_ventas(ventas);
    let venta = VentaManager::new(uow.into_arc())
        .create(&cajero(7), datos_venta(Some(10)))
        .await
        .unwrap();

    assert_eq!(venta.total, 8_100);
}

#[tokio::test]
async fn test_sale_without_open_register_is_rejected() {
    let mut cajas = MockCajaRepository::new();
    cajas.expect_find_abierta().returning(|| Ok(None));
    let mut ventas = MockVentaRepository::new();
    ventas.expect_create().never();

    let uow = TestUnitOfWork::new().with_cajas(cajas).with_ventas(ventas);
    let err = VentaManager::new(uow.into_arc())
        .create(&cajero(7), datos_venta(None))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_sale_on_someone_elses_register_is_forbidden() {
    let uow = TestUnitOfWork::new().with_cajas(cajas_con_abierta(2));
    let err = VentaManager::new(uow.into_arc())
        .create(&cajero(7), datos_venta(None))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden));
}

#[tokio::test]
async fn test_sale_rejects_both_discount_kinds() {
    let datos = DatosVenta {
        descuento: Some(500),
        ..datos_venta(Some(10))
    };
    let uow = TestUnitOfWork::new().with_cajas(cajas_con_abierta(7));
    let err = VentaManager::new(uow.into_arc())
        .create(&cajero(7), datos)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_list_rejects_inverted_range() {
    let filtro = FiltroVentas {
        desde: Some(Utc::now()),
        hasta: Some(Utc::now() - Duration::days(1)),
        ..Default::default()
    };
    let err = VentaManager::new(TestUnitOfWork::new().into_arc())
        .list(filtro, PaginationParams::default())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_only_seller_or_admin_cancels() {
    let mut ventas = MockVentaRepository::new();
    ventas
        .expect_find_by_id()
        .returning(|id| Ok(Some(venta(id, 1, 7, MetodoPago::Credito, 1))));
    ventas
        .expect_anular()
        .with(eq(5), eq(1))
        .times(1)
        .returning(|id, _| {
            let mut v = venta(id, 1, 7, MetodoPago::Credito, 1);
            v.estado = EstadoVenta::Anulada;
            Ok(v)
        });

    let service = VentaManager::new(TestUnitOfWork::new().with_ventas(ventas).into_arc());

    let err = service.anular(&cajero(8), 5).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let anulada = service.anular(&admin(1), 5).await.unwrap();
    assert!(anulada.is_anulada());
}

fn devolucion_previa(venta_id: i32, venta_detalle_id: i32, cantidad: i32) -> Devolucion {
    Devolucion {
        id: 1,
        venta_id,
        caja_id: 1,
        usuario_id: 7,
        motivo: "Espuma".to_string(),
        monto: 4_500 * i64::from(cantidad),
        reintegra_volumen: false,
        fecha: Utc::now(),
        detalles: vec![DevolucionDetalle {
            id: 1,
            devolucion_id: 1,
            venta_detalle_id,
            cantidad,
            monto: 4_500 * i64::from(cantidad),
        }],
    }
}

#[tokio::test]
async fn test_partial_return_books_refund_to_sale_register() {
    let mut ventas = MockVentaRepository::new();
    ventas
        .expect_find_by_id()
        .with(eq(5))
        .returning(|id| Ok(Some(venta(id, 3, 7, MetodoPago::Efectivo, 3))));

    let mut devoluciones = MockDevolucionRepository::new();
    devoluciones
        .expect_list()
        .with(eq(Some(5)))
        .returning(|_| Ok(vec![devolucion_previa(5, 50, 1)]));
    devoluciones
        .expect_create()
        .withf(|nueva| {
            nueva.caja_id == 3
                && nueva.monto == 4_500
                && nueva.reintegros.get(&1).copied() == Some(0.5)
        })
        .times(1)
        .returning(|nueva| {
            let mut d = devolucion_previa(nueva.venta_id, 50, 1);
            d.id = 2;
            d.caja_id = nueva.caja_id;
            d.monto = nueva.monto;
            Ok(d)
        });

    let uow = TestUnitOfWork::new()
        .with_ventas(ventas)
        .with_devoluciones(devoluciones);
    let devolucion = DevolucionManager::new(uow.into_arc())
        .create(
            &cajero(7),
            DatosDevolucion {
                venta_id: 5,
                motivo: "Cerveza caliente".to_string(),
                reintegrar_volumen: true,
                lineas: vec![LineaDevolucion {
                    venta_detalle_id: 50,
                    cantidad: 1,
                }],
            },
        )
        .await
        .unwrap();

    assert_eq!(devolucion.caja_id, 3);
    assert_eq!(devolucion.monto, 4_500);
}

#[tokio::test]
async fn test_return_above_remaining_units_is_rejected() {
    let mut ventas = MockVentaRepository::new();
    ventas
        .expect_find_by_id()
        .returning(|id| Ok(Some(venta(id, 3, 7, MetodoPago::Efectivo, 2))));

    let mut devoluciones = MockDevolucionRepository::new();
    devoluciones
        .expect_list()
        .returning(|_| Ok(vec![devolucion_previa(5, 50, 1)]));
    devoluciones.expect_create().never();

    let uow = TestUnitOfWork::new()
        .with_ventas(ventas)
        .with_devoluciones(devoluciones);
    let err = DevolucionManager::new(uow.into_arc())
        .create(
            &cajero(7),
            DatosDevolucion {
                venta_id: 5,
                motivo: "Error de digitación".to_string(),
                reintegrar_volumen: false,
                lineas: vec![LineaDevolucion {
                    venta_detalle_id: 50,
                    cantidad: 2,
                }],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}
