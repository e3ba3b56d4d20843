//! Sale repository.
//!
//! A sale, its lines and the volume it pours are written in one
//! transaction. Barrels are locked in id order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use super::base::{
    asignacion_activa, fetch_page, insert_movimiento_auditado, lock_barril, reintegrar_volumen,
    update_barril,
};
use super::entities::{caja, devolucion, venta, venta_detalle};
use crate::domain::venta::consumo_solicitado;
use crate::domain::{
    CambioBarril, Caja, EstadoVenta, FiltroVentas, NuevaVenta, NuevoMovimiento, TipoMovimiento, Venta,
    VentaDetalle,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Sale repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait VentaRepository: Send + Sync {
    /// Insert a sale with its lines and pour its volume
    async fn create(&self, nueva: NuevaVenta) -> AppResult<Venta>;

    /// Sale with lines
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Venta>>;

    /// Page of sales, newest first
    async fn list(&self, filtro: FiltroVentas, pagina: PaginationParams) -> AppResult<(Vec<Venta>, u64)>;

    /// Every sale of a register, cancelled ones included
    async fn list_by_caja(&self, caja_id: i32) -> AppResult<Vec<Venta>>;

    /// Sales dated within `[desde, hasta)`
    async fn list_between(&self, desde: DateTime<Utc>, hasta: DateTime<Utc>) -> AppResult<Vec<Venta>>;

    async fn list_by_usuario(&self, usuario_id: i32, limit: u64) -> AppResult<Vec<Venta>>;

    /// Cancel a sale and give its volume back
    async fn anular(&self, id: i32, usuario_id: i32) -> AppResult<Venta>;
}

/// Concrete implementation of VentaRepository
pub struct VentaStore {
    db: DatabaseConnection,
}

impl VentaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Attach lines to sale headers, keeping header order.
async fn with_detalles<C: ConnectionTrait>(conn: &C, ventas: Vec<venta::Model>) -> AppResult<Vec<Venta>> {
    if ventas.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = ventas.iter().map(|v| v.id).collect();
    let mut por_venta: HashMap<i32, Vec<VentaDetalle>> = HashMap::new();
    for detalle in venta_detalle::Entity::find()
        .filter(venta_detalle::Column::VentaId.is_in(ids))
        .order_by_asc(venta_detalle::Column::Id)
        .all(conn)
        .await?
    {
        por_venta
            .entry(detalle.venta_id)
            .or_default()
            .push(VentaDetalle::from(detalle));
    }

    ventas
        .into_iter()
        .map(|v| {
            let detalles = por_venta.remove(&v.id).unwrap_or_default();
            v.into_domain(detalles)
        })
        .collect()
}

/// Every sale of a register, oldest first, with lines.
pub(crate) async fn ventas_de_caja<C: ConnectionTrait>(conn: &C, caja_id: i32) -> AppResult<Vec<Venta>> {
    let headers = venta::Entity::find()
        .filter(venta::Column::CajaId.eq(caja_id))
        .order_by_asc(venta::Column::Fecha)
        .all(conn)
        .await?;
    with_detalles(conn, headers).await
}

async fn lock_caja_abierta<C: ConnectionTrait>(conn: &C, caja_id: i32) -> AppResult<Caja> {
    let model = caja::Entity::find_by_id(caja_id)
        .lock_shared()
        .one(conn)
        .await?
        .ok_or_not_found("Caja")?;
    let caja = Caja::try_from(model)?;
    if !caja.is_abierta() {
        return Err(AppError::conflict(format!("La caja #{} está cerrada", caja_id)));
    }
    Ok(caja)
}

#[async_trait]
impl VentaRepository for VentaStore {
    async fn create(&self, nueva: NuevaVenta) -> AppResult<Venta> {
        let txn = self.db.begin().await?;
        lock_caja_abierta(&txn, nueva.caja_id).await?;

        // Check every barrel before writing anything
        let mut barriles = Vec::new();
        for (barril_id, litros) in consumo_solicitado(&nueva.lineas) {
            let (model, actual) = lock_barril(&txn, barril_id).await?;
            actual.validar_consumo(litros)?;
            match asignacion_activa(&txn, barril_id).await? {
                Some(asignacion) if asignacion.caja_id == nueva.caja_id => {}
                _ => {
                    return Err(AppError::validation(format!(
                        "El barril {} no está asignado a la caja #{}",
                        actual.codigo, nueva.caja_id
                    )))
                }
            }
            barriles.push((model, actual, litros));
        }

        let header = venta::ActiveModel {
            caja_id: Set(nueva.caja_id),
            usuario_id: Set(nueva.usuario_id),
            metodo_pago: Set(nueva.metodo_pago.as_str().to_string()),
            subtotal: Set(nueva.totales.subtotal),
            descuento: Set(nueva.totales.descuento),
            total: Set(nueva.totales.total),
            estado: Set(EstadoVenta::Completada.as_str().to_string()),
            fecha: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut detalles = Vec::with_capacity(nueva.lineas.len());
        for linea in &nueva.lineas {
            let detalle = venta_detalle::ActiveModel {
                venta_id: Set(header.id),
                barril_id: Set(linea.barril_id),
                descripcion: Set(linea.descripcion.trim().to_string()),
                cantidad: Set(linea.cantidad),
                precio_unitario: Set(linea.precio_unitario),
                volumen_litros: Set(linea.volumen_litros),
                subtotal: Set(linea.subtotal()?),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            detalles.push(VentaDetalle::from(detalle));
        }

        for (model, actual, litros) in barriles {
            let (volumen, estado) = actual.tras_consumo(litros);
            update_barril(&txn, model, volumen, estado).await?;
            insert_movimiento_auditado(
                &txn,
                NuevoMovimiento::new(actual.id, TipoMovimiento::Venta, Some(nueva.usuario_id))
                    .with_volumen(litros)
                    .with_detalle(format!("Venta #{}", header.id)),
                CambioBarril {
                    estado_anterior: actual.estado,
                    estado_nuevo: estado,
                    volumen_anterior: actual.volumen_restante,
                    volumen_nuevo: volumen,
                },
            )
            .await?;
            if estado != actual.estado {
                tracing::info!(barril_id = actual.id, codigo = %actual.codigo, "Barrel emptied by sale");
            }
        }

        txn.commit().await?;
        header.into_domain(detalles)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Venta>> {
        let Some(header) = venta::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(with_detalles(&self.db, vec![header]).await?.pop())
    }

    async fn list(&self, filtro: FiltroVentas, pagina: PaginationParams) -> AppResult<(Vec<Venta>, u64)> {
        let mut query = venta::Entity::find()
            .order_by_desc(venta::Column::Fecha)
            .order_by_desc(venta::Column::Id);
        if let Some(caja_id) = filtro.caja_id {
            query = query.filter(venta::Column::CajaId.eq(caja_id));
        }
        if let Some(usuario_id) = filtro.usuario_id {
            query = query.filter(venta::Column::UsuarioId.eq(usuario_id));
        }
        if let Some(desde) = filtro.desde {
            query = query.filter(venta::Column::Fecha.gte(desde));
        }
        if let Some(hasta) = filtro.hasta {
            query = query.filter(venta::Column::Fecha.lt(hasta));
        }

        let (headers, total) = fetch_page(query, &self.db, &pagina).await?;
        Ok((with_detalles(&self.db, headers).await?, total))
    }

    async fn list_by_caja(&self, caja_id: i32) -> AppResult<Vec<Venta>> {
        ventas_de_caja(&self.db, caja_id).await
    }

    async fn list_between(&self, desde: DateTime<Utc>, hasta: DateTime<Utc>) -> AppResult<Vec<Venta>> {
        let headers = venta::Entity::find()
            .filter(venta::Column::Fecha.gte(desde))
            .filter(venta::Column::Fecha.lt(hasta))
            .order_by_asc(venta::Column::Fecha)
            .all(&self.db)
            .await?;
        with_detalles(&self.db, headers).await
    }

    async fn list_by_usuario(&self, usuario_id: i32, limit: u64) -> AppResult<Vec<Venta>> {
        let headers = venta::Entity::find()
            .filter(venta::Column::UsuarioId.eq(usuario_id))
            .order_by_desc(venta::Column::Fecha)
            .limit(limit)
            .all(&self.db)
            .await?;
        with_detalles(&self.db, headers).await
    }

    async fn anular(&self, id: i32, usuario_id: i32) -> AppResult<Venta> {
        let txn = self.db.begin().await?;
        let header = venta::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_not_found("Venta")?;
        if header.estado == EstadoVenta::Anulada.as_str() {
            return Err(AppError::conflict("La venta ya está anulada"));
        }
        lock_caja_abierta(&txn, header.caja_id).await?;

        let devoluciones = devolucion::Entity::find()
            .filter(devolucion::Column::VentaId.eq(id))
            .count(&txn)
            .await?;
        if devoluciones > 0 {
            return Err(AppError::conflict(
                "La venta tiene devoluciones registradas y no puede anularse",
            ));
        }

        let venta = with_detalles(&txn, vec![header.clone()])
            .await?
            .pop()
            .ok_or_not_found("Venta")?;
        for (barril_id, litros) in venta.consumo_por_barril() {
            reintegrar_volumen(
                &txn,
                barril_id,
                litros,
                NuevoMovimiento::new(barril_id, TipoMovimiento::Devolucion, Some(usuario_id))
                    .with_detalle(format!("Anulación de venta #{}", id)),
            )
            .await?;
        }

        let mut active: venta::ActiveModel = header.into();
        active.estado = Set(EstadoVenta::Anulada.as_str().to_string());
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        updated.into_domain(venta.detalles)
    }
}
