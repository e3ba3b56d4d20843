//! Return repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

use super::base::reintegrar_volumen;
use super::entities::{devolucion, devolucion_detalle, venta, venta_detalle};
use crate::domain::{
    Devolucion, DevolucionDetalle, EstadoVenta, NuevaDevolucion, NuevoMovimiento, TipoMovimiento,
};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Return repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DevolucionRepository: Send + Sync {
    /// Insert a computed return, re-checking quantities under a sale lock
    async fn create(&self, nueva: NuevaDevolucion) -> AppResult<Devolucion>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Devolucion>>;

    /// Returns, newest first, optionally for one sale
    async fn list(&self, venta_id: Option<i32>) -> AppResult<Vec<Devolucion>>;

    /// Returns booked against a register
    async fn list_by_caja(&self, caja_id: i32) -> AppResult<Vec<Devolucion>>;

    /// Returns dated within `[desde, hasta)`
    async fn list_between(&self, desde: DateTime<Utc>, hasta: DateTime<Utc>) -> AppResult<Vec<Devolucion>>;
}

/// Concrete implementation of DevolucionRepository
pub struct DevolucionStore {
    db: DatabaseConnection,
}

impl DevolucionStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, query: sea_orm::Select<devolucion::Entity>) -> AppResult<Vec<Devolucion>> {
        let headers = query.all(&self.db).await?;
        with_detalles(&self.db, headers).await
    }
}

/// Every return booked against a register, oldest first, with lines.
pub(crate) async fn devoluciones_de_caja<C: ConnectionTrait>(
    conn: &C,
    caja_id: i32,
) -> AppResult<Vec<Devolucion>> {
    let headers = devolucion::Entity::find()
        .filter(devolucion::Column::CajaId.eq(caja_id))
        .order_by_asc(devolucion::Column::Fecha)
        .all(conn)
        .await?;
    with_detalles(conn, headers).await
}

async fn with_detalles<C: ConnectionTrait>(
    conn: &C,
    headers: Vec<devolucion::Model>,
) -> AppResult<Vec<Devolucion>> {
    if headers.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<i32> = headers.iter().map(|d| d.id).collect();
    let mut por_devolucion: HashMap<i32, Vec<DevolucionDetalle>> = HashMap::new();
    for detalle in devolucion_detalle::Entity::find()
        .filter(devolucion_detalle::Column::DevolucionId.is_in(ids))
        .order_by_asc(devolucion_detalle::Column::Id)
        .all(conn)
        .await?
    {
        por_devolucion
            .entry(detalle.devolucion_id)
            .or_default()
            .push(DevolucionDetalle::from(detalle));
    }

    Ok(headers
        .into_iter()
        .map(|d| {
            let detalles = por_devolucion.remove(&d.id).unwrap_or_default();
            d.into_domain(detalles)
        })
        .collect())
}

/// Units already returned per sale line of `venta_id`.
async fn devuelto_por_detalle<C: ConnectionTrait>(conn: &C, venta_id: i32) -> AppResult<HashMap<i32, i32>> {
    let previas = devolucion::Entity::find()
        .filter(devolucion::Column::VentaId.eq(venta_id))
        .all(conn)
        .await?;
    let previas = with_detalles(conn, previas).await?;
    Ok(crate::domain::devolucion::unidades_devueltas(&previas))
}

#[async_trait]
impl DevolucionRepository for DevolucionStore {
    async fn create(&self, nueva: NuevaDevolucion) -> AppResult<Devolucion> {
        let txn = self.db.begin().await?;

        let header = venta::Entity::find_by_id(nueva.venta_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_not_found("Venta")?;
        if header.estado != EstadoVenta::Completada.as_str() {
            return Err(AppError::conflict("Solo se pueden devolver ventas completadas"));
        }

        // Another return may have landed since the service computed this one
        let vendidos: HashMap<i32, i32> = venta_detalle::Entity::find()
            .filter(venta_detalle::Column::VentaId.eq(nueva.venta_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|d| (d.id, d.cantidad))
            .collect();
        let devuelto = devuelto_por_detalle(&txn, nueva.venta_id).await?;
        for linea in &nueva.lineas {
            let vendido = vendidos
                .get(&linea.venta_detalle_id)
                .copied()
                .ok_or_not_found("Detalle de venta")?;
            let previo = devuelto.get(&linea.venta_detalle_id).copied().unwrap_or(0);
            if previo + linea.cantidad > vendido {
                return Err(AppError::validation(format!(
                    "Solo quedan {} unidades por devolver del detalle {}",
                    (vendido - previo).max(0),
                    linea.venta_detalle_id
                )));
            }
        }

        let model = devolucion::ActiveModel {
            venta_id: Set(nueva.venta_id),
            caja_id: Set(nueva.caja_id),
            usuario_id: Set(nueva.usuario_id),
            motivo: Set(nueva.motivo),
            monto: Set(nueva.monto),
            reintegra_volumen: Set(nueva.reintegra_volumen),
            fecha: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut detalles = Vec::with_capacity(nueva.lineas.len());
        for linea in &nueva.lineas {
            let detalle = devolucion_detalle::ActiveModel {
                devolucion_id: Set(model.id),
                venta_detalle_id: Set(linea.venta_detalle_id),
                cantidad: Set(linea.cantidad),
                monto: Set(linea.monto),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            detalles.push(DevolucionDetalle::from(detalle));
        }

        for (barril_id, litros) in nueva.reintegros {
            reintegrar_volumen(
                &txn,
                barril_id,
                litros,
                NuevoMovimiento::new(barril_id, TipoMovimiento::Devolucion, Some(nueva.usuario_id))
                    .with_detalle(format!("Devolución #{} de venta #{}", model.id, nueva.venta_id)),
            )
            .await?;
        }

        txn.commit().await?;
        Ok(model.into_domain(detalles))
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Devolucion>> {
        let Some(header) = devolucion::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        Ok(with_detalles(&self.db, vec![header]).await?.pop())
    }

    async fn list(&self, venta_id: Option<i32>) -> AppResult<Vec<Devolucion>> {
        let mut query = devolucion::Entity::find().order_by_desc(devolucion::Column::Fecha);
        if let Some(venta_id) = venta_id {
            query = query.filter(devolucion::Column::VentaId.eq(venta_id));
        }
        self.load(query).await
    }

    async fn list_by_caja(&self, caja_id: i32) -> AppResult<Vec<Devolucion>> {
        devoluciones_de_caja(&self.db, caja_id).await
    }

    async fn list_between(&self, desde: DateTime<Utc>, hasta: DateTime<Utc>) -> AppResult<Vec<Devolucion>> {
        self.load(
            devolucion::Entity::find()
                .filter(devolucion::Column::Fecha.gte(desde))
                .filter(devolucion::Column::Fecha.lt(hasta))
                .order_by_asc(devolucion::Column::Fecha),
        )
        .await
    }
}
