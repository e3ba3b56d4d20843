//! Shared repository helpers.
//!
//! Pagination plus the barrel bookkeeping several stores perform inside
//! their own transactions: locking a barrel row, writing a movement and its
//! before/after snapshot, and resolving the active register assignment.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QuerySelect, Select, Set,
};

use super::entities::{auditoria_movimiento, barril, caja_barril, movimiento};
use crate::domain::{Barril, CambioBarril, EstadoBarril, NuevoMovimiento};
use crate::errors::{AppResult, OptionExt};
use crate::types::PaginationParams;

/// Fetch one page of `select` plus the total row count.
pub(crate) async fn fetch_page<E>(
    select: Select<E>,
    db: &DatabaseConnection,
    params: &PaginationParams,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Sync,
{
    let paginator = select.paginate(db, params.limit());
    let total = paginator.num_items().await?;
    let data = paginator.fetch_page(params.page.saturating_sub(1)).await?;
    Ok((data, total))
}

/// Load a barrel with `FOR UPDATE`, converting it to the domain type.
pub(crate) async fn lock_barril<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<(barril::Model, Barril)> {
    let model = barril::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_not_found("Barril")?;
    let domain = Barril::try_from(model.clone())?;
    Ok((model, domain))
}

/// Persist new volume and state of a barrel.
pub(crate) async fn update_barril<C: ConnectionTrait>(
    conn: &C,
    model: barril::Model,
    volumen: f64,
    estado: EstadoBarril,
) -> AppResult<Barril> {
    let mut active: barril::ActiveModel = model.into();
    active.volumen_restante = Set(volumen);
    active.estado = Set(estado.as_str().to_string());
    active.actualizado_en = Set(Utc::now());
    let updated = active.update(conn).await?;
    Barril::try_from(updated)
}

/// Insert a movement row.
pub(crate) async fn insert_movimiento<C: ConnectionTrait>(
    conn: &C,
    nuevo: NuevoMovimiento,
) -> AppResult<movimiento::Model> {
    let model = movimiento::ActiveModel {
        barril_id: Set(nuevo.barril_id),
        usuario_id: Set(nuevo.usuario_id),
        tipo: Set(nuevo.tipo.as_str().to_string()),
        bodega_origen_id: Set(nuevo.bodega_origen_id),
        bodega_destino_id: Set(nuevo.bodega_destino_id),
        volumen_litros: Set(nuevo.volumen_litros),
        detalle: Set(nuevo.detalle),
        fecha: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(model)
}

/// Insert a movement together with its `auditoria_movimientos` snapshot.
pub(crate) async fn insert_movimiento_auditado<C: ConnectionTrait>(
    conn: &C,
    nuevo: NuevoMovimiento,
    cambio: CambioBarril,
) -> AppResult<movimiento::Model> {
    let barril_id = nuevo.barril_id;
    let usuario_id = nuevo.usuario_id;
    let movimiento = insert_movimiento(conn, nuevo).await?;

    auditoria_movimiento::ActiveModel {
        movimiento_id: Set(movimiento.id),
        barril_id: Set(barril_id),
        usuario_id: Set(usuario_id),
        estado_anterior: Set(Some(cambio.estado_anterior.as_str().to_string())),
        estado_nuevo: Set(Some(cambio.estado_nuevo.as_str().to_string())),
        volumen_anterior: Set(Some(cambio.volumen_anterior)),
        volumen_nuevo: Set(Some(cambio.volumen_nuevo)),
        fecha: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(movimiento)
}

/// Active register assignment of a barrel, if any.
pub(crate) async fn asignacion_activa<C: ConnectionTrait>(
    conn: &C,
    barril_id: i32,
) -> AppResult<Option<caja_barril::Model>> {
    Ok(caja_barril::Entity::find()
        .filter(caja_barril::Column::BarrilId.eq(barril_id))
        .filter(caja_barril::Column::LiberadoEn.is_null())
        .one(conn)
        .await?)
}

/// Give `litros` back to a barrel and log the movement.
pub(crate) async fn reintegrar_volumen<C: ConnectionTrait>(
    conn: &C,
    barril_id: i32,
    litros: f64,
    nuevo: NuevoMovimiento,
) -> AppResult<Barril> {
    let (model, actual) = lock_barril(conn, barril_id).await?;
    let asignado = asignacion_activa(conn, barril_id).await?.is_some();
    let (volumen, estado) = actual.tras_reintegro(litros, asignado);
    let barril = update_barril(conn, model, volumen, estado).await?;

    insert_movimiento_auditado(
        conn,
        nuevo.with_volumen(litros),
        CambioBarril {
            estado_anterior: actual.estado,
            estado_nuevo: estado,
            volumen_anterior: actual.volumen_restante,
            volumen_nuevo: volumen,
        },
    )
    .await?;

    Ok(barril)
}

