//! Register repository.
//!
//! Inserts and reopenings are not retried here: a `23505` from
//! `ux_caja_abierta` surfaces as `AppError::RegisterAlreadyOpen` so the
//! caja service can resolve the race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::base::{
    asignacion_activa, fetch_page, insert_movimiento_auditado, lock_barril, update_barril,
};
use super::devolucion_repository::devoluciones_de_caja;
use super::entities::{caja, caja_barril};
use super::venta_repository::ventas_de_caja;
use crate::config::UX_CAJA_ABIERTA;
use crate::domain::caja::{monto_cierre, resumir};
use crate::domain::{
    Barril, Caja, CajaBarril, CambioBarril, CierreCaja, EstadoBarril, EstadoCaja, NuevoMovimiento,
    TipoMovimiento,
};
use crate::errors::{is_unique_violation, AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Register repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CajaRepository: Send + Sync {
    /// The register in `ABIERTA`, if any
    async fn find_abierta(&self) -> AppResult<Option<Caja>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Caja>>;

    /// Latest closed register of `usuario_id` opened within `[desde, hasta)`
    async fn find_del_dia(
        &self,
        usuario_id: i32,
        desde: DateTime<Utc>,
        hasta: DateTime<Utc>,
    ) -> AppResult<Option<Caja>>;

    /// Insert an open register; `RegisterAlreadyOpen` when another one is open
    async fn create(&self, usuario_id: i32, monto_inicial: i64) -> AppResult<Caja>;

    /// Reopen a closed register, clearing its closing fields; `RegisterAlreadyOpen`
    /// when another one is open
    async fn reabrir(&self, id: i32, monto_inicial: Option<i64>) -> AppResult<Caja>;

    async fn update_monto_inicial(&self, id: i32, monto_inicial: i64) -> AppResult<Caja>;

    /// Close an open register and release its barrels.
    ///
    /// The summary is computed under the register lock; `monto_final`
    /// overrides the expected amount.
    async fn cerrar(&self, id: i32, monto_final: Option<i64>, usuario_id: i32) -> AppResult<CierreCaja>;

    /// History, newest first
    async fn list(&self, pagina: PaginationParams) -> AppResult<(Vec<Caja>, u64)>;

    async fn list_by_usuario(&self, usuario_id: i32, limit: u64) -> AppResult<Vec<Caja>>;

    /// Active barrel assignments of a register
    async fn barriles(&self, caja_id: i32) -> AppResult<Vec<CajaBarril>>;

    /// Connect a barrel to an open register (`ASIGNACION`)
    async fn asignar_barril(&self, caja_id: i32, barril_id: i32, usuario_id: i32) -> AppResult<CajaBarril>;

    /// Disconnect a barrel from a register (`LIBERACION`)
    async fn liberar_barril(&self, caja_id: i32, barril_id: i32, usuario_id: i32) -> AppResult<Barril>;
}

/// Concrete implementation of CajaRepository
pub struct CajaStore {
    db: DatabaseConnection,
}

impl CajaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: i32) -> AppResult<caja::Model> {
        caja::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found("Caja")
    }
}

fn caja_abierta_tomada(err: sea_orm::DbErr) -> AppError {
    if is_unique_violation(&err) {
        tracing::debug!("{} rejected register write", UX_CAJA_ABIERTA);
        AppError::RegisterAlreadyOpen
    } else {
        AppError::Database(err)
    }
}

async fn lock_caja<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<(caja::Model, Caja)> {
    let model = caja::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_not_found("Caja")?;
    let domain = Caja::try_from(model.clone())?;
    Ok((model, domain))
}

/// Close an assignment and put the barrel back in stock.
async fn liberar<C: ConnectionTrait>(
    conn: &C,
    asignacion: caja_barril::Model,
    usuario_id: i32,
) -> AppResult<Barril> {
    let barril_id = asignacion.barril_id;
    let caja_id = asignacion.caja_id;

    let mut active: caja_barril::ActiveModel = asignacion.into();
    active.liberado_en = Set(Some(Utc::now()));
    active.update(conn).await?;

    let (model, actual) = lock_barril(conn, barril_id).await?;
    let estado = if actual.estado == EstadoBarril::EnUso {
        actual.estado_tras_liberacion()
    } else {
        actual.estado
    };
    let barril = update_barril(conn, model, actual.volumen_restante, estado).await?;

    insert_movimiento_auditado(
        conn,
        NuevoMovimiento::new(barril_id, TipoMovimiento::Liberacion, Some(usuario_id))
            .with_detalle(format!("Liberado de caja #{}", caja_id)),
        CambioBarril {
            estado_anterior: actual.estado,
            estado_nuevo: estado,
            volumen_anterior: actual.volumen_restante,
            volumen_nuevo: actual.volumen_restante,
        },
    )
    .await?;

    Ok(barril)
}

#[async_trait]
impl CajaRepository for CajaStore {
    async fn find_abierta(&self) -> AppResult<Option<Caja>> {
        caja::Entity::find()
            .filter(caja::Column::Estado.eq(EstadoCaja::Abierta.as_str()))
            .one(&self.db)
            .await?
            .map(Caja::try_from)
            .transpose()
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Caja>> {
        caja::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Caja::try_from)
            .transpose()
    }

    async fn find_del_dia(
        &self,
        usuario_id: i32,
        desde: DateTime<Utc>,
        hasta: DateTime<Utc>,
    ) -> AppResult<Option<Caja>> {
        caja::Entity::find()
            .filter(caja::Column::UsuarioId.eq(usuario_id))
            .filter(caja::Column::Estado.eq(EstadoCaja::Cerrada.as_str()))
            .filter(caja::Column::FechaApertura.gte(desde))
            .filter(caja::Column::FechaApertura.lt(hasta))
            .order_by_desc(caja::Column::FechaApertura)
            .one(&self.db)
            .await?
            .map(Caja::try_from)
            .transpose()
    }

    async fn create(&self, usuario_id: i32, monto_inicial: i64) -> AppResult<Caja> {
        let model = caja::ActiveModel {
            usuario_id: Set(usuario_id),
            estado: Set(EstadoCaja::Abierta.as_str().to_string()),
            monto_inicial: Set(monto_inicial),
            monto_final: Set(None),
            fecha_apertura: Set(Utc::now()),
            fecha_cierre: Set(None),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(caja_abierta_tomada)?;
        Caja::try_from(model)
    }

    async fn reabrir(&self, id: i32, monto_inicial: Option<i64>) -> AppResult<Caja> {
        let mut active: caja::ActiveModel = self.load(id).await?.into();
        active.estado = Set(EstadoCaja::Abierta.as_str().to_string());
        active.monto_final = Set(None);
        active.fecha_cierre = Set(None);
        if let Some(monto) = monto_inicial {
            active.monto_inicial = Set(monto);
        }
        let model = active.update(&self.db).await.map_err(caja_abierta_tomada)?;
        Caja::try_from(model)
    }

    async fn update_monto_inicial(&self, id: i32, monto_inicial: i64) -> AppResult<Caja> {
        let mut active: caja::ActiveModel = self.load(id).await?.into();
        active.monto_inicial = Set(monto_inicial);
        let model = active.update(&self.db).await?;
        Caja::try_from(model)
    }

    async fn cerrar(&self, id: i32, monto_final: Option<i64>, usuario_id: i32) -> AppResult<CierreCaja> {
        let txn = self.db.begin().await?;
        let (model, actual) = lock_caja(&txn, id).await?;
        if !actual.is_abierta() {
            return Err(AppError::conflict("La caja ya está cerrada"));
        }

        // Sales hold the row FOR SHARE, so everything committed is visible here
        let ventas = ventas_de_caja(&txn, id).await?;
        let devoluciones = devoluciones_de_caja(&txn, id).await?;
        let resumen = resumir(&actual, &ventas, &devoluciones);
        let monto_final = monto_cierre(&resumen, monto_final)?;

        let asignaciones = caja_barril::Entity::find()
            .filter(caja_barril::Column::CajaId.eq(id))
            .filter(caja_barril::Column::LiberadoEn.is_null())
            .order_by_asc(caja_barril::Column::BarrilId)
            .all(&txn)
            .await?;
        let liberados = asignaciones.len();
        for asignacion in asignaciones {
            liberar(&txn, asignacion, usuario_id).await?;
        }

        let mut active: caja::ActiveModel = model.into();
        active.estado = Set(EstadoCaja::Cerrada.as_str().to_string());
        active.monto_final = Set(Some(monto_final));
        active.fecha_cierre = Set(Some(Utc::now()));
        let updated = active.update(&txn).await?;

        txn.commit().await?;
        tracing::debug!(caja_id = id, liberados, "Register closed");
        Ok(CierreCaja {
            caja: Caja::try_from(updated)?,
            resumen,
        })
    }

    async fn list(&self, pagina: PaginationParams) -> AppResult<(Vec<Caja>, u64)> {
        let query = caja::Entity::find().order_by_desc(caja::Column::FechaApertura);
        let (models, total) = fetch_page(query, &self.db, &pagina).await?;
        let data = models
            .into_iter()
            .map(Caja::try_from)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((data, total))
    }

    async fn list_by_usuario(&self, usuario_id: i32, limit: u64) -> AppResult<Vec<Caja>> {
        caja::Entity::find()
            .filter(caja::Column::UsuarioId.eq(usuario_id))
            .order_by_desc(caja::Column::FechaApertura)
            .limit(limit)
            .all(&self.db)
            .await?
            .into_iter()
            .map(Caja::try_from)
            .collect()
    }

    async fn barriles(&self, caja_id: i32) -> AppResult<Vec<CajaBarril>> {
        let models = caja_barril::Entity::find()
            .filter(caja_barril::Column::CajaId.eq(caja_id))
            .filter(caja_barril::Column::LiberadoEn.is_null())
            .order_by_asc(caja_barril::Column::AsignadoEn)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(CajaBarril::from).collect())
    }

    async fn asignar_barril(&self, caja_id: i32, barril_id: i32, usuario_id: i32) -> AppResult<CajaBarril> {
        let txn = self.db.begin().await?;
        let (_, caja) = lock_caja(&txn, caja_id).await?;
        if !caja.is_abierta() {
            return Err(AppError::conflict("La caja no está abierta"));
        }

        let (model, actual) = lock_barril(&txn, barril_id).await?;
        actual.validar_asignacion()?;
        if asignacion_activa(&txn, barril_id).await?.is_some() {
            return Err(AppError::conflict("El barril ya está asignado a una caja"));
        }

        let asignacion = caja_barril::ActiveModel {
            caja_id: Set(caja_id),
            barril_id: Set(barril_id),
            asignado_en: Set(Utc::now()),
            liberado_en: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::conflict("El barril ya está asignado a una caja")
            } else {
                AppError::Database(e)
            }
        })?;

        update_barril(&txn, model, actual.volumen_restante, EstadoBarril::EnUso).await?;
        insert_movimiento_auditado(
            &txn,
            NuevoMovimiento::new(barril_id, TipoMovimiento::Asignacion, Some(usuario_id))
                .with_detalle(format!("Asignado a caja #{}", caja_id)),
            CambioBarril {
                estado_anterior: actual.estado,
                estado_nuevo: EstadoBarril::EnUso,
                volumen_anterior: actual.volumen_restante,
                volumen_nuevo: actual.volumen_restante,
            },
        )
        .await?;

        txn.commit().await?;
        Ok(CajaBarril::from(asignacion))
    }

    async fn liberar_barril(&self, caja_id: i32, barril_id: i32, usuario_id: i32) -> AppResult<Barril> {
        let txn = self.db.begin().await?;
        let asignacion = caja_barril::Entity::find()
            .filter(caja_barril::Column::CajaId.eq(caja_id))
            .filter(caja_barril::Column::BarrilId.eq(barril_id))
            .filter(caja_barril::Column::LiberadoEn.is_null())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_not_found("Asignación de barril")?;

        let barril = liberar(&txn, asignacion, usuario_id).await?;
        txn.commit().await?;
        Ok(barril)
    }
}
