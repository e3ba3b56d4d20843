//! Barrel repository.
//!
//! Every write that changes a barrel logs a movement in the same
//! transaction; state and volume changes also get an
//! `auditoria_movimientos` snapshot.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use super::base::{asignacion_activa, insert_movimiento, insert_movimiento_auditado, lock_barril};
use super::entities::barril;
use crate::domain::{
    Barril, CambioBarril, CambiosBarril, EstadoBarril, FiltroBarriles, NuevoBarril, NuevoMovimiento,
    TipoMovimiento,
};
use crate::errors::{map_unique, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Barrel repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BarrilRepository: Send + Sync {
    /// List active barrels matching the filter
    async fn list(&self, filtro: FiltroBarriles) -> AppResult<Vec<Barril>>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Barril>>;

    /// Find by QR code
    async fn find_by_codigo(&self, codigo: &str) -> AppResult<Option<Barril>>;

    /// Insert a barrel and its `CREACION` movement
    async fn create(&self, nuevo: NuevoBarril, usuario_id: i32) -> AppResult<Barril>;

    /// Edit metadata; a volume change logs an `AJUSTE`
    async fn update(&self, id: i32, cambios: CambiosBarril, usuario_id: i32) -> AppResult<Barril>;

    /// Manual state change, logged as `CAMBIO_ESTADO`
    async fn cambiar_estado(
        &self,
        id: i32,
        nuevo: EstadoBarril,
        usuario_id: i32,
        detalle: Option<String>,
    ) -> AppResult<Barril>;

    /// Move to another warehouse, logged as `TRASLADO`
    async fn trasladar(
        &self,
        id: i32,
        bodega_destino_id: i32,
        usuario_id: i32,
        detalle: Option<String>,
    ) -> AppResult<Barril>;

    /// Set `activo = false`
    async fn deactivate(&self, id: i32) -> AppResult<()>;
}

/// Concrete implementation of BarrilRepository
pub struct BarrilStore {
    db: DatabaseConnection,
}

impl BarrilStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BarrilRepository for BarrilStore {
    async fn list(&self, filtro: FiltroBarriles) -> AppResult<Vec<Barril>> {
        let mut query = barril::Entity::find()
            .filter(barril::Column::Activo.eq(true))
            .order_by_asc(barril::Column::Codigo);
        if let Some(estado) = filtro.estado {
            query = query.filter(barril::Column::Estado.eq(estado.as_str()));
        }
        if let Some(bodega_id) = filtro.bodega_id {
            query = query.filter(barril::Column::BodegaId.eq(bodega_id));
        }

        query
            .all(&self.db)
            .await?
            .into_iter()
            .map(Barril::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<Barril>> {
        barril::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Barril::try_from)
            .transpose()
    }

    async fn find_by_codigo(&self, codigo: &str) -> AppResult<Option<Barril>> {
        barril::Entity::find()
            .filter(barril::Column::Codigo.eq(codigo.trim()))
            .one(&self.db)
            .await?
            .map(Barril::try_from)
            .transpose()
    }

    async fn create(&self, nuevo: NuevoBarril, usuario_id: i32) -> AppResult<Barril> {
        let txn = self.db.begin().await?;
        let now = Utc::now();
        let estado = nuevo.estado_inicial();

        let model = barril::ActiveModel {
            codigo: Set(nuevo.codigo),
            tipo_cerveza: Set(nuevo.tipo_cerveza),
            capacidad_litros: Set(nuevo.capacidad_litros),
            volumen_restante: Set(nuevo.volumen_restante),
            estado: Set(estado.as_str().to_string()),
            bodega_id: Set(nuevo.bodega_id),
            ubicacion: Set(nuevo.ubicacion),
            activo: Set(true),
            creado_en: Set(now),
            actualizado_en: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| map_unique(e, "Ya existe un barril con ese código"))?;

        insert_movimiento(
            &txn,
            NuevoMovimiento::new(model.id, TipoMovimiento::Creacion, Some(usuario_id))
                .with_bodegas(None, model.bodega_id)
                .with_volumen(model.volumen_restante),
        )
        .await?;

        txn.commit().await?;
        Barril::try_from(model)
    }

    async fn update(&self, id: i32, cambios: CambiosBarril, usuario_id: i32) -> AppResult<Barril> {
        let txn = self.db.begin().await?;
        let (model, actual) = lock_barril(&txn, id).await?;
        cambios.validar(&actual)?;

        let cambia_volumen = cambios.cambia_volumen(&actual);
        let volumen = cambios.volumen_restante.unwrap_or(actual.volumen_restante);
        let estado = if cambia_volumen {
            let asignado = asignacion_activa(&txn, id).await?.is_some();
            actual.estado_tras_ajuste(volumen, asignado)
        } else {
            actual.estado
        };

        let mut active: barril::ActiveModel = model.into();
        if let Some(tipo) = cambios.tipo_cerveza {
            active.tipo_cerveza = Set(tipo.trim().to_string());
        }
        if let Some(capacidad) = cambios.capacidad_litros {
            active.capacidad_litros = Set(capacidad);
        }
        if cambios.ubicacion.is_some() {
            active.ubicacion = Set(cambios.ubicacion);
        }
        active.volumen_restante = Set(volumen);
        active.estado = Set(estado.as_str().to_string());
        active.actualizado_en = Set(Utc::now());
        let updated = active.update(&txn).await?;

        if cambia_volumen {
            insert_movimiento_auditado(
                &txn,
                NuevoMovimiento::new(id, TipoMovimiento::Ajuste, Some(usuario_id))
                    .with_volumen(volumen - actual.volumen_restante)
                    .with_detalle("Ajuste de volumen"),
                CambioBarril {
                    estado_anterior: actual.estado,
                    estado_nuevo: estado,
                    volumen_anterior: actual.volumen_restante,
                    volumen_nuevo: volumen,
                },
            )
            .await?;
        }

        txn.commit().await?;
        Barril::try_from(updated)
    }

    async fn cambiar_estado(
        &self,
        id: i32,
        nuevo: EstadoBarril,
        usuario_id: i32,
        detalle: Option<String>,
    ) -> AppResult<Barril> {
        let txn = self.db.begin().await?;
        let (model, actual) = lock_barril(&txn, id).await?;
        actual.validar_cambio_estado(nuevo)?;

        let mut active: barril::ActiveModel = model.into();
        active.estado = Set(nuevo.as_str().to_string());
        active.actualizado_en = Set(Utc::now());
        let updated = active.update(&txn).await?;

        let mut movimiento = NuevoMovimiento::new(id, TipoMovimiento::CambioEstado, Some(usuario_id));
        movimiento.detalle =
            Some(detalle.unwrap_or_else(|| format!("{} -> {}", actual.estado, nuevo)));

        insert_movimiento_auditado(
            &txn,
            movimiento,
            CambioBarril {
                estado_anterior: actual.estado,
                estado_nuevo: nuevo,
                volumen_anterior: actual.volumen_restante,
                volumen_nuevo: actual.volumen_restante,
            },
        )
        .await?;

        txn.commit().await?;
        tracing::info!(barril_id = id, from = %actual.estado, to = %nuevo, "Barrel state changed");
        Barril::try_from(updated)
    }

    async fn trasladar(
        &self,
        id: i32,
        bodega_destino_id: i32,
        usuario_id: i32,
        detalle: Option<String>,
    ) -> AppResult<Barril> {
        let txn = self.db.begin().await?;
        let (model, actual) = lock_barril(&txn, id).await?;
        actual.validar_traslado(bodega_destino_id)?;

        let mut active: barril::ActiveModel = model.into();
        active.bodega_id = Set(Some(bodega_destino_id));
        active.actualizado_en = Set(Utc::now());
        let updated = active.update(&txn).await?;

        let mut movimiento = NuevoMovimiento::new(id, TipoMovimiento::Traslado, Some(usuario_id))
            .with_bodegas(actual.bodega_id, Some(bodega_destino_id));
        movimiento.detalle = detalle;
        insert_movimiento(&txn, movimiento).await?;

        txn.commit().await?;
        Barril::try_from(updated)
    }

    async fn deactivate(&self, id: i32) -> AppResult<()> {
        let txn = self.db.begin().await?;
        let (model, actual) = lock_barril(&txn, id).await?;
        actual.validar_baja()?;

        let mut active: barril::ActiveModel = model.into();
        active.activo = Set(false);
        active.actualizado_en = Set(Utc::now());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }
}
