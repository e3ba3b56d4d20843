//! Barrel inventory, QR lookup and QR rendering.

use async_trait::async_trait;
use qrcode::{render::svg, EcLevel, QrCode};
use std::sync::Arc;

use crate::domain::{
    Actor, Barril, CambiosBarril, EstadoBarril, FiltroBarriles, FiltroMovimientos, Movimiento,
    NuevoBarril,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

/// Pixels per QR module in rendered images
const QR_MODULE_PIXELS: u32 = 8;

#[async_trait]
pub trait BarrilService: Send + Sync {
    async fn list(&self, filtro: FiltroBarriles) -> AppResult<Vec<Barril>>;

    async fn get(&self, id: i32) -> AppResult<Barril>;

    /// QR lookup: active barrel carrying `codigo`
    async fn por_codigo(&self, codigo: &str) -> AppResult<Barril>;

    async fn create(&self, actor: &Actor, nuevo: NuevoBarril) -> AppResult<Barril>;

    async fn update(&self, actor: &Actor, id: i32, cambios: CambiosBarril) -> AppResult<Barril>;

    async fn cambiar_estado(
        &self,
        actor: &Actor,
        id: i32,
        estado: EstadoBarril,
        detalle: Option<String>,
    ) -> AppResult<Barril>;

    async fn trasladar(
        &self,
        actor: &Actor,
        id: i32,
        bodega_id: i32,
        detalle: Option<String>,
    ) -> AppResult<Barril>;

    async fn deactivate(&self, id: i32) -> AppResult<()>;

    /// SVG image of the barrel's QR code
    async fn qr_svg(&self, id: i32) -> AppResult<String>;

    async fn movimientos(&self, id: i32, pagina: PaginationParams) -> AppResult<(Vec<Movimiento>, u64)>;
}

pub struct BarrilManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> BarrilManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Destination warehouses must exist and be active.
    async fn validar_bodega(&self, bodega_id: i32) -> AppResult<()> {
        match self.uow.bodegas().find_by_id(bodega_id).await? {
            Some(bodega) if bodega.activo => Ok(()),
            Some(_) => Err(AppError::validation("La bodega está desactivada")),
            None => Err(AppError::validation(format!("La bodega {} no existe", bodega_id))),
        }
    }
}

/// Render `codigo` as an SVG QR code.
pub fn render_qr(codigo: &str) -> AppResult<String> {
    let qr = QrCode::with_error_correction_level(codigo.as_bytes(), EcLevel::M)
        .map_err(|e| AppError::internal(format!("QR encoding failed: {}", e)))?;
    Ok(qr
        .render::<svg::Color>()
        .module_dimensions(QR_MODULE_PIXELS, QR_MODULE_PIXELS)
        .build())
}

#[async_trait]
impl<U: UnitOfWork> BarrilService for BarrilManager<U> {
    async fn list(&self, filtro: FiltroBarriles) -> AppResult<Vec<Barril>> {
        self.uow.barriles().list(filtro).await
    }

    async fn get(&self, id: i32) -> AppResult<Barril> {
        self.uow.barriles().find_by_id(id).await?.ok_or_not_found("Barril")
    }

    async fn por_codigo(&self, codigo: &str) -> AppResult<Barril> {
        let codigo = codigo.trim();
        match self.uow.barriles().find_by_codigo(codigo).await? {
            Some(barril) if barril.activo => Ok(barril),
            _ => {
                tracing::debug!("QR lookup miss for {}", codigo);
                Err(AppError::not_found("Barril"))
            }
        }
    }

    async fn create(&self, actor: &Actor, nuevo: NuevoBarril) -> AppResult<Barril> {
        if nuevo.tipo_cerveza.is_empty() {
            return Err(AppError::validation("El tipo de cerveza es obligatorio"));
        }
        if let Some(bodega_id) = nuevo.bodega_id {
            self.validar_bodega(bodega_id).await?;
        }

        let barril = self.uow.barriles().create(nuevo, actor.id).await?;
        tracing::info!("Barrel {} ({}) created by {}", barril.id, barril.codigo, actor.id);
        Ok(barril)
    }

    async fn update(&self, actor: &Actor, id: i32, cambios: CambiosBarril) -> AppResult<Barril> {
        if cambios.tipo_cerveza.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(AppError::validation("El tipo de cerveza es obligatorio"));
        }
        self.uow.barriles().update(id, cambios, actor.id).await
    }

    async fn cambiar_estado(
        &self,
        actor: &Actor,
        id: i32,
        estado: EstadoBarril,
        detalle: Option<String>,
    ) -> AppResult<Barril> {
        self.uow.barriles().cambiar_estado(id, estado, actor.id, detalle).await
    }

    async fn trasladar(
        &self,
        actor: &Actor,
        id: i32,
        bodega_id: i32,
        detalle: Option<String>,
    ) -> AppResult<Barril> {
        self.validar_bodega(bodega_id).await?;
        self.uow.barriles().trasladar(id, bodega_id, actor.id, detalle).await
    }

    async fn deactivate(&self, id: i32) -> AppResult<()> {
        self.uow.barriles().deactivate(id).await
    }

    async fn qr_svg(&self, id: i32) -> AppResult<String> {
        let barril = self.get(id).await?;
        render_qr(&barril.codigo)
    }

    async fn movimientos(&self, id: i32, pagina: PaginationParams) -> AppResult<(Vec<Movimiento>, u64)> {
        self.get(id).await?;
        self.uow
            .movimientos()
            .list(
                FiltroMovimientos {
                    barril_id: Some(id),
                    ..Default::default()
                },
                pagina,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_is_svg() {
        let svg = render_qr("BRL-1A2B3C4D").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
