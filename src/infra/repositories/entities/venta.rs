//! Sale header entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Venta, VentaDetalle};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ventas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub caja_id: i32,
    pub usuario_id: i32,
    pub metodo_pago: String,
    pub subtotal: i64,
    pub descuento: i64,
    pub total: i64,
    pub estado: String,
    pub fecha: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build the domain sale with its already-loaded lines.
    pub fn into_domain(self, detalles: Vec<VentaDetalle>) -> Result<Venta, AppError> {
        Ok(Venta {
            id: self.id,
            caja_id: self.caja_id,
            usuario_id: self.usuario_id,
            metodo_pago: self.metodo_pago.parse()?,
            subtotal: self.subtotal,
            descuento: self.descuento,
            total: self.total,
            estado: self.estado.parse()?,
            fecha: self.fecha,
            detalles,
        })
    }
}
