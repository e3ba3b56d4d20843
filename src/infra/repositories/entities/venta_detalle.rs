//! Sale line entity.

use sea_orm::entity::prelude::*;

use crate::domain::VentaDetalle;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "venta_detalle")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub venta_id: i32,
    pub barril_id: Option<i32>,
    pub descripcion: String,
    pub cantidad: i32,
    pub precio_unitario: i64,
    /// Litres per unit
    pub volumen_litros: f64,
    pub subtotal: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for VentaDetalle {
    fn from(model: Model) -> Self {
        VentaDetalle {
            id: model.id,
            venta_id: model.venta_id,
            barril_id: model.barril_id,
            descripcion: model.descripcion,
            cantidad: model.cantidad,
            precio_unitario: model.precio_unitario,
            volumen_litros: model.volumen_litros,
            subtotal: model.subtotal,
        }
    }
}
