//! Return line entity.

use sea_orm::entity::prelude::*;

use crate::domain::DevolucionDetalle;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "devolucion_detalle")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub devolucion_id: i32,
    pub venta_detalle_id: i32,
    pub cantidad: i32,
    pub monto: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for DevolucionDetalle {
    fn from(model: Model) -> Self {
        DevolucionDetalle {
            id: model.id,
            devolucion_id: model.devolucion_id,
            venta_detalle_id: model.venta_detalle_id,
            cantidad: model.cantidad,
            monto: model.monto,
        }
    }
}
