//! Inventory movement entity.

use sea_orm::entity::prelude::*;

use crate::domain::Movimiento;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movimientos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub barril_id: i32,
    pub usuario_id: Option<i32>,
    pub tipo: String,
    pub bodega_origen_id: Option<i32>,
    pub bodega_destino_id: Option<i32>,
    pub volumen_litros: Option<f64>,
    pub detalle: Option<String>,
    pub fecha: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Movimiento {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Movimiento {
            id: model.id,
            barril_id: model.barril_id,
            usuario_id: model.usuario_id,
            tipo: model.tipo.parse()?,
            bodega_origen_id: model.bodega_origen_id,
            bodega_destino_id: model.bodega_destino_id,
            volumen_litros: model.volumen_litros,
            detalle: model.detalle,
            fecha: model.fecha,
        })
    }
}
