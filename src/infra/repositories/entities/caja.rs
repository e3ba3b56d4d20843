//! Cash-register session entity.

use sea_orm::entity::prelude::*;

use crate::domain::Caja;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cajas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub usuario_id: i32,
    pub estado: String,
    pub monto_inicial: i64,
    pub monto_final: Option<i64>,
    pub fecha_apertura: DateTimeUtc,
    pub fecha_cierre: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Caja {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Caja {
            id: model.id,
            usuario_id: model.usuario_id,
            estado: model.estado.parse()?,
            monto_inicial: model.monto_inicial,
            monto_final: model.monto_final,
            fecha_apertura: model.fecha_apertura,
            fecha_cierre: model.fecha_cierre,
        })
    }
}
