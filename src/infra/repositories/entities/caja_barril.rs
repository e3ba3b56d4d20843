//! Barrel-to-register assignment entity.

use sea_orm::entity::prelude::*;

use crate::domain::CajaBarril;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "caja_barriles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub caja_id: i32,
    pub barril_id: i32,
    pub asignado_en: DateTimeUtc,
    /// NULL while the assignment is active
    pub liberado_en: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for CajaBarril {
    fn from(model: Model) -> Self {
        CajaBarril {
            id: model.id,
            caja_id: model.caja_id,
            barril_id: model.barril_id,
            asignado_en: model.asignado_en,
            liberado_en: model.liberado_en,
        }
    }
}
