//! Warehouse entity.

use sea_orm::entity::prelude::*;

use crate::domain::Bodega;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "bodegas")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nombre: String,
    pub ubicacion: Option<String>,
    pub capacidad: Option<i32>,
    pub activo: bool,
    pub creado_en: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Bodega {
    fn from(model: Model) -> Self {
        Bodega {
            id: model.id,
            nombre: model.nombre,
            ubicacion: model.ubicacion,
            capacidad: model.capacidad,
            activo: model.activo,
            creado_en: model.creado_en,
        }
    }
}
