//! Barrel entity.

use sea_orm::entity::prelude::*;

use crate::domain::Barril;
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "barriles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub codigo: String,
    pub tipo_cerveza: String,
    pub capacidad_litros: f64,
    pub volumen_restante: f64,
    pub estado: String,
    pub bodega_id: Option<i32>,
    pub ubicacion: Option<String>,
    pub activo: bool,
    pub creado_en: DateTimeUtc,
    pub actualizado_en: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Barril {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Barril {
            id: model.id,
            codigo: model.codigo,
            tipo_cerveza: model.tipo_cerveza,
            capacidad_litros: model.capacidad_litros,
            volumen_restante: model.volumen_restante,
            estado: model.estado.parse()?,
            bodega_id: model.bodega_id,
            ubicacion: model.ubicacion,
            activo: model.activo,
            creado_en: model.creado_en,
            actualizado_en: model.actualizado_en,
        })
    }
}
