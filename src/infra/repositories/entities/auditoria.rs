//! Administrative audit entity.

use sea_orm::entity::prelude::*;

use crate::domain::RegistroAuditoria;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "auditoria")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub usuario_id: Option<i32>,
    pub accion: String,
    pub entidad: String,
    pub entidad_id: Option<i32>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub detalle: Option<Json>,
    pub fecha: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RegistroAuditoria {
    fn from(model: Model) -> Self {
        RegistroAuditoria {
            id: model.id,
            usuario_id: model.usuario_id,
            accion: model.accion,
            entidad: model.entidad,
            entidad_id: model.entidad_id,
            detalle: model.detalle,
            fecha: model.fecha,
        }
    }
}
