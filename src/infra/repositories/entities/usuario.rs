//! Staff account entity.

use sea_orm::entity::prelude::*;

use crate::domain::Usuario;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub rut: String,
    pub nombre: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub rol_id: i32,
    pub activo: bool,
    pub creado_en: DateTimeUtc,
    pub actualizado_en: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::rol::Entity",
        from = "Column::RolId",
        to = "super::rol::Column::Id"
    )]
    Rol,
}

impl Related<super::rol::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rol.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a user row joined with its role into the domain entity
impl From<(Model, Option<super::rol::Model>)> for Usuario {
    fn from((model, rol): (Model, Option<super::rol::Model>)) -> Self {
        Usuario {
            id: model.id,
            rut: model.rut,
            nombre: model.nombre,
            email: model.email,
            password_hash: model.password_hash,
            rol_id: model.rol_id,
            rol: rol.map(|r| r.nombre).unwrap_or_default(),
            activo: model.activo,
            creado_en: model.creado_en,
            actualizado_en: model.actualizado_en,
        }
    }
}
