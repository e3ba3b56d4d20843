//! Role entity.

use sea_orm::entity::prelude::*;

use crate::domain::Rol;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub nombre: String,
    pub descripcion: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::usuario::Entity")]
    Usuario,
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usuario.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Rol {
    fn from(model: Model) -> Self {
        Rol {
            id: model.id,
            nombre: model.nombre,
            descripcion: model.descripcion,
        }
    }
}
