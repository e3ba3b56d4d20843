//! Login attempt entity.

use sea_orm::entity::prelude::*;

use crate::domain::IntentoLogin;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "auditoria_login")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub usuario_id: Option<i32>,
    pub identificador: String,
    pub exito: bool,
    pub ip: Option<String>,
    pub fecha: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for IntentoLogin {
    fn from(model: Model) -> Self {
        IntentoLogin {
            id: model.id,
            usuario_id: model.usuario_id,
            identificador: model.identificador,
            exito: model.exito,
            ip: model.ip,
            fecha: model.fecha,
        }
    }
}
