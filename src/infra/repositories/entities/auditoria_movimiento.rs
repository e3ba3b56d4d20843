//! Barrel before/after snapshot entity.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "auditoria_movimientos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub movimiento_id: i32,
    pub barril_id: i32,
    pub usuario_id: Option<i32>,
    pub estado_anterior: Option<String>,
    pub estado_nuevo: Option<String>,
    pub volumen_anterior: Option<f64>,
    pub volumen_nuevo: Option<f64>,
    pub fecha: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
