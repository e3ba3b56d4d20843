//! Return header entity.

use sea_orm::entity::prelude::*;

use crate::domain::{Devolucion, DevolucionDetalle};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "devoluciones")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub venta_id: i32,
    pub caja_id: i32,
    pub usuario_id: i32,
    pub motivo: String,
    pub monto: i64,
    pub reintegra_volumen: bool,
    pub fecha: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_domain(self, detalles: Vec<DevolucionDetalle>) -> Devolucion {
        Devolucion {
            id: self.id,
            venta_id: self.venta_id,
            caja_id: self.caja_id,
            usuario_id: self.usuario_id,
            motivo: self.motivo,
            monto: self.monto,
            reintegra_volumen: self.reintegra_volumen,
            fecha: self.fecha,
            detalles,
        }
    }
}
