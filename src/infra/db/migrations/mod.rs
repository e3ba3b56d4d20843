//! Database migrations.
//!
//! Each migration is a separate module following SeaORM conventions.
//! Migration names follow the pattern: m{YYYYMMDD}_{NNNNNN}_{description}

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_usuarios;
mod m20240101_000002_create_inventario;
mod m20240101_000003_create_caja_ventas;
mod m20240101_000004_create_auditoria;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_usuarios::Migration),
            Box::new(m20240101_000002_create_inventario::Migration),
            Box::new(m20240101_000003_create_caja_ventas::Migration),
            Box::new(m20240101_000004_create_auditoria::Migration),
        ]
    }
}
