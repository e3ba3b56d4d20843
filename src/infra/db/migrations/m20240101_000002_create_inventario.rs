//! Migration: warehouses, barrels and the movement log.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_usuarios::Usuarios;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bodegas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Bodegas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Bodegas::Nombre).string_len(120).not_null().unique_key())
                    .col(ColumnDef::new(Bodegas::Ubicacion).string_len(255).null())
                    .col(ColumnDef::new(Bodegas::Capacidad).integer().null())
                    .col(ColumnDef::new(Bodegas::Activo).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Bodegas::CreadoEn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Barriles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Barriles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Barriles::Codigo).string_len(64).not_null().unique_key())
                    .col(ColumnDef::new(Barriles::TipoCerveza).string_len(120).not_null())
                    .col(ColumnDef::new(Barriles::CapacidadLitros).double().not_null())
                    .col(ColumnDef::new(Barriles::VolumenRestante).double().not_null())
                    .col(
                        ColumnDef::new(Barriles::Estado)
                            .string_len(20)
                            .not_null()
                            .default("DISPONIBLE"),
                    )
                    .col(ColumnDef::new(Barriles::BodegaId).integer().null())
                    .col(ColumnDef::new(Barriles::Ubicacion).string_len(255).null())
                    .col(ColumnDef::new(Barriles::Activo).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Barriles::CreadoEn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Barriles::ActualizadoEn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_barriles_bodega")
                            .from(Barriles::Table, Barriles::BodegaId)
                            .to(Bodegas::Table, Bodegas::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE barriles ADD CONSTRAINT ck_barriles_volumen \
                 CHECK (volumen_restante >= 0 AND volumen_restante <= capacidad_litros)",
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movimientos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movimientos::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movimientos::BarrilId).integer().not_null())
                    .col(ColumnDef::new(Movimientos::UsuarioId).integer().null())
                    .col(ColumnDef::new(Movimientos::Tipo).string_len(20).not_null())
                    .col(ColumnDef::new(Movimientos::BodegaOrigenId).integer().null())
                    .col(ColumnDef::new(Movimientos::BodegaDestinoId).integer().null())
                    .col(ColumnDef::new(Movimientos::VolumenLitros).double().null())
                    .col(ColumnDef::new(Movimientos::Detalle).text().null())
                    .col(
                        ColumnDef::new(Movimientos::Fecha)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movimientos_barril")
                            .from(Movimientos::Table, Movimientos::BarrilId)
                            .to(Barriles::Table, Barriles::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movimientos_usuario")
                            .from(Movimientos::Table, Movimientos::UsuarioId)
                            .to(Usuarios::Table, Usuarios::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movimientos_barril_fecha")
                    .table(Movimientos::Table)
                    .col(Movimientos::BarrilId)
                    .col(Movimientos::Fecha)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Movimientos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Barriles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Bodegas::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Bodegas {
    Table,
    Id,
    Nombre,
    Ubicacion,
    Capacidad,
    Activo,
    CreadoEn,
}

#[derive(Iden)]
pub enum Barriles {
    Table,
    Id,
    Codigo,
    TipoCerveza,
    CapacidadLitros,
    VolumenRestante,
    Estado,
    BodegaId,
    Ubicacion,
    Activo,
    CreadoEn,
    ActualizadoEn,
}

#[derive(Iden)]
pub enum Movimientos {
    Table,
    Id,
    BarrilId,
    UsuarioId,
    Tipo,
    BodegaOrigenId,
    BodegaDestinoId,
    VolumenLitros,
    Detalle,
    Fecha,
}
