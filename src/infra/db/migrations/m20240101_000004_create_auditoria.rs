//! Migration: audit trail tables.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_inventario::{Barriles, Movimientos};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Auditoria::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Auditoria::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Auditoria::UsuarioId).integer().null())
                    .col(ColumnDef::new(Auditoria::Accion).string_len(50).not_null())
                    .col(ColumnDef::new(Auditoria::Entidad).string_len(50).not_null())
                    .col(ColumnDef::new(Auditoria::EntidadId).integer().null())
                    .col(ColumnDef::new(Auditoria::Detalle).json_binary().null())
                    .col(
                        ColumnDef::new(Auditoria::Fecha)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_auditoria_entidad")
                    .table(Auditoria::Table)
                    .col(Auditoria::Entidad)
                    .col(Auditoria::EntidadId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AuditoriaLogin::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditoriaLogin::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditoriaLogin::UsuarioId).integer().null())
                    .col(ColumnDef::new(AuditoriaLogin::Identificador).string_len(255).not_null())
                    .col(ColumnDef::new(AuditoriaLogin::Exito).boolean().not_null())
                    .col(ColumnDef::new(AuditoriaLogin::Ip).string_len(64).null())
                    .col(
                        ColumnDef::new(AuditoriaLogin::Fecha)
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
                    .table(AuditoriaMovimientos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuditoriaMovimientos::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuditoriaMovimientos::MovimientoId).integer().not_null())
                    .col(ColumnDef::new(AuditoriaMovimientos::BarrilId).integer().not_null())
                    .col(ColumnDef::new(AuditoriaMovimientos::UsuarioId).integer().null())
                    .col(ColumnDef::new(AuditoriaMovimientos::EstadoAnterior).string_len(20).null())
                    .col(ColumnDef::new(AuditoriaMovimientos::EstadoNuevo).string_len(20).null())
                    .col(ColumnDef::new(AuditoriaMovimientos::VolumenAnterior).double().null())
                    .col(ColumnDef::new(AuditoriaMovimientos::VolumenNuevo).double().null())
                    .col(
                        ColumnDef::new(AuditoriaMovimientos::Fecha)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auditoria_movimientos_movimiento")
                            .from(AuditoriaMovimientos::Table, AuditoriaMovimientos::MovimientoId)
                            .to(Movimientos::Table, Movimientos::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_auditoria_movimientos_barril")
                            .from(AuditoriaMovimientos::Table, AuditoriaMovimientos::BarrilId)
                            .to(Barriles::Table, Barriles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AuditoriaMovimientos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuditoriaLogin::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Auditoria::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Auditoria {
    Table,
    Id,
    UsuarioId,
    Accion,
    Entidad,
    EntidadId,
    Detalle,
    Fecha,
}

#[derive(Iden)]
enum AuditoriaLogin {
    Table,
    Id,
    UsuarioId,
    Identificador,
    Exito,
    Ip,
    Fecha,
}

#[derive(Iden)]
enum AuditoriaMovimientos {
    Table,
    Id,
    MovimientoId,
    BarrilId,
    UsuarioId,
    EstadoAnterior,
    EstadoNuevo,
    VolumenAnterior,
    VolumenNuevo,
    Fecha,
}
