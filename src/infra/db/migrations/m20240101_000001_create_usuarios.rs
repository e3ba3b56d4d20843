//! Migration: roles and staff accounts, with the seeded roles.

use sea_orm_migration::prelude::*;

use crate::config::SEEDED_ROLES;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Roles::Nombre).string_len(50).not_null().unique_key())
                    .col(ColumnDef::new(Roles::Descripcion).text().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Usuarios::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Usuarios::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Usuarios::Rut).string_len(12).not_null().unique_key())
                    .col(ColumnDef::new(Usuarios::Nombre).string_len(120).not_null())
                    .col(ColumnDef::new(Usuarios::Email).string_len(255).not_null().unique_key())
                    .col(ColumnDef::new(Usuarios::PasswordHash).string_len(255).not_null())
                    .col(ColumnDef::new(Usuarios::RolId).integer().not_null())
                    .col(ColumnDef::new(Usuarios::Activo).boolean().not_null().default(true))
                    .col(
                        ColumnDef::new(Usuarios::CreadoEn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Usuarios::ActualizadoEn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_usuarios_rol")
                            .from(Usuarios::Table, Usuarios::RolId)
                            .to(Roles::Table, Roles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        let mut seed = Query::insert();
        seed.into_table(Roles::Table)
            .columns([Roles::Nombre, Roles::Descripcion])
            .on_conflict(OnConflict::column(Roles::Nombre).do_nothing().to_owned());
        for (nombre, descripcion) in SEEDED_ROLES {
            seed.values([(*nombre).into(), (*descripcion).into()])
                .map_err(|e| DbErr::Migration(e.to_string()))?;
        }
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Usuarios::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Roles {
    Table,
    Id,
    Nombre,
    Descripcion,
}

#[derive(Iden)]
pub enum Usuarios {
    Table,
    Id,
    Rut,
    Nombre,
    Email,
    PasswordHash,
    RolId,
    Activo,
    CreadoEn,
    ActualizadoEn,
}
