//! Migration: registers, barrel assignments, sales and returns.
//!
//! `ux_caja_abierta` and `ux_caja_barril_activo` are partial unique
//! indexes, which the schema builder cannot express, so they are raw SQL.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_usuarios::Usuarios;
use super::m20240101_000002_create_inventario::Barriles;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cajas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cajas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Cajas::UsuarioId).integer().not_null())
                    .col(ColumnDef::new(Cajas::Estado).string_len(10).not_null().default("ABIERTA"))
                    .col(ColumnDef::new(Cajas::MontoInicial).big_integer().not_null())
                    .col(ColumnDef::new(Cajas::MontoFinal).big_integer().null())
                    .col(
                        ColumnDef::new(Cajas::FechaApertura)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Cajas::FechaCierre).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cajas_usuario")
                            .from(Cajas::Table, Cajas::UsuarioId)
                            .to(Usuarios::Table, Usuarios::Id),
                    )
                    .to_owned(),
            )
            .await?;

        let db = manager.get_connection();
        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_caja_abierta ON cajas ((estado)) \
             WHERE estado = 'ABIERTA'",
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(CajaBarriles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CajaBarriles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CajaBarriles::CajaId).integer().not_null())
                    .col(ColumnDef::new(CajaBarriles::BarrilId).integer().not_null())
                    .col(
                        ColumnDef::new(CajaBarriles::AsignadoEn)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(CajaBarriles::LiberadoEn).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_caja_barriles_caja")
                            .from(CajaBarriles::Table, CajaBarriles::CajaId)
                            .to(Cajas::Table, Cajas::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_caja_barriles_barril")
                            .from(CajaBarriles::Table, CajaBarriles::BarrilId)
                            .to(Barriles::Table, Barriles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        db.execute_unprepared(
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_caja_barril_activo ON caja_barriles (barril_id) \
             WHERE liberado_en IS NULL",
        )
        .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ventas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ventas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ventas::CajaId).integer().not_null())
                    .col(ColumnDef::new(Ventas::UsuarioId).integer().not_null())
                    .col(ColumnDef::new(Ventas::MetodoPago).string_len(20).not_null())
                    .col(ColumnDef::new(Ventas::Subtotal).big_integer().not_null())
                    .col(ColumnDef::new(Ventas::Descuento).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Ventas::Total).big_integer().not_null())
                    .col(
                        ColumnDef::new(Ventas::Estado)
                            .string_len(12)
                            .not_null()
                            .default("COMPLETADA"),
                    )
                    .col(
                        ColumnDef::new(Ventas::Fecha)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ventas_caja")
                            .from(Ventas::Table, Ventas::CajaId)
                            .to(Cajas::Table, Cajas::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ventas_usuario")
                            .from(Ventas::Table, Ventas::UsuarioId)
                            .to(Usuarios::Table, Usuarios::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_ventas_fecha")
                    .table(Ventas::Table)
                    .col(Ventas::Fecha)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VentaDetalle::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VentaDetalle::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VentaDetalle::VentaId).integer().not_null())
                    .col(ColumnDef::new(VentaDetalle::BarrilId).integer().null())
                    .col(ColumnDef::new(VentaDetalle::Descripcion).string_len(255).not_null())
                    .col(ColumnDef::new(VentaDetalle::Cantidad).integer().not_null())
                    .col(ColumnDef::new(VentaDetalle::PrecioUnitario).big_integer().not_null())
                    .col(
                        ColumnDef::new(VentaDetalle::VolumenLitros)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(ColumnDef::new(VentaDetalle::Subtotal).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_venta_detalle_venta")
                            .from(VentaDetalle::Table, VentaDetalle::VentaId)
                            .to(Ventas::Table, Ventas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_venta_detalle_barril")
                            .from(VentaDetalle::Table, VentaDetalle::BarrilId)
                            .to(Barriles::Table, Barriles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Devoluciones::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Devoluciones::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Devoluciones::VentaId).integer().not_null())
                    .col(ColumnDef::new(Devoluciones::CajaId).integer().not_null())
                    .col(ColumnDef::new(Devoluciones::UsuarioId).integer().not_null())
                    .col(ColumnDef::new(Devoluciones::Motivo).text().not_null())
                    .col(ColumnDef::new(Devoluciones::Monto).big_integer().not_null())
                    .col(
                        ColumnDef::new(Devoluciones::ReintegraVolumen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Devoluciones::Fecha)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devoluciones_venta")
                            .from(Devoluciones::Table, Devoluciones::VentaId)
                            .to(Ventas::Table, Ventas::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devoluciones_caja")
                            .from(Devoluciones::Table, Devoluciones::CajaId)
                            .to(Cajas::Table, Cajas::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DevolucionDetalle::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DevolucionDetalle::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DevolucionDetalle::DevolucionId).integer().not_null())
                    .col(ColumnDef::new(DevolucionDetalle::VentaDetalleId).integer().not_null())
                    .col(ColumnDef::new(DevolucionDetalle::Cantidad).integer().not_null())
                    .col(ColumnDef::new(DevolucionDetalle::Monto).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devolucion_detalle_devolucion")
                            .from(DevolucionDetalle::Table, DevolucionDetalle::DevolucionId)
                            .to(Devoluciones::Table, Devoluciones::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_devolucion_detalle_venta_detalle")
                            .from(DevolucionDetalle::Table, DevolucionDetalle::VentaDetalleId)
                            .to(VentaDetalle::Table, VentaDetalle::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DevolucionDetalle::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Devoluciones::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VentaDetalle::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ventas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CajaBarriles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cajas::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Iden)]
enum Cajas {
    Table,
    Id,
    UsuarioId,
    Estado,
    MontoInicial,
    MontoFinal,
    FechaApertura,
    FechaCierre,
}

#[derive(Iden)]
enum CajaBarriles {
    Table,
    Id,
    CajaId,
    BarrilId,
    AsignadoEn,
    LiberadoEn,
}

#[derive(Iden)]
enum Ventas {
    Table,
    Id,
    CajaId,
    UsuarioId,
    MetodoPago,
    Subtotal,
    Descuento,
    Total,
    Estado,
    Fecha,
}

#[derive(Iden)]
enum VentaDetalle {
    Table,
    Id,
    VentaId,
    BarrilId,
    Descripcion,
    Cantidad,
    PrecioUnitario,
    VolumenLitros,
    Subtotal,
}

#[derive(Iden)]
enum Devoluciones {
    Table,
    Id,
    VentaId,
    CajaId,
    UsuarioId,
    Motivo,
    Monto,
    ReintegraVolumen,
    Fecha,
}

#[derive(Iden)]
enum DevolucionDetalle {
    Table,
    Id,
    DevolucionId,
    VentaDetalleId,
    Cantidad,
    Monto,
}
