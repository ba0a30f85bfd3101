use sea_orm_migration::prelude::*;

use super::m20260105_000003_create_equipment_table::Equipment;
use super::m20260105_000004_create_orders_table::Orders;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Running totals are never stored: they are a read-time prefix sum
        // over (sequence_key, id), so edits and deletions reorder nothing.
        manager
            .create_table(
                Table::create()
                    .table(Deliveries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Deliveries::Id)
                            .big_integer()
                            .primary_key()
                            .auto_increment()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deliveries::OrderId).big_integer().not_null())
                    .col(ColumnDef::new(Deliveries::MpNo).string().not_null())
                    .col(ColumnDef::new(Deliveries::EquipmentId).big_integer().null())
                    .col(
                        ColumnDef::new(Deliveries::Volume)
                            .decimal_len(10, 2)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deliveries::Status).string().not_null())
                    .col(
                        ColumnDef::new(Deliveries::SequenceKey)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Deliveries::ScheduleDate).date().null())
                    .col(ColumnDef::new(Deliveries::ScheduleTime).time().null())
                    .col(
                        ColumnDef::new(Deliveries::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Deliveries::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Deliveries::UpdatedAt).timestamp().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deliveries_order")
                            .from(Deliveries::Table, Deliveries::OrderId)
                            .to(Orders::Table, Orders::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deliveries_equipment")
                            .from(Deliveries::Table, Deliveries::EquipmentId)
                            .to(Equipment::Table, Equipment::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_deliveries_order_sequence")
                    .table(Deliveries::Table)
                    .col(Deliveries::OrderId)
                    .col(Deliveries::SequenceKey)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Deliveries::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Deliveries {
    Table,
    Id,
    OrderId,
    MpNo,
    EquipmentId,
    Volume,
    Status,
    SequenceKey,
    ScheduleDate,
    ScheduleTime,
    Version,
    CreatedAt,
    UpdatedAt,
}
