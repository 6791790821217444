//! Create `inventory_item` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(InventoryItem::Table)
                    .if_not_exists()
                    .col(uuid(InventoryItem::Id).primary_key())
                    .col(uuid(InventoryItem::BarbershopId))
                    .col(string_len(InventoryItem::Name, 100))
                    .col(string_len(InventoryItem::Category, 20))
                    .col(integer(InventoryItem::Quantity).default(0))
                    .col(integer(InventoryItem::MinStock).default(5))
                    .col(double(InventoryItem::UnitCost).default(0.0))
                    .col(double(InventoryItem::SellingPrice).default(0.0))
                    .col(string_len(InventoryItem::Supplier, 100).default(""))
                    .col(timestamp_with_time_zone(InventoryItem::CreatedAt))
                    .col(timestamp_with_time_zone(InventoryItem::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_inventory_item_barbershop")
                            .from(InventoryItem::Table, InventoryItem::BarbershopId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InventoryItem::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum InventoryItem {
    Table,
    Id,
    BarbershopId,
    Name,
    Category,
    Quantity,
    MinStock,
    UnitCost,
    SellingPrice,
    Supplier,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
