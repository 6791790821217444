//! Create `shop_service` table: the priced service catalog of a barbershop.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShopService::Table)
                    .if_not_exists()
                    .col(uuid(ShopService::Id).primary_key())
                    .col(uuid(ShopService::BarbershopId))
                    .col(string_len(ShopService::Name, 100))
                    .col(double(ShopService::Price))
                    .col(text_null(ShopService::Description))
                    .col(boolean(ShopService::IsActive).default(true))
                    .col(timestamp_with_time_zone(ShopService::CreatedAt))
                    .col(timestamp_with_time_zone(ShopService::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_shop_service_barbershop")
                            .from(ShopService::Table, ShopService::BarbershopId)
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
            .drop_table(Table::drop().table(ShopService::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShopService {
    Table,
    Id,
    BarbershopId,
    Name,
    Price,
    Description,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
