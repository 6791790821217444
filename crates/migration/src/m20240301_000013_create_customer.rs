//! Create `customer` table with denormalized visit statistics.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(uuid(Customer::Id).primary_key())
                    .col(uuid(Customer::BarbershopId))
                    .col(string_len(Customer::Name, 100))
                    .col(string_len(Customer::Phone, 20))
                    .col(string_len(Customer::Email, 254).default(""))
                    .col(text(Customer::Notes).default(""))
                    .col(integer(Customer::TotalVisits).default(0))
                    .col(date_null(Customer::LastVisitDate))
                    .col(double(Customer::TotalSpent).default(0.0))
                    .col(timestamp_with_time_zone(Customer::CreatedAt))
                    .col(timestamp_with_time_zone(Customer::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_barbershop")
                            .from(Customer::Table, Customer::BarbershopId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customer {
    Table,
    Id,
    BarbershopId,
    Name,
    Phone,
    Email,
    Notes,
    TotalVisits,
    LastVisitDate,
    TotalSpent,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
