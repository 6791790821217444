//! Create `subscription` table; one plan per barbershop user.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subscription::Table)
                    .if_not_exists()
                    .col(uuid(Subscription::Id).primary_key())
                    .col(uuid(Subscription::BarbershopId).unique_key())
                    .col(string_len(Subscription::Plan, 20))
                    .col(string_len(Subscription::Status, 20))
                    .col(timestamp_with_time_zone(Subscription::StartsAt))
                    .col(timestamp_with_time_zone(Subscription::ExpiresAt))
                    .col(integer(Subscription::MaxAppointments).default(100))
                    .col(integer(Subscription::MaxStaff).default(5))
                    .col(json_binary(Subscription::Features))
                    .col(timestamp_with_time_zone(Subscription::CreatedAt))
                    .col(timestamp_with_time_zone(Subscription::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_barbershop")
                            .from(Subscription::Table, Subscription::BarbershopId)
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
            .drop_table(Table::drop().table(Subscription::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Subscription {
    Table,
    Id,
    BarbershopId,
    Plan,
    Status,
    StartsAt,
    ExpiresAt,
    MaxAppointments,
    MaxStaff,
    Features,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
