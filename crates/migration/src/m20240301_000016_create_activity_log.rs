//! Create `activity_log` table. Object references are plain nullable ids so
//! deleting the referenced row never removes history.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLog::Table)
                    .if_not_exists()
                    .col(uuid(ActivityLog::Id).primary_key())
                    .col(uuid(ActivityLog::BarbershopId))
                    .col(string_len(ActivityLog::ActionType, 30))
                    .col(text(ActivityLog::Description))
                    .col(uuid_null(ActivityLog::AppointmentId))
                    .col(uuid_null(ActivityLog::SaleId))
                    .col(uuid_null(ActivityLog::CustomerId))
                    .col(uuid_null(ActivityLog::StaffId))
                    .col(uuid_null(ActivityLog::InventoryId))
                    .col(json_binary(ActivityLog::Metadata))
                    .col(timestamp_with_time_zone(ActivityLog::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_activity_log_barbershop")
                            .from(ActivityLog::Table, ActivityLog::BarbershopId)
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
            .drop_table(Table::drop().table(ActivityLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ActivityLog {
    Table,
    Id,
    BarbershopId,
    ActionType,
    Description,
    AppointmentId,
    SaleId,
    CustomerId,
    StaffId,
    InventoryId,
    Metadata,
    CreatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
