//! Create `staff_availability` table. A null `start_time` marks a whole-day entry.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StaffAvailability::Table)
                    .if_not_exists()
                    .col(uuid(StaffAvailability::Id).primary_key())
                    .col(uuid(StaffAvailability::StaffId))
                    .col(date(StaffAvailability::Date))
                    .col(time_null(StaffAvailability::StartTime))
                    .col(time_null(StaffAvailability::EndTime))
                    .col(boolean(StaffAvailability::IsAvailable).default(true))
                    .col(string_len(StaffAvailability::Notes, 200).default(""))
                    .col(timestamp_with_time_zone(StaffAvailability::CreatedAt))
                    .col(timestamp_with_time_zone(StaffAvailability::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_availability_staff")
                            .from(StaffAvailability::Table, StaffAvailability::StaffId)
                            .to(Staff::Table, Staff::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StaffAvailability::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum StaffAvailability {
    Table,
    Id,
    StaffId,
    Date,
    StartTime,
    EndTime,
    IsAvailable,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Staff { Table, Id }
