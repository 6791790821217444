//! Create `staff` table; phone is unique per barbershop (see indexes migration).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(uuid(Staff::Id).primary_key())
                    .col(uuid(Staff::BarbershopId))
                    .col(string_len(Staff::Name, 100))
                    .col(string_len(Staff::Role, 20))
                    .col(string_len(Staff::Phone, 20))
                    .col(string_len(Staff::Email, 254).default(""))
                    .col(text(Staff::Schedule).default(""))
                    .col(string_len(Staff::Status, 20))
                    .col(double_null(Staff::Salary))
                    .col(date(Staff::JoinDate))
                    .col(timestamp_with_time_zone(Staff::CreatedAt))
                    .col(timestamp_with_time_zone(Staff::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_barbershop")
                            .from(Staff::Table, Staff::BarbershopId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Staff::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Staff {
    Table,
    Id,
    BarbershopId,
    Name,
    Role,
    Phone,
    Email,
    Schedule,
    Status,
    Salary,
    JoinDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
