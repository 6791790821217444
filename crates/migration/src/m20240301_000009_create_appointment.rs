//! Create `appointment` table, scoped to a barbershop user.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appointment::Table)
                    .if_not_exists()
                    .col(uuid(Appointment::Id).primary_key())
                    .col(uuid(Appointment::BarbershopId))
                    .col(string_len(Appointment::CustomerName, 100))
                    .col(string_len(Appointment::CustomerPhone, 20).default(""))
                    .col(string_len_null(Appointment::CustomerEmail, 254))
                    .col(string_len(Appointment::Service, 100))
                    .col(string_len(Appointment::BarberName, 100))
                    .col(date(Appointment::AppointmentDate))
                    .col(time(Appointment::AppointmentTime))
                    .col(integer(Appointment::DurationMinutes).default(60))
                    .col(string_len(Appointment::Status, 20))
                    .col(text(Appointment::Notes).default(""))
                    .col(double(Appointment::Amount).default(0.0))
                    .col(timestamp_with_time_zone(Appointment::CreatedAt))
                    .col(timestamp_with_time_zone(Appointment::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appointment_barbershop")
                            .from(Appointment::Table, Appointment::BarbershopId)
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
            .drop_table(Table::drop().table(Appointment::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Appointment {
    Table,
    Id,
    BarbershopId,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
    Service,
    BarberName,
    AppointmentDate,
    AppointmentTime,
    DurationMinutes,
    Status,
    Notes,
    Amount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum User { Table, Id }
