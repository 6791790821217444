//! Create `sale` table. A sale may settle at most one appointment.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Sale::Table)
                    .if_not_exists()
                    .col(uuid(Sale::Id).primary_key())
                    .col(uuid(Sale::BarbershopId))
                    .col(string_len(Sale::CustomerName, 100))
                    .col(string_len(Sale::Service, 100))
                    .col(string_len(Sale::BarberName, 100))
                    .col(double(Sale::Amount))
                    .col(string_len(Sale::PaymentMethod, 20))
                    .col(uuid_null(Sale::AppointmentId).unique_key())
                    .col(text(Sale::Notes).default(""))
                    .col(date(Sale::SaleDate))
                    .col(timestamp_with_time_zone(Sale::CreatedAt))
                    .col(timestamp_with_time_zone(Sale::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_barbershop")
                            .from(Sale::Table, Sale::BarbershopId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sale_appointment")
                            .from(Sale::Table, Sale::AppointmentId)
                            .to(Appointment::Table, Appointment::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Sale::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Sale {
    Table,
    Id,
    BarbershopId,
    CustomerName,
    Service,
    BarberName,
    Amount,
    PaymentMethod,
    AppointmentId,
    Notes,
    SaleDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Appointment { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
