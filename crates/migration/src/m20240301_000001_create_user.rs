//! Create `user` table.
//!
//! Every account lives here: customers, barbers, barbershops, admins and super admins.
//! `created_by` records the admin that owns a barbershop; soft-delete columns keep archived rows.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Email, 254).unique_key())
                    .col(string_len(User::Username, 150).unique_key())
                    .col(string_len(User::FirstName, 150).default(""))
                    .col(string_len(User::LastName, 150).default(""))
                    .col(string_len_null(User::Phone, 17))
                    .col(date_null(User::DateOfBirth))
                    .col(string_len(User::Role, 20))
                    .col(string_len_null(User::ShopName, 255))
                    .col(string_len_null(User::ShopOwnerName, 255))
                    .col(text_null(User::Address))
                    .col(string_len_null(User::City, 100))
                    .col(string_len_null(User::State, 100))
                    .col(string_len_null(User::Country, 100))
                    .col(string_len_null(User::PostalCode, 20))
                    .col(boolean(User::IsEmailVerified).default(false))
                    .col(boolean(User::IsPhoneVerified).default(false))
                    .col(boolean(User::IsProfileComplete).default(false))
                    .col(boolean(User::IsActive).default(true))
                    .col(uuid_null(User::CreatedBy))
                    .col(timestamp_with_time_zone_null(User::LastLoginAt))
                    .col(string_len_null(User::LastLoginIp, 45))
                    .col(timestamp_with_time_zone(User::CreatedAt))
                    .col(timestamp_with_time_zone(User::UpdatedAt))
                    .col(timestamp_with_time_zone_null(User::DeletedAt))
                    .col(uuid_null(User::DeletedBy))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_created_by")
                            .from(User::Table, User::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_deleted_by")
                            .from(User::Table, User::DeletedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Email,
    Username,
    FirstName,
    LastName,
    Phone,
    DateOfBirth,
    Role,
    ShopName,
    ShopOwnerName,
    Address,
    City,
    State,
    Country,
    PostalCode,
    IsEmailVerified,
    IsPhoneVerified,
    IsProfileComplete,
    IsActive,
    CreatedBy,
    LastLoginAt,
    LastLoginIp,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    DeletedBy,
}
