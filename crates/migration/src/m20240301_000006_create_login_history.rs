//! Create `login_history` table. `user_id` is nullable so failed attempts on unknown emails are kept.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoginHistory::Table)
                    .if_not_exists()
                    .col(uuid(LoginHistory::Id).primary_key())
                    .col(uuid_null(LoginHistory::UserId))
                    .col(string_len(LoginHistory::Email, 254))
                    .col(string_len_null(LoginHistory::IpAddress, 45))
                    .col(text_null(LoginHistory::UserAgent))
                    .col(string_len(LoginHistory::Status, 20))
                    .col(string_len_null(LoginHistory::FailureReason, 255))
                    .col(timestamp_with_time_zone(LoginHistory::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_login_history_user")
                            .from(LoginHistory::Table, LoginHistory::UserId)
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
            .drop_table(Table::drop().table(LoginHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum LoginHistory { Table, Id, UserId, Email, IpAddress, UserAgent, Status, FailureReason, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
