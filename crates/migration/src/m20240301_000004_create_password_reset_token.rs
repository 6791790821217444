//! Create `password_reset_token` table; keeps requester ip and user agent for audit.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PasswordResetToken::Table)
                    .if_not_exists()
                    .col(uuid(PasswordResetToken::Id).primary_key())
                    .col(uuid(PasswordResetToken::UserId))
                    .col(uuid(PasswordResetToken::Token).unique_key())
                    .col(boolean(PasswordResetToken::IsUsed).default(false))
                    .col(string_len_null(PasswordResetToken::IpAddress, 45))
                    .col(text_null(PasswordResetToken::UserAgent))
                    .col(timestamp_with_time_zone(PasswordResetToken::ExpiresAt))
                    .col(timestamp_with_time_zone(PasswordResetToken::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_password_reset_token_user")
                            .from(PasswordResetToken::Table, PasswordResetToken::UserId)
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
            .drop_table(Table::drop().table(PasswordResetToken::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PasswordResetToken { Table, Id, UserId, Token, IsUsed, IpAddress, UserAgent, ExpiresAt, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
