//! Create `email_verification_token` table (single-use, time-limited).
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmailVerificationToken::Table)
                    .if_not_exists()
                    .col(uuid(EmailVerificationToken::Id).primary_key())
                    .col(uuid(EmailVerificationToken::UserId))
                    .col(uuid(EmailVerificationToken::Token).unique_key())
                    .col(boolean(EmailVerificationToken::IsUsed).default(false))
                    .col(timestamp_with_time_zone(EmailVerificationToken::ExpiresAt))
                    .col(timestamp_with_time_zone(EmailVerificationToken::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_email_verification_token_user")
                            .from(EmailVerificationToken::Table, EmailVerificationToken::UserId)
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
            .drop_table(Table::drop().table(EmailVerificationToken::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EmailVerificationToken { Table, Id, UserId, Token, IsUsed, ExpiresAt, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
