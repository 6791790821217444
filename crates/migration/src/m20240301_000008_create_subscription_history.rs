//! Create `subscription_history` table, an append-only trail of plan/status changes.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubscriptionHistory::Table)
                    .if_not_exists()
                    .col(uuid(SubscriptionHistory::Id).primary_key())
                    .col(uuid(SubscriptionHistory::SubscriptionId))
                    .col(string_len(SubscriptionHistory::Action, 30))
                    .col(string_len_null(SubscriptionHistory::OldPlan, 20))
                    .col(string_len_null(SubscriptionHistory::NewPlan, 20))
                    .col(string_len_null(SubscriptionHistory::OldStatus, 20))
                    .col(string_len_null(SubscriptionHistory::NewStatus, 20))
                    .col(uuid_null(SubscriptionHistory::ChangedBy))
                    .col(text(SubscriptionHistory::Notes).default(""))
                    .col(timestamp_with_time_zone(SubscriptionHistory::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_history_subscription")
                            .from(SubscriptionHistory::Table, SubscriptionHistory::SubscriptionId)
                            .to(Subscription::Table, Subscription::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subscription_history_changed_by")
                            .from(SubscriptionHistory::Table, SubscriptionHistory::ChangedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SubscriptionHistory::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SubscriptionHistory {
    Table,
    Id,
    SubscriptionId,
    Action,
    OldPlan,
    NewPlan,
    OldStatus,
    NewStatus,
    ChangedBy,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Subscription { Table, Id }

#[derive(DeriveIden)]
enum User { Table, Id }
