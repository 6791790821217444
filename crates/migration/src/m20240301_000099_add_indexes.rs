use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// (index name, table, columns, unique)
fn index_specs() -> Vec<(&'static str, DynIden, Vec<DynIden>, bool)> {
    vec![
        ("idx_user_role", User::Table.into_iden(), vec![User::Role.into_iden()], false),
        ("idx_user_created_by", User::Table.into_iden(), vec![User::CreatedBy.into_iden()], false),
        (
            "idx_appointment_shop_date",
            Appointment::Table.into_iden(),
            vec![Appointment::BarbershopId.into_iden(), Appointment::AppointmentDate.into_iden()],
            false,
        ),
        (
            "idx_sale_shop_date",
            Sale::Table.into_iden(),
            vec![Sale::BarbershopId.into_iden(), Sale::SaleDate.into_iden()],
            false,
        ),
        (
            "uniq_staff_shop_phone",
            Staff::Table.into_iden(),
            vec![Staff::BarbershopId.into_iden(), Staff::Phone.into_iden()],
            true,
        ),
        (
            "uniq_staff_availability_slot",
            StaffAvailability::Table.into_iden(),
            vec![
                StaffAvailability::StaffId.into_iden(),
                StaffAvailability::Date.into_iden(),
                StaffAvailability::StartTime.into_iden(),
            ],
            true,
        ),
        (
            "uniq_customer_shop_phone",
            Customer::Table.into_iden(),
            vec![Customer::BarbershopId.into_iden(), Customer::Phone.into_iden()],
            true,
        ),
        (
            "uniq_inventory_shop_name",
            InventoryItem::Table.into_iden(),
            vec![InventoryItem::BarbershopId.into_iden(), InventoryItem::Name.into_iden()],
            true,
        ),
        (
            "uniq_shop_service_shop_name",
            ShopService::Table.into_iden(),
            vec![ShopService::BarbershopId.into_iden(), ShopService::Name.into_iden()],
            true,
        ),
        (
            "idx_activity_log_shop_created",
            ActivityLog::Table.into_iden(),
            vec![ActivityLog::BarbershopId.into_iden(), ActivityLog::CreatedAt.into_iden()],
            false,
        ),
        (
            "idx_login_history_user",
            LoginHistory::Table.into_iden(),
            vec![LoginHistory::UserId.into_iden()],
            false,
        ),
    ]
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, cols, unique) in index_specs() {
            let mut idx = Index::create();
            idx.name(name).table(table).if_not_exists();
            for col in cols {
                idx.col(col);
            }
            if unique {
                idx.unique();
            }
            manager.create_index(idx.to_owned()).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table, _, _) in index_specs() {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum User { Table, Role, CreatedBy }

#[derive(DeriveIden)]
enum Appointment { Table, BarbershopId, AppointmentDate }

#[derive(DeriveIden)]
enum Sale { Table, BarbershopId, SaleDate }

#[derive(DeriveIden)]
enum Staff { Table, BarbershopId, Phone }

#[derive(DeriveIden)]
enum StaffAvailability { Table, StaffId, Date, StartTime }

#[derive(DeriveIden)]
enum Customer { Table, BarbershopId, Phone }

#[derive(DeriveIden)]
enum InventoryItem { Table, BarbershopId, Name }

#[derive(DeriveIden)]
enum ShopService { Table, BarbershopId, Name }

#[derive(DeriveIden)]
enum ActivityLog { Table, BarbershopId, CreatedAt }

#[derive(DeriveIden)]
enum LoginHistory { Table, UserId }
