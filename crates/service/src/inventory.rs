//! Stock items and low-stock tracking.

use chrono::Utc;
use models::activity_log::NewActivity;
use models::enums::{ActionType, InventoryCategory, StockStatus};
use models::inventory_item::{self, InventoryView};
use models::validate;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::activity;
use crate::errors::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryInput {
    pub name: String,
    pub category: InventoryCategory,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub min_stock: Option<i32>,
    #[serde(default)]
    pub unit_cost: f64,
    #[serde(default)]
    pub selling_price: f64,
    #[serde(default)]
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryPatch {
    pub name: Option<String>,
    pub category: Option<InventoryCategory>,
    pub quantity: Option<i32>,
    pub min_stock: Option<i32>,
    pub unit_cost: Option<f64>,
    pub selling_price: Option<f64>,
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilter {
    pub category: Option<InventoryCategory>,
    pub stock_status: Option<StockStatus>,
}

fn check_count(field: &str, value: i32) -> ServiceResult<i32> {
    if value < 0 {
        return Err(ServiceError::validation(format!("{field} must be zero or greater")));
    }
    Ok(value)
}

fn check_name(name: &str) -> ServiceResult<String> {
    validate::required("name", name)?;
    validate::max_len("name", name, 100)?;
    Ok(name.trim().to_string())
}

async fn ensure_name_free<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, name: &str, exclude: Option<Uuid>) -> ServiceResult<()> {
    let mut q = inventory_item::Entity::find()
        .filter(inventory_item::Column::BarbershopId.eq(barbershop_id))
        .filter(inventory_item::Column::Name.eq(name));
    if let Some(id) = exclude {
        q = q.filter(inventory_item::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::conflict("an inventory item with this name already exists"));
    }
    Ok(())
}

pub async fn find_owned<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, id: Uuid) -> ServiceResult<inventory_item::Model> {
    inventory_item::Entity::find_by_id(id)
        .filter(inventory_item::Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("inventory item"))
}

/// The regular add/update entry, plus a low-stock entry when the item is at or below its threshold.
async fn log_change<C: ConnectionTrait>(db: &C, action: ActionType, item: &inventory_item::Model) -> ServiceResult<()> {
    let verb = if action == ActionType::InventoryAdded { "added" } else { "updated" };
    activity::log(
        db,
        NewActivity::new(item.barbershop_id, action, format!("Inventory item {} {}", item.name, verb))
            .inventory(item.id)
            .metadata(json!({ "quantity": item.quantity, "category": item.category })),
    )
    .await?;
    if item.is_low_stock() {
        warn!(barbershop_id = %item.barbershop_id, item = %item.name, quantity = item.quantity, "inventory_low_stock");
        activity::log(
            db,
            NewActivity::new(
                item.barbershop_id,
                ActionType::InventoryLowStock,
                format!("{} is low on stock ({} left)", item.name, item.quantity),
            )
            .inventory(item.id)
            .metadata(json!({ "quantity": item.quantity, "min_stock": item.min_stock })),
        )
        .await?;
    }
    Ok(())
}

pub async fn create(db: &DatabaseConnection, barbershop_id: Uuid, input: InventoryInput) -> ServiceResult<InventoryView> {
    let name = check_name(&input.name)?;
    ensure_name_free(db, barbershop_id, &name, None).await?;
    let now = Utc::now();
    let am = inventory_item::ActiveModel {
        id: Set(Uuid::new_v4()),
        barbershop_id: Set(barbershop_id),
        name: Set(name),
        category: Set(input.category.as_str().to_string()),
        quantity: Set(check_count("quantity", input.quantity)?),
        min_stock: Set(check_count("min_stock", input.min_stock.unwrap_or(inventory_item::DEFAULT_MIN_STOCK))?),
        unit_cost: Set(validate::non_negative_money("unit_cost", input.unit_cost)?),
        selling_price: Set(validate::non_negative_money("selling_price", input.selling_price)?),
        supplier: Set(input.supplier.unwrap_or_default()),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let created = am.insert(db).await?;
    log_change(db, ActionType::InventoryAdded, &created).await?;
    Ok(created.view())
}

fn matches_status(item: &inventory_item::Model, wanted: Option<StockStatus>) -> bool {
    wanted.map_or(true, |s| item.stock_status() == s)
}

pub async fn list(db: &DatabaseConnection, barbershop_id: Uuid, filter: InventoryFilter) -> ServiceResult<Vec<InventoryView>> {
    let mut q = inventory_item::Entity::find().filter(inventory_item::Column::BarbershopId.eq(barbershop_id));
    if let Some(c) = filter.category {
        q = q.filter(inventory_item::Column::Category.eq(c.as_str()));
    }
    let rows = q.order_by_asc(inventory_item::Column::Name).all(db).await?;
    Ok(rows
        .into_iter()
        .filter(|i| matches_status(i, filter.stock_status))
        .map(inventory_item::Model::view)
        .collect())
}

pub async fn low_stock(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<InventoryView>> {
    let rows = inventory_item::Entity::find()
        .filter(inventory_item::Column::BarbershopId.eq(barbershop_id))
        .filter(Expr::col(inventory_item::Column::Quantity).lte(Expr::col(inventory_item::Column::MinStock)))
        .order_by_asc(inventory_item::Column::Quantity)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(inventory_item::Model::view).collect())
}

pub async fn get(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<InventoryView> {
    Ok(find_owned(db, barbershop_id, id).await?.view())
}

pub async fn update(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid, patch: InventoryPatch) -> ServiceResult<InventoryView> {
    let current = find_owned(db, barbershop_id, id).await?;
    let mut am: inventory_item::ActiveModel = current.into();
    if let Some(v) = patch.name {
        let name = check_name(&v)?;
        ensure_name_free(db, barbershop_id, &name, Some(id)).await?;
        am.name = Set(name);
    }
    if let Some(v) = patch.category {
        am.category = Set(v.as_str().to_string());
    }
    if let Some(v) = patch.quantity {
        am.quantity = Set(check_count("quantity", v)?);
    }
    if let Some(v) = patch.min_stock {
        am.min_stock = Set(check_count("min_stock", v)?);
    }
    if let Some(v) = patch.unit_cost {
        am.unit_cost = Set(validate::non_negative_money("unit_cost", v)?);
    }
    if let Some(v) = patch.selling_price {
        am.selling_price = Set(validate::non_negative_money("selling_price", v)?);
    }
    if let Some(v) = patch.supplier {
        am.supplier = Set(v);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    log_change(db, ActionType::InventoryUpdated, &updated).await?;
    Ok(updated.view())
}

pub async fn delete(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let found = find_owned(db, barbershop_id, id).await?;
    inventory_item::Entity::delete_by_id(found.id).exec(db).await?;
    Ok(())
}

/// Items at or below their own threshold.
pub async fn low_stock_count<C: ConnectionTrait>(db: &C, barbershop_id: Uuid) -> ServiceResult<u64> {
    Ok(inventory_item::Entity::find()
        .filter(inventory_item::Column::BarbershopId.eq(barbershop_id))
        .filter(Expr::col(inventory_item::Column::Quantity).lte(Expr::col(inventory_item::Column::MinStock)))
        .count(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{list_recent, ActivityFilter};
    use crate::test_support::{get_db, seed_barbershop};

    fn pomade(quantity: i32) -> InventoryInput {
        InventoryInput {
            name: "Matte Pomade".into(),
            category: InventoryCategory::HairProducts,
            quantity,
            min_stock: None,
            unit_cost: 200.0,
            selling_price: 350.0,
            supplier: Some("Acme".into()),
        }
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(check_count("quantity", -1).is_err());
        assert_eq!(check_count("quantity", 0).unwrap(), 0);
    }

    #[tokio::test]
    async fn low_stock_items_are_flagged_and_logged() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let shop = seed_barbershop(&db).await?;

        let item = create(&db, shop.id, pomade(3)).await?;
        assert_eq!(item.stock_status, StockStatus::LowStock);
        assert_eq!(item.profit_margin, 75.0);
        assert!(matches!(create(&db, shop.id, pomade(10)).await, Err(ServiceError::Conflict(_))));

        let logs = list_recent(&db, shop.id, ActivityFilter::default()).await?;
        assert!(logs.iter().any(|l| l.action_type == ActionType::InventoryLowStock.as_str()));

        assert_eq!(low_stock(&db, shop.id).await?.len(), 1);
        let restocked = update(&db, shop.id, item.item.id, InventoryPatch { quantity: Some(40), ..Default::default() }).await?;
        assert_eq!(restocked.stock_status, StockStatus::InStock);
        assert!(low_stock(&db, shop.id).await?.is_empty());

        let in_stock = list(&db, shop.id, InventoryFilter { stock_status: Some(StockStatus::InStock), ..Default::default() }).await?;
        assert_eq!(in_stock.len(), 1);
        Ok(())
    }
}
