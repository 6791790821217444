//! The shop's service menu.

use chrono::Utc;
use models::activity_log::NewActivity;
use models::enums::ActionType;
use models::shop_service::{self, ShopServiceView};
use models::validate;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::activity;
use crate::errors::{ServiceError, ServiceResult};
use crate::query::{icontains, ieq, term};

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceInput {
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicePatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceFilter {
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

fn check_name(name: &str) -> ServiceResult<String> {
    validate::required("name", name)?;
    validate::max_len("name", name, 100)?;
    Ok(name.trim().to_string())
}

async fn ensure_name_free<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, name: &str, exclude: Option<Uuid>) -> ServiceResult<()> {
    let mut q = shop_service::Entity::find()
        .filter(shop_service::Column::BarbershopId.eq(barbershop_id))
        .filter(ieq::<shop_service::Entity>(shop_service::Column::Name, name));
    if let Some(id) = exclude {
        q = q.filter(shop_service::Column::Id.ne(id));
    }
    if q.one(db).await?.is_some() {
        return Err(ServiceError::conflict(format!("a service named '{name}' already exists")));
    }
    Ok(())
}

pub async fn find_owned<C: ConnectionTrait>(db: &C, barbershop_id: Uuid, id: Uuid) -> ServiceResult<shop_service::Model> {
    shop_service::Entity::find_by_id(id)
        .filter(shop_service::Column::BarbershopId.eq(barbershop_id))
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("service"))
}

fn entry(action: ActionType, s: &shop_service::Model) -> NewActivity {
    let verb = match action {
        ActionType::ServiceAdded => "added",
        ActionType::ServiceDeleted => "deleted",
        _ => "updated",
    };
    NewActivity::new(s.barbershop_id, action, format!("Service {} {}", s.name, verb))
        .metadata(json!({ "service_id": s.id, "price": s.price }))
}

pub async fn create(db: &DatabaseConnection, barbershop_id: Uuid, input: ServiceInput) -> ServiceResult<ShopServiceView> {
    let name = check_name(&input.name)?;
    ensure_name_free(db, barbershop_id, &name, None).await?;
    let now = Utc::now();
    let am = shop_service::ActiveModel {
        id: Set(Uuid::new_v4()),
        barbershop_id: Set(barbershop_id),
        name: Set(name),
        price: Set(validate::positive_money("price", input.price)?),
        description: Set(input.description.filter(|d| !d.trim().is_empty())),
        is_active: Set(input.is_active.unwrap_or(true)),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };
    let created = am.insert(db).await?;
    activity::log(db, entry(ActionType::ServiceAdded, &created)).await?;
    Ok(created.view())
}

pub async fn list(db: &DatabaseConnection, barbershop_id: Uuid, filter: ServiceFilter) -> ServiceResult<Vec<ShopServiceView>> {
    let mut q = shop_service::Entity::find().filter(shop_service::Column::BarbershopId.eq(barbershop_id));
    if let Some(active) = filter.is_active {
        q = q.filter(shop_service::Column::IsActive.eq(active));
    }
    if let Some(s) = term(&filter.search) {
        q = q.filter(icontains::<shop_service::Entity>(shop_service::Column::Name, s));
    }
    let rows = q.order_by_asc(shop_service::Column::Name).all(db).await?;
    Ok(rows.into_iter().map(shop_service::Model::view).collect())
}

pub async fn active(db: &DatabaseConnection, barbershop_id: Uuid) -> ServiceResult<Vec<ShopServiceView>> {
    list(db, barbershop_id, ServiceFilter { is_active: Some(true), search: None }).await
}

pub async fn get(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<ShopServiceView> {
    Ok(find_owned(db, barbershop_id, id).await?.view())
}

pub async fn update(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid, patch: ServicePatch) -> ServiceResult<ShopServiceView> {
    let current = find_owned(db, barbershop_id, id).await?;
    let mut am: shop_service::ActiveModel = current.into();
    if let Some(v) = patch.name {
        let name = check_name(&v)?;
        ensure_name_free(db, barbershop_id, &name, Some(id)).await?;
        am.name = Set(name);
    }
    if let Some(v) = patch.price {
        am.price = Set(validate::positive_money("price", v)?);
    }
    if let Some(v) = patch.description {
        am.description = Set(Some(v).filter(|d| !d.trim().is_empty()));
    }
    if let Some(v) = patch.is_active {
        am.is_active = Set(v);
    }
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    activity::log(db, entry(ActionType::ServiceUpdated, &updated)).await?;
    Ok(updated.view())
}

pub async fn delete(db: &DatabaseConnection, barbershop_id: Uuid, id: Uuid) -> ServiceResult<()> {
    let found = find_owned(db, barbershop_id, id).await?;
    shop_service::Entity::delete_by_id(found.id).exec(db).await?;
    activity::log(db, entry(ActionType::ServiceDeleted, &found)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_barbershop};

    fn fade(name: &str, price: f64) -> ServiceInput {
        ServiceInput { name: name.into(), price, description: None, is_active: None }
    }

    #[tokio::test]
    async fn names_are_unique_ignoring_case() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = get_db().await?;
        let shop = seed_barbershop(&db).await?;

        let created = create(&db, shop.id, fade("Skin Fade", 250.0)).await?;
        assert_eq!(created.formatted_price, "₹250.00");
        assert!(matches!(create(&db, shop.id, fade("skin fade", 300.0)).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(create(&db, shop.id, fade("Beard Trim", 0.0)).await, Err(ServiceError::Model(_))));

        let trim = create(&db, shop.id, fade("Beard Trim", 120.0)).await?;
        update(&db, shop.id, trim.service.id, ServicePatch { is_active: Some(false), ..Default::default() }).await?;
        let names: Vec<String> = active(&db, shop.id).await?.into_iter().map(|s| s.service.name).collect();
        assert_eq!(names, vec!["Skin Fade".to_string()]);

        let found = list(&db, shop.id, ServiceFilter { search: Some("BEARD".into()), ..Default::default() }).await?;
        assert_eq!(found.len(), 1);

        delete(&db, shop.id, trim.service.id).await?;
        assert!(matches!(get(&db, shop.id, trim.service.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
