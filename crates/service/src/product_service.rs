use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::info;
use uuid::Uuid;

use crate::{errors::ServiceError, pagination::Pagination};
use models::{product, user};

/// New product payload, already validated at the transport layer.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

/// Listing filters; price bounds are inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductFilters {
    pub user_id: Option<Uuid>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

/// Only the owning user may mutate or delete a product.
fn ensure_owner(owner_id: Uuid, requester_id: Uuid) -> Result<(), ServiceError> {
    if owner_id != requester_id {
        return Err(ServiceError::Forbidden("not the owner of this product".into()));
    }
    Ok(())
}

/// Create a product owned by `owner_id`.
pub async fn create_product(
    db: &DatabaseConnection,
    owner_id: Uuid,
    input: NewProduct,
) -> Result<product::Model, ServiceError> {
    let created = product::create(db, owner_id, &input.name, input.description, input.price, input.stock).await?;
    info!(product_id = %created.id, owner_id = %owner_id, "product_created");
    Ok(created)
}

/// List products, newest first, applying the optional filters.
pub async fn list_products(
    db: &DatabaseConnection,
    filters: ProductFilters,
    opts: Pagination,
) -> Result<Vec<product::Model>, ServiceError> {
    let mut query = product::Entity::find();
    if let Some(uid) = filters.user_id {
        query = query.filter(product::Column::UserId.eq(uid));
    }
    if let Some(min) = filters.min_price {
        query = query.filter(product::Column::Price.gte(min));
    }
    if let Some(max) = filters.max_price {
        query = query.filter(product::Column::Price.lte(max));
    }
    let (page_idx, per_page) = opts.normalize();
    let rows = query
        .order_by_desc(product::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::from_db_err)?;
    Ok(rows)
}

/// Get a product together with its owner.
pub async fn get_product(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<(product::Model, Option<user::Model>), ServiceError> {
    let found = product::Entity::find_by_id(id)
        .find_also_related(user::Entity)
        .one(db)
        .await
        .map_err(ServiceError::from_db_err)?
        .ok_or_else(|| ServiceError::not_found("product"))?;
    Ok(found)
}

/// Update a product; the requester must own it.
pub async fn update_product(
    db: &DatabaseConnection,
    id: Uuid,
    requester_id: Uuid,
    patch: ProductPatch,
) -> Result<product::Model, ServiceError> {
    let existing = product::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db_err)?
        .ok_or_else(|| ServiceError::not_found("product"))?;

    ensure_owner(existing.user_id, requester_id)?;

    let mut am: product::ActiveModel = existing.into();
    if let Some(name) = patch.name {
        product::validate_product_name(&name)?;
        am.name = Set(name);
    }
    if let Some(description) = patch.description {
        am.description = Set(Some(description));
    }
    if let Some(price) = patch.price {
        if price < Decimal::ZERO {
            return Err(ServiceError::Validation("price must be >= 0".into()));
        }
        am.price = Set(price);
    }
    if let Some(stock) = patch.stock {
        if stock < 0 {
            return Err(ServiceError::Validation("stock must be >= 0".into()));
        }
        am.stock = Set(stock);
    }
    am.updated_at = Set(chrono::Utc::now().into());

    let updated = am.update(db).await.map_err(ServiceError::from_db_err)?;
    info!(product_id = %updated.id, requester_id = %requester_id, "product_updated");
    Ok(updated)
}

/// Delete a product; the requester must own it.
pub async fn delete_product(
    db: &DatabaseConnection,
    id: Uuid,
    requester_id: Uuid,
) -> Result<(), ServiceError> {
    let existing = product::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db_err)?
        .ok_or_else(|| ServiceError::not_found("product"))?;

    ensure_owner(existing.user_id, requester_id)?;

    product::hard_delete(db, id).await?;
    info!(product_id = %id, requester_id = %requester_id, "product_deleted");
    Ok(())
}
