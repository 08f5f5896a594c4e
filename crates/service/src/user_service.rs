use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder};
use uuid::Uuid;

use crate::{errors::ServiceError, pagination::Pagination};
use models::user;

/// Get a user by id.
pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<Option<user::Model>, ServiceError> {
    let found = user::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::from_db_err)?;
    Ok(found)
}

/// List users, newest first, with pagination.
pub async fn list_users(
    db: &DatabaseConnection,
    opts: Pagination,
) -> Result<Vec<user::Model>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(ServiceError::from_db_err)?;
    Ok(users)
}
