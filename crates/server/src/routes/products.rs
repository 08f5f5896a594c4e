use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use service::pagination::Pagination;
use service::product_service::{self, NewProduct, ProductFilters, ProductPatch};

use crate::envelope::Envelope;
use crate::errors::ApiError;
use crate::routes::auth::{CurrentUser, ServerState};

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(ValidationError::new("price_negative"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 2, max = 200, message = "name must be 2-200 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price", message = "price must be >= 0"))]
    pub price: Decimal,
    #[serde(default)]
    #[validate(range(min = 0, message = "stock must be >= 0"))]
    pub stock: i32,
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 2, max = 200, message = "name must be 2-200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "validate_price", message = "price must be >= 0"))]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "stock must be >= 0"))]
    pub stock: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
pub struct ListProductsQuery {
    /// Restrict to products owned by this user
    pub user_id: Option<Uuid>,
    /// Inclusive lower price bound
    #[validate(custom(function = "validate_price", message = "min_price must be >= 0"))]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    #[validate(custom(function = "validate_price", message = "max_price must be >= 0"))]
    pub max_price: Option<Decimal>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListProductsQuery {
    fn filters(&self) -> ProductFilters {
        ProductFilters { user_id: self.user_id, min_price: self.min_price, max_price: self.max_price }
    }

    fn pagination(&self) -> Pagination {
        let d = Pagination::default();
        Pagination { page: self.page.unwrap_or(d.page), per_page: self.per_page.unwrap_or(d.per_page) }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProductOut {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<models::product::Model> for ProductOut {
    fn from(p: models::product::Model) -> Self {
        Self {
            id: p.id,
            name: p.name,
            description: p.description,
            price: p.price,
            stock: p.stock,
            user_id: p.user_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Owner summary embedded in product detail responses.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct OwnerOut {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductOut,
    pub user: Option<OwnerOut>,
}

#[utoipa::path(post, path = "/api/products", tag = "products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = [])))]
pub async fn create_product(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(input): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Envelope<ProductOut>>), ApiError> {
    input.validate()?;

    let created = product_service::create_product(
        &state.db,
        current.id,
        NewProduct {
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message_with_data("product created successfully", created.into())),
    ))
}

#[utoipa::path(get, path = "/api/products", tag = "products",
    params(ListProductsQuery),
    responses(
        (status = 200, description = "Products, newest first"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = [])))]
pub async fn list_products(
    State(state): State<ServerState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Envelope<Vec<ProductOut>>>, ApiError> {
    query.validate()?;

    let rows = product_service::list_products(&state.db, query.filters(), query.pagination()).await?;
    let out = rows.into_iter().map(ProductOut::from).collect();
    Ok(Json(Envelope::list(out)))
}

#[utoipa::path(get, path = "/api/products/{id}", tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product with owner"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_token" = [])))]
pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<ProductDetail>>, ApiError> {
    let (product, owner) = product_service::get_product(&state.db, id).await?;
    let detail = ProductDetail {
        product: product.into(),
        user: owner.map(|u| OwnerOut { id: u.id, name: u.name, email: u.email }),
    };
    Ok(Json(Envelope::data(detail)))
}

#[utoipa::path(put, path = "/api/products/{id}", tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Product updated"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_token" = [])))]
pub async fn update_product(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProductRequest>,
) -> Result<Json<Envelope<ProductOut>>, ApiError> {
    input.validate()?;

    let updated = product_service::update_product(
        &state.db,
        id,
        current.id,
        ProductPatch {
            name: input.name,
            description: input.description,
            price: input.price,
            stock: input.stock,
        },
    )
    .await?;

    Ok(Json(Envelope::message_with_data("product updated successfully", updated.into())))
}

#[utoipa::path(delete, path = "/api/products/{id}", tag = "products",
    params(("id" = Uuid, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer_token" = [])))]
pub async fn delete_product(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Envelope<()>>, ApiError> {
    product_service::delete_product(&state.db, id, current.id).await?;
    Ok(Json(Envelope::message_only("product deleted successfully")))
}
