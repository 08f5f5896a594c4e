use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

struct BearerToken;

impl Modify for BearerToken {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::me,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::products::create_product,
        crate::routes::products::list_products,
        crate::routes::products::get_product,
        crate::routes::products::update_product,
        crate::routes::products::delete_product,
    ),
    components(
        schemas(
            crate::routes::auth::RegisterRequest,
            crate::routes::auth::LoginRequest,
            crate::routes::auth::UserOut,
            crate::routes::auth::LoginOut,
            crate::routes::users::UserDetail,
            crate::routes::products::CreateProductRequest,
            crate::routes::products::UpdateProductRequest,
            crate::routes::products::ProductOut,
            crate::routes::products::OwnerOut,
            crate::routes::products::ProductDetail,
            crate::errors::FieldError,
        )
    ),
    modifiers(&BearerToken),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "users"),
        (name = "products")
    )
)]
pub struct ApiDoc;
