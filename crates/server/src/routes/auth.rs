use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use service::auth::domain::{Claims, LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};

use crate::envelope::Envelope;
use crate::errors::ApiError;

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

impl ServerState {
    /// Auth service wired to the SeaORM repository.
    pub fn auth_service(&self) -> AuthService<SeaOrmAuthRepository> {
        let repo = Arc::new(SeaOrmAuthRepository { db: self.db.clone() });
        AuthService::new(
            repo,
            AuthConfig {
                jwt_secret: Some(self.auth.jwt_secret.clone()),
                password_algorithm: "argon2".into(),
                token_ttl_hours: self.auth.token_ttl_hours,
            },
        )
    }
}

/// Identity decoded from the bearer token, injected into request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "valid email is required"))]
    pub email: String,
    #[validate(length(min = 2, message = "name must be at least 2 characters"))]
    pub name: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserOut {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginOut {
    pub token: String,
    pub user: UserOut,
}

impl From<service::auth::domain::AuthUser> for UserOut {
    fn from(u: service::auth::domain::AuthUser) -> Self {
        Self { id: u.id, email: u.email, name: u.name, role: u.role }
    }
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered"),
        (status = 400, description = "Validation errors"),
        (status = 409, description = "Email already registered"),
    ))]
pub async fn register(
    State(state): State<ServerState>,
    Json(input): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Envelope<UserOut>>), ApiError> {
    input.validate()?;

    let svc = state.auth_service();
    let user = svc
        .register(RegisterInput { email: input.email, name: input.name, password: input.password })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::message_with_data("user registered successfully", user.into())),
    ))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in"),
        (status = 400, description = "Validation errors"),
        (status = 401, description = "Invalid credentials"),
    ))]
pub async fn login(
    State(state): State<ServerState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<Envelope<LoginOut>>, ApiError> {
    input.validate()?;

    let svc = state.auth_service();
    let session = svc
        .login(LoginInput { email: input.email, password: input.password })
        .await?;

    let token = session
        .token
        .ok_or_else(|| ApiError::internal(anyhow::anyhow!("token generation failed")))?;
    let out = LoginOut { token, user: session.user.into() };
    Ok(Json(Envelope::message_with_data("login successful", out)))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "auth",
    responses(
        (status = 200, description = "Current user"),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_token" = [])))]
pub async fn me(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<Envelope<crate::routes::users::UserDetail>>, ApiError> {
    let user = service::user_service::get_user(&state.db, current.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".into()))?;
    Ok(Json(Envelope::data(user.into())))
}

/// Bearer-token guard for protected routes. Decodes the JWT with the shared
/// secret and injects `CurrentUser` into request extensions.
pub async fn require_bearer_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("authentication required".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| {
            tracing::warn!(path = %req.uri().path(), "invalid Authorization format (expect Bearer)");
            ApiError::Unauthorized("invalid authorization header".into())
        })?;

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::warn!(path = %req.uri().path(), err = %e, "token validation failed");
        match e.kind() {
            ErrorKind::ExpiredSignature => ApiError::Unauthorized("token expired".into()),
            _ => ApiError::Unauthorized("invalid token".into()),
        }
    })?;

    let id = Uuid::parse_str(&data.claims.uid)
        .map_err(|_| ApiError::Unauthorized("invalid token".into()))?;
    req.extensions_mut().insert(CurrentUser {
        id,
        email: data.claims.sub,
        role: data.claims.role,
    });

    Ok(next.run(req).await)
}
