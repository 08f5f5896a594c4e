use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use jsonwebtoken::{encode, EncodingKey, Header as JwtHeader};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};

use super::domain::{AuthSession, AuthUser, Claims, LoginInput, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;

use models::user::ROLE_USER;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
    pub token_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwt_secret: None, password_algorithm: "argon2".into(), token_ttl_hours: 12 }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new user with a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig::default());
    /// let input = RegisterInput { email: "user@example.com".into(), name: "Test".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthUser, AuthError> {
        if input.password.len() < 6 {
            return Err(AuthError::Validation("password too short (>=6)".into()));
        }
        if let Some(existing) = self.repo.find_user_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let user = self.repo.create_user(&input.email, &input.name, ROLE_USER).await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        Ok(user)
    }

    /// Authenticate a user and optionally issue a token.
    ///
    /// A missing user and a wrong password both map to `AuthError::Unauthorized`
    /// so callers cannot tell which field was wrong.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()), ..AuthConfig::default() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { email: "u@e.com".into(), name: "N".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_email(&input.email)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            token = Some(self.issue_token(&user, secret)?);
        }

        info!(user_id = %user.id, email = %user.email, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    fn issue_token(&self, user: &AuthUser, secret: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let exp = now + chrono::Duration::hours(self.cfg.token_ttl_hours);
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id.to_string(),
            role: user.role.clone(),
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };
        encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::mock::MockAuthRepository;
    use jsonwebtoken::{decode, DecodingKey, Validation};

    fn svc_with_secret() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: Some("test-secret".into()), ..AuthConfig::default() },
        )
    }

    fn register_input(email: &str) -> RegisterInput {
        RegisterInput { email: email.into(), name: "Tester".into(), password: "S3curePass".into() }
    }

    #[tokio::test]
    async fn register_assigns_default_role() {
        let svc = svc_with_secret();
        let user = svc.register(register_input("a@example.com")).await.unwrap();
        assert_eq!(user.role, ROLE_USER);
    }

    #[tokio::test]
    async fn register_duplicate_email_is_conflict() {
        let svc = svc_with_secret();
        svc.register(register_input("dup@example.com")).await.unwrap();
        let err = svc.register(register_input("dup@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn register_rejects_short_password() {
        let svc = svc_with_secret();
        let err = svc
            .register(RegisterInput { email: "s@example.com".into(), name: "S".into(), password: "abc".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn login_wrong_password_is_generic_unauthorized() {
        let svc = svc_with_secret();
        svc.register(register_input("w@example.com")).await.unwrap();
        let err = svc
            .login(LoginInput { email: "w@example.com".into(), password: "wrong-password".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
        // Message must not reveal which field failed
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[tokio::test]
    async fn login_unknown_email_is_generic_unauthorized() {
        let svc = svc_with_secret();
        let err = svc
            .login(LoginInput { email: "nobody@example.com".into(), password: "whatever".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
        assert_eq!(err.to_string(), "invalid credentials");
    }

    #[tokio::test]
    async fn issued_token_carries_identity_claims() {
        let svc = svc_with_secret();
        let user = svc.register(register_input("claims@example.com")).await.unwrap();
        let session = svc
            .login(LoginInput { email: "claims@example.com".into(), password: "S3curePass".into() })
            .await
            .unwrap();

        let token = session.token.expect("token issued when secret configured");
        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("test-secret".as_bytes()),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(data.claims.sub, "claims@example.com");
        assert_eq!(data.claims.uid, user.id.to_string());
        assert_eq!(data.claims.role, ROLE_USER);
        assert!(data.claims.exp > data.claims.iat);
    }

    #[tokio::test]
    async fn login_without_secret_yields_no_token() {
        let svc = AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig::default(),
        );
        svc.register(register_input("plain@example.com")).await.unwrap();
        let session = svc
            .login(LoginInput { email: "plain@example.com".into(), password: "S3curePass".into() })
            .await
            .unwrap();
        assert!(session.token.is_none());
    }
}
