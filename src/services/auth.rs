// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccountRepository,
    models::auth::{AuthResponse, Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn AccountRepository>,
    jwt_secret: String,
    token_ttl: Duration,
}

// Hash e verificação são CPU-bound: rodam fora do runtime async.
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn AccountRepository>, jwt_secret: String, token_ttl: Duration) -> Self {
        Self {
            user_repo,
            jwt_secret,
            token_ttl,
        }
    }

    pub async fn register_user(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        if self.user_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let hashed_password = hash_password(password).await?;
        let new_user = self.user_repo.create_user(name, email, &hashed_password).await?;

        tracing::info!(user_id = %new_user.id, "usuário registrado");
        self.auth_response(&new_user)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        self.auth_response(&user)
    }

    /// Decodifica o token de sessão. Não consulta o banco.
    pub fn validate_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map(|token_data| token_data.claims)
        .map_err(|_| AppError::InvalidToken)
    }

    pub fn issue_token(&self, user_id: Uuid, email: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    fn auth_response(&self, user: &User) -> Result<AuthResponse, AppError> {
        Ok(AuthResponse {
            token: self.issue_token(user.id, &user.email)?,
            user: user.summary(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockAccountRepository;

    fn service(secret: &str, ttl: Duration) -> AuthService {
        AuthService::new(Arc::new(MockAccountRepository::new()), secret.to_string(), ttl)
    }

    fn with_accounts(accounts: MockAccountRepository) -> AuthService {
        AuthService::new(Arc::new(accounts), "segredo-de-teste".to_string(), Duration::hours(1))
    }

    fn stored_user(email: &str, password_hash: String) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: "Maria Souza".to_string(),
            password_hash,
            pin: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn issued_token_round_trips_its_claims() {
        let auth = service("segredo-de-teste", Duration::hours(24));
        let user_id = Uuid::new_v4();

        let token = auth.issue_token(user_id, "maria@empresa.com.br").expect("token");
        let claims = auth.validate_token(&token).expect("token válido");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "maria@empresa.com.br");
        assert!(claims.exp > claims.iat);
    }

    #[tokio::test]
    async fn token_signed_with_another_secret_is_rejected() {
        let issuer = service("segredo-a", Duration::hours(24));
        let checker = service("segredo-b", Duration::hours(24));

        let token = issuer.issue_token(Uuid::new_v4(), "a@b.com").expect("token");

        assert!(matches!(checker.validate_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let auth = service("segredo-de-teste", Duration::hours(-2));

        let token = auth.issue_token(Uuid::new_v4(), "a@b.com").expect("token");

        assert!(matches!(auth.validate_token(&token), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn password_hash_verifies_only_its_password() {
        let hashed = hash_password("senha-forte").await.expect("hash");

        assert!(verify_password("senha-forte", &hashed).await.expect("verify"));
        assert!(!verify_password("outra-senha", &hashed).await.expect("verify"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_creating_the_user() {
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .once()
            .returning(|email| Ok(Some(stored_user(email, "hash".to_string()))));
        accounts.expect_create_user().never();

        let result = with_accounts(accounts)
            .register_user("Maria", "maria@empresa.com.br", "senha-forte")
            .await;

        assert!(matches!(result, Err(AppError::EmailAlreadyExists)), "got {result:?}");
        assert_eq!(AppError::EmailAlreadyExists.status(), axum::http::StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn new_email_is_created_with_a_hashed_password() -> testresult::TestResult {
        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_email().once().returning(|_| Ok(None));
        accounts
            .expect_create_user()
            .once()
            .returning(|_, email, hashed| Ok(stored_user(email, hashed.to_string())));
        let auth = with_accounts(accounts);

        let response = auth.register_user("Maria", "maria@empresa.com.br", "senha-forte").await?;

        assert_eq!(response.user.email, "maria@empresa.com.br");
        assert_eq!(auth.validate_token(&response.token)?.sub, response.user.id);
        Ok(())
    }

    #[tokio::test]
    async fn login_with_wrong_password_or_unknown_email_is_invalid_credentials() -> testresult::TestResult {
        let hashed = hash_password("senha-forte").await?;
        let mut accounts = MockAccountRepository::new();
        accounts
            .expect_find_by_email()
            .once()
            .returning(move |email| Ok(Some(stored_user(email, hashed.clone()))));
        let result = with_accounts(accounts).login_user("maria@empresa.com.br", "outra-senha").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)), "got {result:?}");

        let mut accounts = MockAccountRepository::new();
        accounts.expect_find_by_email().once().returning(|_| Ok(None));
        let result = with_accounts(accounts).login_user("ninguem@empresa.com.br", "senha-forte").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)), "got {result:?}");
        Ok(())
    }
}
