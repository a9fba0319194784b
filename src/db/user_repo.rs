// src/db/user_repo.rs

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{AppError, RepositoryError},
    models::auth::User,
};

/// Leitura do perfil de credenciais, do ponto de vista do núcleo de ponto.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserProfileRepository: Send + Sync {
    /// PIN configurado do usuário; `None` se não houver PIN (ou usuário).
    async fn get_pin(&self, user_id: Uuid) -> Result<Option<String>, RepositoryError>;
}

/// Consultas de conta usadas pelo cadastro, login e perfil.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// E-mail duplicado vira `EmailAlreadyExists`.
    async fn create_user(&self, name: &str, email: &str, hashed_password: &str) -> Result<User, AppError>;

    /// Atualiza o nome e, se informado, o hash da senha.
    async fn update_profile(&self, id: Uuid, name: &str, new_password_hash: Option<String>) -> Result<User, AppError>;

    /// Retorna false quando o usuário não existe.
    async fn set_pin(&self, id: Uuid, pin: &str) -> Result<bool, AppError>;
}

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for UserRepository {
    // Busca um usuário pelo seu e-mail
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    // Busca um usuário pelo seu ID
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    // Cria um novo usuário no banco de dados
    async fn create_user(&self, name: &str, email: &str, hashed_password: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(name)
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            AppError::DatabaseError(e)
        })
    }

    async fn update_profile(&self, id: Uuid, name: &str, new_password_hash: Option<String>) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = $2,
                password_hash = COALESCE($3, password_hash),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(new_password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::UserNotFound)
    }

    async fn set_pin(&self, id: Uuid, pin: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET pin = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(pin)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserProfileRepository for UserRepository {
    async fn get_pin(&self, user_id: Uuid) -> Result<Option<String>, RepositoryError> {
        let pin: Option<Option<String>> =
            sqlx::query_scalar("SELECT pin FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(pin.flatten())
    }
}
