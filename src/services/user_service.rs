// src/services/user_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AccountRepository,
    models::auth::{UpdateProfilePayload, User},
    services::auth::{hash_password, verify_password},
};

// PIN de ponto: 4 a 6 dígitos ASCII
pub fn is_valid_pin(pin: &str) -> bool {
    (4..=6).contains(&pin.len()) && pin.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Clone)]
pub struct UserService {
    user_repo: Arc<dyn AccountRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<dyn AccountRepository>) -> Self {
        Self { user_repo }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> Result<User, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    pub async fn update_profile(&self, user_id: Uuid, payload: &UpdateProfilePayload) -> Result<User, AppError> {
        let user = self.get_profile(user_id).await?;

        let new_hash = match payload.new_password.as_deref().filter(|p| !p.is_empty()) {
            Some(new_password) => {
                let current = payload.current_password.as_deref().unwrap_or_default();
                if !verify_password(current, &user.password_hash).await? {
                    return Err(AppError::CurrentPasswordMismatch);
                }
                Some(hash_password(new_password).await?)
            }
            None => None,
        };

        self.user_repo
            .update_profile(user_id, &payload.name, new_hash)
            .await
    }

    pub async fn setup_pin(&self, user_id: Uuid, pin: &str) -> Result<(), AppError> {
        if !is_valid_pin(pin) {
            return Err(AppError::InvalidPin);
        }

        if !self.user_repo.set_pin(user_id, pin).await? {
            return Err(AppError::UserNotFound);
        }

        tracing::info!(user_id = %user_id, "PIN configurado");
        Ok(())
    }
}
