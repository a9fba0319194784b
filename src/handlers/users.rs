// src/handlers/users.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{
        MessageResponse, ProfileResponse, SetupPinPayload, UpdateProfilePayload, UpdateProfileResponse,
    },
};

// GET /api/profile
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Users",
    responses(
        (status = 200, description = "Perfil do usuário autenticado", body = ProfileResponse),
        (status = 401, description = "Não autorizado"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let user = app_state
        .user_service
        .get_profile(session.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(ProfileResponse::from(user))))
}

// PUT /api/profile
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Users",
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = UpdateProfileResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Não autorizado ou senha atual incorreta")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_profile(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state
        .user_service
        .update_profile(session.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(UpdateProfileResponse {
            message: app_state.i18n_store.translate(&locale.0, "profile_updated"),
            user: user.summary(),
        }),
    ))
}

// POST /api/setup-pin
#[utoipa::path(
    post,
    path = "/api/setup-pin",
    tag = "Users",
    request_body = SetupPinPayload,
    responses(
        (status = 200, description = "PIN configurado", body = MessageResponse),
        (status = 400, description = "PIN deve ter de 4 a 6 dígitos"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn setup_pin(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    Json(payload): Json<SetupPinPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .user_service
        .setup_pin(session.id, &payload.pin)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: app_state.i18n_store.translate(&locale.0, "pin_configured"),
        }),
    ))
}
