use std::{collections::HashMap, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// Falhas da camada de armazenamento. O serviço decide se viram
// PersistenceFailure (escrita) ou QueryFailure (leitura).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Erro de banco de dados: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Tempo limite de {0:?} excedido")]
    Timeout(Duration),
}

// Motivos de recusa de um verificador de credencial.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Credencial não fornecida")]
    MissingCredential,

    #[error("Credencial em formato inválido")]
    MalformedCredential,

    #[error("Credencial não configurada")]
    NotConfigured,

    #[error("Credencial inválida")]
    InvalidCredential,

    #[error("Falha ao consultar o perfil: {0}")]
    Lookup(#[source] RepositoryError),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Corpo da requisição inválido: {0}")]
    MalformedPayload(String),

    #[error("Tipo de registro inválido: {0}")]
    InvalidEventType(String),

    #[error("Método de autenticação inválido: {0}")]
    UnsupportedAuthMethod(String),

    #[error("Credencial não fornecida")]
    MissingCredential,

    #[error("Credencial em formato inválido")]
    MalformedCredential,

    #[error("Não autorizado: {0}")]
    Unauthorized(#[source] CredentialError),

    #[error("Falha ao gravar registro: {0}")]
    PersistenceFailure(#[source] RepositoryError),

    #[error("Falha ao buscar registros: {0}")]
    QueryFailure(#[source] RepositoryError),

    #[error("Período inválido")]
    InvalidPeriod,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Senha atual incorreta")]
    CurrentPasswordMismatch,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("PIN inválido")]
    InvalidPin,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Fonte não encontrada: {0}")]
    FontNotFound(String),

    #[error("Falha ao gerar relatório: {0}")]
    ReportError(String),
}

impl From<CredentialError> for AppError {
    // Formato ruim ou ausência são erros de validação (400); o resto vira
    // Unauthorized, exceto falha de leitura do perfil, que é erro de consulta.
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::MissingCredential => AppError::MissingCredential,
            CredentialError::MalformedCredential => AppError::MalformedCredential,
            CredentialError::Lookup(source) => AppError::QueryFailure(source),
            reason => AppError::Unauthorized(reason),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MalformedPayload(_)
            | AppError::InvalidEventType(_)
            | AppError::UnsupportedAuthMethod(_)
            | AppError::MissingCredential
            | AppError::MalformedCredential
            | AppError::InvalidPeriod
            | AppError::InvalidPin => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_)
            | AppError::InvalidCredentials
            | AppError::CurrentPasswordMismatch
            | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound => StatusCode::NOT_FOUND,
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Chave da mensagem no catálogo de idiomas.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::MalformedPayload(_) => "malformed_payload",
            AppError::InvalidEventType(_) => "invalid_event_type",
            AppError::UnsupportedAuthMethod(_) => "unsupported_auth_method",
            AppError::MissingCredential => "missing_credential",
            AppError::MalformedCredential => "malformed_credential",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::PersistenceFailure(_) => "persistence_failure",
            AppError::QueryFailure(_) => "query_failure",
            AppError::InvalidPeriod => "invalid_period",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::CurrentPasswordMismatch => "current_password_mismatch",
            AppError::InvalidToken => "invalid_token",
            AppError::UserNotFound => "user_not_found",
            AppError::InvalidPin => "invalid_pin",
            _ => "internal_error",
        }
    }

    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            // O cliente recebe só a mensagem genérica; o detalhe fica no log.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(details)
            }
            _ => None,
        };

        ApiError {
            status,
            message: store.translate(&locale.0, self.code()),
            details,
        }
    }
}

// Erro já pronto para o cliente: status HTTP + mensagem traduzida.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Vec<String>>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.message, "details": details }),
            None => json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}
