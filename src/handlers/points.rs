// src/handlers/points.rs

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::attendance::{
        AttendanceRecord, DayRecords, MonthlyStatistics, PeriodQuery, RegisterPointPayload, RegisterPointResponse,
    },
    services::calendar::current_period,
};

type PeriodParams = Result<Query<PeriodQuery>, QueryRejection>;

// Query malformada ("month=abc") vira o mesmo erro de período inválido
fn required_period(params: PeriodParams) -> Result<(i32, u32), AppError> {
    match params {
        Ok(Query(PeriodQuery { year: Some(year), month: Some(month) })) => Ok((year, month)),
        _ => Err(AppError::InvalidPeriod),
    }
}

// Ano e mês informados, ou o mês local corrente quando ambos faltam
fn resolve_period(app_state: &AppState, params: PeriodParams) -> Result<(i32, u32), AppError> {
    match params {
        Ok(Query(PeriodQuery { year: None, month: None })) => Ok(current_period(Utc::now(), app_state.config.timezone)),
        other => required_period(other),
    }
}

// POST /api/register-point
#[utoipa::path(
    post,
    path = "/api/register-point",
    tag = "Points",
    request_body = RegisterPointPayload,
    responses(
        (status = 201, description = "Ponto registrado", body = RegisterPointResponse),
        (status = 400, description = "Corpo, tipo, método ou credencial inválidos"),
        (status = 401, description = "Credencial recusada"),
        (status = 500, description = "Falha ao gravar o registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_point(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    payload: Result<Json<RegisterPointPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    tracing::debug!(user = %session.email, "registro de ponto solicitado");

    // Corpo que nem é JSON responde 400 no mesmo formato dos outros erros
    let Json(payload) = payload.map_err(|rejection| {
        tracing::warn!(user = %session.email, %rejection, "corpo de registro de ponto rejeitado");
        AppError::MalformedPayload(rejection.body_text()).to_api_error(&locale, &app_state.i18n_store)
    })?;

    let record = app_state
        .admission_service
        .admit(session.id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let response = RegisterPointResponse {
        id: record.id,
        message: app_state.i18n_store.translate(&locale.0, "point_registered"),
        timestamp: record.timestamp,
        event_type: record.event_type,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

// GET /api/points/today
#[utoipa::path(
    get,
    path = "/api/points/today",
    tag = "Points",
    responses(
        (status = 200, description = "Registros do dia local corrente", body = Vec<AttendanceRecord>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn today(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let records = app_state
        .attendance_service
        .today(session.id, Utc::now())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(records)))
}

// GET /api/points/monthly?year=2025&month=3
#[utoipa::path(
    get,
    path = "/api/points/monthly",
    tag = "Points",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Registros do mês agrupados por dia", body = Vec<DayRecords>),
        (status = 400, description = "Período inválido"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    params: PeriodParams,
) -> Result<impl IntoResponse, ApiError> {
    let (year, month) = required_period(params).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let days = app_state
        .attendance_service
        .monthly(session.id, year, month)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(days)))
}

// GET /api/points/statistics
#[utoipa::path(
    get,
    path = "/api/points/statistics",
    tag = "Points",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Estatísticas do mês", body = MonthlyStatistics),
        (status = 400, description = "Período inválido"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn statistics(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    params: PeriodParams,
) -> Result<impl IntoResponse, ApiError> {
    let (year, month) =
        resolve_period(&app_state, params).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let stats = app_state
        .attendance_service
        .statistics(session.id, year, month)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/points/monthly/report.csv
#[utoipa::path(
    get,
    path = "/api/points/monthly/report.csv",
    tag = "Points",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Relatório mensal em CSV", content_type = "text/csv", body = String),
        (status = 400, description = "Período inválido"),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_report_csv(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    params: PeriodParams,
) -> Result<Response, ApiError> {
    let (year, month) =
        resolve_period(&app_state, params).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let days = app_state
        .attendance_service
        .monthly(session.id, year, month)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let csv = app_state.report_service.monthly_csv(&days);

    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"ponto_{}_{:02}.csv\"", year, month),
        ),
    ];

    Ok((headers, csv).into_response())
}

// GET /api/points/monthly/report.pdf
#[utoipa::path(
    get,
    path = "/api/points/monthly/report.pdf",
    tag = "Points",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Relatório mensal em PDF", content_type = "application/pdf"),
        (status = 400, description = "Período inválido"),
        (status = 401, description = "Não autorizado"),
        (status = 500, description = "Falha ao gerar o PDF")
    ),
    security(("api_jwt" = []))
)]
pub async fn monthly_report_pdf(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(session): AuthenticatedUser,
    params: PeriodParams,
) -> Result<Response, ApiError> {
    let (year, month) =
        resolve_period(&app_state, params).map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let records = app_state
        .attendance_service
        .month_records(session.id, year, month)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let stats = app_state
        .attendance_service
        .summarize(&records, year, month)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let days = app_state.attendance_service.group(&records);

    let pdf_bytes = app_state
        .report_service
        .monthly_pdf(year, month, &stats, &days)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"ponto_{}_{:02}.pdf\"", year, month),
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}
