// src/routes.rs

use axum::{
    http::{header, HeaderName, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Qualquer origem; métodos e cabeçalhos explícitos
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS, Method::GET, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::ACCEPT_ENCODING,
            HeaderName::from_static("x-csrf-token"),
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            header::CACHE_CONTROL,
            HeaderName::from_static("x-requested-with"),
        ]);

    // Rotas públicas
    let public_routes = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/register", post(handlers::auth::register))
        .route("/api/login", post(handlers::auth::login));

    // Rotas protegidas pelo token da sessão
    let protected_routes = Router::new()
        .route("/api/register-point", post(handlers::points::register_point))
        .route("/api/points/today", get(handlers::points::today))
        .route("/api/points/monthly", get(handlers::points::monthly))
        .route("/api/points/statistics", get(handlers::points::statistics))
        .route("/api/points/monthly/report.csv", get(handlers::points::monthly_report_csv))
        .route("/api/points/monthly/report.pdf", get(handlers::points::monthly_report_pdf))
        .route(
            "/api/profile",
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        .route("/api/setup-pin", post(handlers::users::setup_pin))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
