// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::users::get_profile,
        handlers::users::update_profile,
        handlers::users::setup_pin,

        // --- Points ---
        handlers::points::register_point,
        handlers::points::today,
        handlers::points::monthly,
        handlers::points::statistics,
        handlers::points::monthly_report_csv,
        handlers::points::monthly_report_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::UserSummary,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::ProfileResponse,
            models::auth::UpdateProfilePayload,
            models::auth::UpdateProfileResponse,
            models::auth::SetupPinPayload,
            models::auth::MessageResponse,

            // --- Points ---
            models::attendance::EventType,
            models::attendance::AuthMethod,
            models::attendance::AttendanceRecord,
            models::attendance::RegisterPointPayload,
            models::attendance::RegisterPointResponse,
            models::attendance::DayRecords,
            models::attendance::AttendanceStatistics,
            models::attendance::MonthlyStatistics,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário, Perfil e PIN"),
        (name = "Points", description = "Registro de Ponto, Consultas e Relatórios")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
