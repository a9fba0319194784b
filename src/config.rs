// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use chrono_tz::Tz;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    db::{AccountRepository, AttendanceRepository, PgAttendanceRepository, UserProfileRepository, UserRepository},
    services::{
        admission_service::AdmissionService,
        aggregation::AttendancePolicy,
        attendance_service::AttendanceService,
        auth::AuthService,
        report_service::ReportService,
        user_service::UserService,
        verifier::{BiometricVerifier, CredentialVerifier, PinVerifier},
    },
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} deve ser definida")]
    Missing(&'static str),

    #[error("{name} inválida: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub timezone: Tz,
    pub late_threshold_hour: u32,
    pub repository_timeout: Duration,
    pub token_ttl: chrono::Duration,
    pub fonts_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| lookup(name).filter(|v| !v.is_empty()).ok_or(ConfigError::Missing(name));
        let or_default = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let timezone_name = or_default("REFERENCE_TIMEZONE", "America/Sao_Paulo");
        let timezone = timezone_name.parse::<Tz>().map_err(|_| ConfigError::Invalid {
            name: "REFERENCE_TIMEZONE",
            value: timezone_name.clone(),
        })?;

        let late_threshold_hour = parse_number::<u32>(&lookup, "LATE_THRESHOLD_HOUR", "9")?;
        if late_threshold_hour > 23 {
            return Err(ConfigError::Invalid {
                name: "LATE_THRESHOLD_HOUR",
                value: late_threshold_hour.to_string(),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            server_addr: or_default("SERVER_ADDR", "0.0.0.0:8080"),
            timezone,
            late_threshold_hour,
            repository_timeout: Duration::from_secs(parse_number(&lookup, "REPOSITORY_TIMEOUT_SECS", "10")?),
            token_ttl: chrono::Duration::hours(parse_number(&lookup, "TOKEN_TTL_HOURS", "24")?),
            fonts_dir: PathBuf::from(or_default("FONTS_DIR", "./fonts")),
        })
    }

    pub fn policy(&self) -> AttendancePolicy {
        AttendancePolicy {
            timezone: self.timezone,
            late_threshold_hour: self.late_threshold_hour,
        }
    }
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<T, ConfigError> {
    let value = lookup(name).unwrap_or_else(|| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { name, value })
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: I18nStore,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub admission_service: AdmissionService,
    pub attendance_service: AttendanceService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(config.repository_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let attendance_repo = Arc::new(PgAttendanceRepository::new(db_pool.clone()));

        Self::assemble(db_pool, config, user_repo.clone(), attendance_repo, user_repo)
    }

    // --- Monta o gráfico de dependências ---
    pub fn assemble(
        db_pool: PgPool,
        config: Config,
        accounts: Arc<dyn AccountRepository>,
        attendance_repo: Arc<dyn AttendanceRepository>,
        profiles: Arc<dyn UserProfileRepository>,
    ) -> anyhow::Result<Self> {
        let i18n_store = I18nStore::new()?;
        let policy = config.policy();

        let verifier = CredentialVerifier::new(PinVerifier::new(profiles, config.repository_timeout), BiometricVerifier);
        let admission_service = AdmissionService::new(attendance_repo.clone(), verifier, config.repository_timeout);
        let attendance_service = AttendanceService::new(attendance_repo, policy, config.repository_timeout);
        let report_service = ReportService::new(config.fonts_dir.clone(), policy);
        let auth_service = AuthService::new(accounts.clone(), config.jwt_secret.clone(), config.token_ttl);
        let user_service = UserService::new(accounts);

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            user_service,
            admission_service,
            attendance_service,
            report_service,
        })
    }
}
