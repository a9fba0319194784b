// src/models/attendance.rs

use std::{borrow::Cow, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{postgres::PgRow, FromRow, Row};
use thiserror::Error;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

// --- Enums ---

/// Tipo do evento de ponto. O vocabulário do wire é "entrada"/"saída".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum EventType {
    #[serde(rename = "entrada")]
    ClockIn,
    #[serde(rename = "saída")]
    ClockOut,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::ClockIn => "entrada",
            EventType::ClockOut => "saída",
        }
    }
}

/// Método que admitiu o registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    Pin,
    Biometric,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Pin => "pin",
            AuthMethod::Biometric => "biometric",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("valor desconhecido: {0:?}")]
pub struct UnknownVariant(pub String);

impl FromStr for EventType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "entrada" => Ok(EventType::ClockIn),
            "saída" => Ok(EventType::ClockOut),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl FromStr for AuthMethod {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pin" => Ok(AuthMethod::Pin),
            "biometric" => Ok(AuthMethod::Biometric),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Registros ---

/// Registro de ponto imutável. O `id` é atribuído pelo repositório e o
/// `timestamp` pelo servidor no momento da admissão.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "Web App")]
    pub location: Option<String>,
    pub device: Option<String>,
    pub auth_method: AuthMethod,
}

impl<'r> FromRow<'r, PgRow> for AttendanceRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let event_type: String = row.try_get("event_type")?;
        let auth_method: String = row.try_get("auth_method")?;

        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            event_type: event_type
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            timestamp: row.try_get("timestamp")?,
            location: row.try_get("location")?,
            device: row.try_get("device")?,
            auth_method: auth_method
                .parse()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        })
    }
}

/// Registro ainda sem `id`, entregue ao repositório para inserção.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendanceRecord {
    pub user_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub location: Option<String>,
    pub device: Option<String>,
    pub auth_method: AuthMethod,
}

impl NewAttendanceRecord {
    pub fn into_record(self, id: Uuid) -> AttendanceRecord {
        AttendanceRecord {
            id,
            user_id: self.user_id,
            event_type: self.event_type,
            timestamp: self.timestamp,
            location: self.location,
            device: self.device,
            auth_method: self.auth_method,
        }
    }
}

// --- Payloads ---

// Os campos chegam como JSON livre: `"type": null` ou `"type": 1` também
// passam pela admissão, que valida na ordem tipo -> método -> credencial.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPointPayload {
    #[serde(rename = "type", alias = "eventType", default)]
    #[schema(value_type = Option<String>, example = "entrada")]
    pub event_type: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "pin")]
    pub auth_method: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "1234")]
    pub pin: Option<Value>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub biometric_token: Option<Value>,
    pub location: Option<String>,
    pub device: Option<String>,
}

/// Texto de um campo do payload. Ausente ou null vira "", outros tipos
/// viram a própria representação JSON.
pub fn wire_text(value: Option<&Value>) -> Cow<'_, str> {
    match value {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(text)) => Cow::Borrowed(text.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterPointResponse {
    pub id: Uuid,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: EventType,
}

// --- Agregação ---

/// Registros de um único dia local, em ordem cronológica.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DayRecords {
    #[schema(example = "2025-03-14")]
    pub date: String,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStatistics {
    pub total_hours: f64,
    pub days_worked: u32,
    pub late_days: u32,
    pub average_hours_per_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStatistics {
    #[serde(flatten)]
    pub statistics: AttendanceStatistics,
    #[schema(example = "March 2025")]
    pub current_month: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct PeriodQuery {
    /// Ano com quatro dígitos
    pub year: Option<i32>,
    /// Mês entre 1 e 12
    pub month: Option<u32>,
}
