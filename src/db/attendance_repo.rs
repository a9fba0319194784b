// src/db/attendance_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
#[cfg(test)]
use mockall::automock;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::RepositoryError,
    models::attendance::{AttendanceRecord, NewAttendanceRecord},
};

/// Armazenamento somente-inserção dos registros de ponto.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AttendanceRepository: Send + Sync {
    /// Grava um registro e devolve-o com o `id` atribuído.
    async fn insert(&self, record: NewAttendanceRecord) -> Result<AttendanceRecord, RepositoryError>;

    /// Registros do usuário com `start <= timestamp < end`, em ordem de timestamp.
    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError>;
}

#[derive(Clone)]
pub struct PgAttendanceRepository {
    pool: PgPool,
}

impl PgAttendanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceRepository for PgAttendanceRepository {
    async fn insert(&self, record: NewAttendanceRecord) -> Result<AttendanceRecord, RepositoryError> {
        let inserted = sqlx::query_as::<Postgres, AttendanceRecord>(
            r#"
            INSERT INTO time_records (user_id, event_type, "timestamp", location, device, auth_method)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, event_type, "timestamp", location, device, auth_method
            "#,
        )
        .bind(record.user_id)
        .bind(record.event_type.as_str())
        .bind(record.timestamp)
        .bind(record.location.as_deref())
        .bind(record.device.as_deref())
        .bind(record.auth_method.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(inserted)
    }

    async fn find_by_user_and_range(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, RepositoryError> {
        let records = sqlx::query_as::<Postgres, AttendanceRecord>(
            r#"
            SELECT id, user_id, event_type, "timestamp", location, device, auth_method
            FROM time_records
            WHERE user_id = $1
              AND "timestamp" >= $2
              AND "timestamp" < $3
            ORDER BY "timestamp" ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

