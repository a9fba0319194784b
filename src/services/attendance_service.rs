// src/services/attendance_service.rs

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    common::{db_utils::with_timeout, error::AppError},
    db::AttendanceRepository,
    models::attendance::{AttendanceRecord, DayRecords, MonthlyStatistics},
    services::{
        aggregation::{compute_statistics, group_by_day, AttendancePolicy},
        calendar::{day_range, month_label, month_range},
    },
};

#[derive(Clone)]
pub struct AttendanceService {
    repo: Arc<dyn AttendanceRepository>,
    policy: AttendancePolicy,
    timeout: Duration,
}

impl AttendanceService {
    pub fn new(repo: Arc<dyn AttendanceRepository>, policy: AttendancePolicy, timeout: Duration) -> Self {
        Self { repo, policy, timeout }
    }

    async fn fetch(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        with_timeout(self.timeout, self.repo.find_by_user_and_range(user_id, start, end))
            .await
            .map_err(AppError::QueryFailure)
    }

    /// Registros do mês civil, ainda sem agrupar.
    pub async fn month_records(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let (start, end) = month_range(year, month, self.policy.timezone).ok_or(AppError::InvalidPeriod)?;
        self.fetch(user_id, start, end).await
    }

    // Registros do dia local corrente, em ordem cronológica
    pub async fn today(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<Vec<AttendanceRecord>, AppError> {
        let (start, end) = day_range(now, self.policy.timezone).ok_or(AppError::InvalidPeriod)?;
        let mut records = self.fetch(user_id, start, end).await?;
        records.sort_by_key(|record| (record.timestamp, record.id));
        Ok(records)
    }

    pub fn group(&self, records: &[AttendanceRecord]) -> Vec<DayRecords> {
        group_by_day(records, self.policy.timezone)
    }

    pub fn summarize(&self, records: &[AttendanceRecord], year: i32, month: u32) -> Result<MonthlyStatistics, AppError> {
        Ok(MonthlyStatistics {
            statistics: compute_statistics(records, &self.policy),
            current_month: month_label(year, month).ok_or(AppError::InvalidPeriod)?,
        })
    }

    pub async fn monthly(&self, user_id: Uuid, year: i32, month: u32) -> Result<Vec<DayRecords>, AppError> {
        let records = self.month_records(user_id, year, month).await?;
        Ok(self.group(&records))
    }

    pub async fn statistics(&self, user_id: Uuid, year: i32, month: u32) -> Result<MonthlyStatistics, AppError> {
        let records = self.month_records(user_id, year, month).await?;
        self.summarize(&records, year, month)
    }
}
