// src/services/calendar.rs

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

// Meia-noite local de `date` no fuso. Em zonas cujo horário de verão começa
// à meia-noite, 00:00 não existe e o dia começa no primeiro instante válido.
fn start_of_local_day(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;

    (0..=2)
        .map(|hours| midnight + Duration::hours(hours))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Janela semiaberta `[início, fim)` do mês civil no fuso de referência.
pub fn month_range(year: i32, month: u32, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    Some((start_of_local_day(first, tz)?, start_of_local_day(next, tz)?))
}

/// Janela semiaberta do dia local que contém `now`.
pub fn day_range(now: DateTime<Utc>, tz: Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let today = now.with_timezone(&tz).date_naive();
    let tomorrow = today.succ_opt()?;

    Some((start_of_local_day(today, tz)?, start_of_local_day(tomorrow, tz)?))
}

/// Ano e mês locais de `now`.
pub fn current_period(now: DateTime<Utc>, tz: Tz) -> (i32, u32) {
    let local = now.with_timezone(&tz);
    (local.year(), local.month())
}

/// Rótulo do mês no formato "March 2025".
pub fn month_label(year: i32, month: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|date| date.format("%B %Y").to_string())
}
