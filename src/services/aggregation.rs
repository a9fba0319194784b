// src/services/aggregation.rs
//
// Funções puras sobre uma fatia já carregada de registros: agrupamento por
// dia local e estatísticas do período. Não há estado compartilhado.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeDelta, Timelike, Utc};
use chrono_tz::Tz;

use crate::models::attendance::{AttendanceRecord, AttendanceStatistics, DayRecords, EventType};

/// Fuso de referência e hora limite de atraso.
#[derive(Debug, Clone, Copy)]
pub struct AttendancePolicy {
    pub timezone: Tz,
    pub late_threshold_hour: u32,
}

pub fn local_date(timestamp: DateTime<Utc>, tz: Tz) -> NaiveDate {
    timestamp.with_timezone(&tz).date_naive()
}

// Agrupa por data local; dentro do dia a ordem é por timestamp (id desempata),
// então o resultado não depende da ordem de entrada.
fn partition_by_day(records: &[AttendanceRecord], tz: Tz) -> BTreeMap<NaiveDate, Vec<AttendanceRecord>> {
    let mut days: BTreeMap<NaiveDate, Vec<AttendanceRecord>> = BTreeMap::new();
    for record in records {
        days.entry(local_date(record.timestamp, tz))
            .or_default()
            .push(record.clone());
    }

    for day_records in days.values_mut() {
        day_records.sort_by_key(|record| (record.timestamp, record.id));
    }

    days
}

pub fn group_by_day(records: &[AttendanceRecord], tz: Tz) -> Vec<DayRecords> {
    partition_by_day(records, tz)
        .into_iter()
        .map(|(date, records)| DayRecords {
            date: date.format("%Y-%m-%d").to_string(),
            records,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pairing {
    Idle,
    Open(DateTime<Utc>),
}

/// Tempo trabalhado num dia, com os registros já em ordem cronológica.
///
/// Uma entrada abre o intervalo (entradas repetidas só movem o início para a
/// mais recente); uma saída fecha o intervalo aberto e é ignorada se não houver.
pub fn worked_duration(day_records: &[AttendanceRecord]) -> TimeDelta {
    let mut state = Pairing::Idle;
    let mut total = TimeDelta::zero();

    for record in day_records {
        state = match (state, record.event_type) {
            (_, EventType::ClockIn) => Pairing::Open(record.timestamp),
            (Pairing::Open(entry), EventType::ClockOut) => {
                total += record.timestamp - entry;
                Pairing::Idle
            }
            (Pairing::Idle, EventType::ClockOut) => Pairing::Idle,
        };
    }

    total
}

pub fn duration_hours(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / 3_600_000.0
}

// Só o primeiro registro do dia conta.
fn is_late_day(day_records: &[AttendanceRecord], policy: &AttendancePolicy) -> bool {
    day_records.first().is_some_and(|first| {
        first.event_type == EventType::ClockIn
            && first.timestamp.with_timezone(&policy.timezone).hour() >= policy.late_threshold_hour
    })
}

pub fn compute_statistics(records: &[AttendanceRecord], policy: &AttendancePolicy) -> AttendanceStatistics {
    let days = partition_by_day(records, policy.timezone);

    let mut total = TimeDelta::zero();
    let mut days_worked = 0u32;
    let mut late_days = 0u32;

    for day_records in days.values().filter(|records| !records.is_empty()) {
        days_worked += 1;
        if is_late_day(day_records, policy) {
            late_days += 1;
        }
        total += worked_duration(day_records);
    }

    let total_hours = duration_hours(total);
    let average_hours_per_day = if days_worked > 0 {
        total_hours / f64::from(days_worked)
    } else {
        0.0
    };

    AttendanceStatistics {
        total_hours,
        days_worked,
        late_days,
        average_hours_per_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::AuthMethod;
    use chrono::TimeZone;
    use chrono_tz::America::Sao_Paulo;
    use uuid::Uuid;

    const POLICY: AttendancePolicy = AttendancePolicy {
        timezone: Sao_Paulo,
        late_threshold_hour: 9,
    };

    // Hora local de São Paulo (UTC-3 em 2025)
    fn at(day: u32, hour: u32, minute: u32, event_type: EventType) -> AttendanceRecord {
        let timestamp = Sao_Paulo
            .with_ymd_and_hms(2025, 3, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc);

        AttendanceRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            event_type,
            timestamp,
            location: None,
            device: None,
            auth_method: AuthMethod::Pin,
        }
    }

    use EventType::{ClockIn, ClockOut};

    #[test]
    fn full_day_without_delay() {
        let records = vec![at(10, 8, 0, ClockIn), at(10, 17, 0, ClockOut)];

        let stats = compute_statistics(&records, &POLICY);

        assert_eq!(stats.total_hours, 9.0);
        assert_eq!(stats.days_worked, 1);
        assert_eq!(stats.late_days, 0);
        assert_eq!(stats.average_hours_per_day, 9.0);
    }

    #[test]
    fn first_clock_in_after_nine_is_late() {
        let records = vec![at(10, 9, 30, ClockIn), at(10, 18, 0, ClockOut)];

        let stats = compute_statistics(&records, &POLICY);

        assert_eq!(stats.late_days, 1);
        assert_eq!(stats.total_hours, 8.5);
    }

    #[test]
    fn exactly_nine_counts_as_late() {
        let stats = compute_statistics(&[at(10, 9, 0, ClockIn)], &POLICY);

        assert_eq!(stats.late_days, 1);
    }

    #[test]
    fn day_starting_with_clock_out_is_never_late() {
        let records = vec![at(10, 10, 0, ClockOut), at(10, 11, 0, ClockIn)];

        let stats = compute_statistics(&records, &POLICY);

        assert_eq!(stats.late_days, 0);
        assert_eq!(stats.days_worked, 1);
    }

    #[test]
    fn repeated_clock_in_keeps_only_the_last() {
        let records = vec![at(10, 8, 0, ClockIn), at(10, 8, 30, ClockIn), at(10, 17, 0, ClockOut)];

        let stats = compute_statistics(&records, &POLICY);

        assert_eq!(stats.total_hours, 8.5);
        assert_eq!(stats.late_days, 0);
    }

    #[test]
    fn lone_clock_out_adds_nothing() {
        let stats = compute_statistics(&[at(10, 12, 0, ClockOut)], &POLICY);

        assert_eq!(stats.total_hours, 0.0);
        assert_eq!(stats.days_worked, 1);
        assert_eq!(stats.average_hours_per_day, 0.0);
    }

    #[test]
    fn empty_period_has_zero_average() {
        let stats = compute_statistics(&[], &POLICY);

        assert_eq!(stats.days_worked, 0);
        assert_eq!(stats.total_hours, 0.0);
        assert_eq!(stats.late_days, 0);
        assert_eq!(stats.average_hours_per_day, 0.0);
    }

    #[test]
    fn open_interval_at_end_of_day_is_dropped() {
        let records = vec![at(10, 8, 0, ClockIn), at(10, 12, 0, ClockOut), at(10, 13, 0, ClockIn)];

        assert_eq!(worked_duration(&records), TimeDelta::hours(4));
    }

    #[test]
    fn statistics_across_several_days() {
        let records = vec![
            at(10, 8, 0, ClockIn),
            at(10, 12, 0, ClockOut),
            at(10, 13, 0, ClockIn),
            at(10, 17, 0, ClockOut),
            at(11, 9, 15, ClockIn),
            at(11, 17, 15, ClockOut),
            at(12, 7, 50, ClockIn),
            at(12, 13, 50, ClockOut),
        ];

        let stats = compute_statistics(&records, &POLICY);

        assert_eq!(stats.days_worked, 3);
        assert_eq!(stats.late_days, 1);
        assert_eq!(stats.total_hours, 22.0);
        assert!((stats.average_hours_per_day - 22.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn pairing_never_crosses_midnight() {
        // Entrada às 22h do dia 10, saída às 02h do dia 11: dias diferentes.
        let records = vec![at(10, 22, 0, ClockIn), at(11, 2, 0, ClockOut)];

        let stats = compute_statistics(&records, &POLICY);

        assert_eq!(stats.total_hours, 0.0);
        assert_eq!(stats.days_worked, 2);
    }

    #[test]
    fn input_order_does_not_change_the_statistics() {
        let records = vec![at(10, 8, 0, ClockIn), at(10, 8, 30, ClockIn), at(10, 17, 0, ClockOut)];
        let mut shuffled = records.clone();
        shuffled.reverse();

        assert_eq!(compute_statistics(&records, &POLICY), compute_statistics(&shuffled, &POLICY));
    }

    #[test]
    fn statistics_are_repeatable_and_leave_input_untouched() {
        let records = vec![at(10, 8, 0, ClockIn), at(10, 17, 0, ClockOut)];
        let snapshot = records.clone();

        let first = compute_statistics(&records, &POLICY);
        let second = compute_statistics(&records, &POLICY);

        assert_eq!(first, second);
        assert_eq!(records, snapshot);
    }

    #[test]
    fn grouping_is_ordered_by_date_and_time() {
        let records = vec![
            at(12, 17, 0, ClockOut),
            at(10, 17, 0, ClockOut),
            at(12, 8, 0, ClockIn),
            at(10, 8, 0, ClockIn),
        ];

        let days = group_by_day(&records, Sao_Paulo);

        let dates: Vec<&str> = days.iter().map(|day| day.date.as_str()).collect();
        assert_eq!(dates, ["2025-03-10", "2025-03-12"]);
        for day in &days {
            let types: Vec<EventType> = day.records.iter().map(|r| r.event_type).collect();
            assert_eq!(types, [ClockIn, ClockOut]);
        }
    }

    #[test]
    fn grouping_ignores_input_order() {
        let records = vec![
            at(10, 8, 0, ClockIn),
            at(10, 12, 0, ClockOut),
            at(11, 8, 0, ClockIn),
            at(11, 17, 0, ClockOut),
        ];
        let mut shuffled = records.clone();
        shuffled.swap(0, 3);
        shuffled.swap(1, 2);

        assert_eq!(group_by_day(&records, Sao_Paulo), group_by_day(&shuffled, Sao_Paulo));
    }

    #[test]
    fn grouping_uses_the_reference_timezone() {
        // 23:30 local do dia 10 já é dia 11 em UTC
        let late_evening = at(10, 23, 30, ClockOut);
        assert_eq!(late_evening.timestamp.date_naive().to_string(), "2025-03-11");

        let days = group_by_day(&[late_evening], Sao_Paulo);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].date, "2025-03-10");
    }

    #[test]
    fn no_records_no_groups() {
        assert!(group_by_day(&[], Sao_Paulo).is_empty());
    }
}
