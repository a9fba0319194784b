// src/services/report_service.rs

use std::path::PathBuf;

use chrono::TimeDelta;
use genpdf::{elements, style, Element};

use crate::{
    common::error::AppError,
    models::attendance::{DayRecords, MonthlyStatistics},
    services::aggregation::{worked_duration, AttendancePolicy},
};

const CSV_HEADER: &str = "Data,Horas Trabalhadas,Registros";

// "HH:MM" com os minutos truncados
pub fn format_hours(duration: TimeDelta) -> String {
    let minutes = duration.num_minutes().max(0);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn summary_lines(stats: &MonthlyStatistics) -> Vec<String> {
    let summary = &stats.statistics;
    vec![
        format!(
            "Horas trabalhadas: {}",
            format_hours(TimeDelta::milliseconds((summary.total_hours * 3_600_000.0) as i64))
        ),
        format!("Dias trabalhados: {}", summary.days_worked),
        format!("Dias com atraso: {}", summary.late_days),
        format!("Média por dia: {:.2} h", summary.average_hours_per_day),
    ]
}

#[derive(Debug, Clone)]
pub struct ReportService {
    fonts_dir: PathBuf,
    policy: AttendancePolicy,
}

impl ReportService {
    pub fn new(fonts_dir: PathBuf, policy: AttendancePolicy) -> Self {
        Self { fonts_dir, policy }
    }

    fn day_label(&self, day: &DayRecords) -> String {
        day.records
            .first()
            .map(|record| record.timestamp.with_timezone(&self.policy.timezone).format("%d/%m/%Y").to_string())
            .unwrap_or_else(|| day.date.clone())
    }

    fn entries_label(&self, day: &DayRecords) -> String {
        day.records
            .iter()
            .map(|record| {
                format!(
                    "{}: {}",
                    record.event_type,
                    record.timestamp.with_timezone(&self.policy.timezone).format("%H:%M:%S")
                )
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Uma linha por dia: data, horas trabalhadas e a lista de registros.
    pub fn monthly_csv(&self, days: &[DayRecords]) -> String {
        let mut csv = String::from(CSV_HEADER);
        for day in days {
            csv.push('\n');
            csv.push_str(&format!(
                "{},{},\"{}\"",
                self.day_label(day),
                format_hours(worked_duration(&day.records)),
                self.entries_label(day)
            ));
        }
        csv
    }

    // Data, horas trabalhadas e registros de cada dia
    fn table_rows(&self, days: &[DayRecords]) -> Vec<[String; 3]> {
        days.iter()
            .map(|day| {
                [
                    self.day_label(day),
                    format_hours(worked_duration(&day.records)),
                    self.entries_label(day),
                ]
            })
            .collect()
    }

    fn days_table(&self, days: &[DayRecords]) -> Result<elements::TableLayout, AppError> {
        // Pesos das colunas: Data (2), Horas (1), Registros (5)
        let mut table = elements::TableLayout::new(vec![2, 1, 5]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        table
            .row()
            .element(elements::Paragraph::new("Data").styled(style_bold))
            .element(elements::Paragraph::new("Horas").styled(style_bold))
            .element(elements::Paragraph::new("Registros").styled(style_bold))
            .push()
            .map_err(|e| AppError::ReportError(e.to_string()))?;

        for [date, hours, entries] in self.table_rows(days) {
            table
                .row()
                .element(elements::Paragraph::new(date))
                .element(elements::Paragraph::new(hours))
                .element(elements::Paragraph::new(entries))
                .push()
                .map_err(|e| AppError::ReportError(e.to_string()))?;
        }

        Ok(table)
    }

    pub fn monthly_pdf(
        &self,
        year: i32,
        month: u32,
        stats: &MonthlyStatistics,
        days: &[DayRecords],
    ) -> Result<Vec<u8>, AppError> {
        // Carrega a fonte da pasta configurada
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(format!("Fonte não encontrada em {}", self.fonts_dir.display())))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Relatório de ponto {:02}/{}", month, year));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new(format!("RELATÓRIO MENSAL - {}", stats.current_month))
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Break::new(1.5));

        for line in summary_lines(stats) {
            doc.push(elements::Paragraph::new(line));
        }
        doc.push(elements::Break::new(2));

        let table = self.days_table(days)?;
        doc.push(table);

        // Renderiza para Buffer (Memória)
        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::ReportError(e.to_string()))?;

        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::{AttendanceRecord, AttendanceStatistics, AuthMethod, EventType};
    use chrono::{TimeZone, Utc};
    use chrono_tz::America::Sao_Paulo;
    use uuid::Uuid;

    fn policy() -> AttendancePolicy {
        AttendancePolicy {
            timezone: Sao_Paulo,
            late_threshold_hour: 9,
        }
    }

    fn record(hour: u32, minute: u32, event_type: EventType) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            event_type,
            timestamp: Sao_Paulo
                .with_ymd_and_hms(2025, 3, 14, hour, minute, 0)
                .unwrap()
                .with_timezone(&Utc),
            location: None,
            device: None,
            auth_method: AuthMethod::Biometric,
        }
    }

    #[test]
    fn hours_are_truncated_to_minutes() {
        assert_eq!(format_hours(TimeDelta::minutes(510)), "08:30");
        assert_eq!(format_hours(TimeDelta::seconds(59)), "00:00");
        assert_eq!(format_hours(TimeDelta::hours(27)), "27:00");
    }

    #[test]
    fn csv_has_one_row_per_day_in_local_time() {
        let days = vec![DayRecords {
            date: "2025-03-14".to_string(),
            records: vec![
                record(8, 0, EventType::ClockIn),
                record(8, 30, EventType::ClockIn),
                record(17, 0, EventType::ClockOut),
            ],
        }];

        let csv = ReportService::new(PathBuf::from("./fonts"), policy()).monthly_csv(&days);

        assert_eq!(
            csv,
            "Data,Horas Trabalhadas,Registros\n\
             14/03/2025,08:30,\"entrada: 08:00:00; entrada: 08:30:00; saída: 17:00:00\""
        );
    }

    #[test]
    fn empty_month_is_only_the_header() {
        let csv = ReportService::new(PathBuf::from("./fonts"), policy()).monthly_csv(&[]);

        assert_eq!(csv, CSV_HEADER);
    }

    fn march_stats() -> MonthlyStatistics {
        MonthlyStatistics {
            statistics: AttendanceStatistics {
                total_hours: 8.5,
                days_worked: 1,
                late_days: 0,
                average_hours_per_day: 8.5,
            },
            current_month: "March 2025".to_string(),
        }
    }

    fn workday() -> DayRecords {
        DayRecords {
            date: "2025-03-14".to_string(),
            records: vec![record(8, 0, EventType::ClockIn), record(16, 30, EventType::ClockOut)],
        }
    }

    #[test]
    fn pdf_summary_lists_the_month_statistics() {
        assert_eq!(
            summary_lines(&march_stats()),
            vec![
                "Horas trabalhadas: 08:30",
                "Dias trabalhados: 1",
                "Dias com atraso: 0",
                "Média por dia: 8.50 h",
            ]
        );
    }

    #[test]
    fn pdf_table_has_one_row_per_day() -> testresult::TestResult {
        let service = ReportService::new(PathBuf::from("./nao-existe"), policy());
        let days = vec![workday(), workday()];

        let rows = service.table_rows(&days);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            [
                "14/03/2025".to_string(),
                "08:30".to_string(),
                "entrada: 08:00:00; saída: 16:30:00".to_string(),
            ]
        );

        // Monta sem precisar das fontes
        service.days_table(&days)?;
        service.days_table(&[])?;
        Ok(())
    }

    #[test]
    fn missing_fonts_are_reported() {
        let service = ReportService::new(PathBuf::from("./nao-existe"), policy());

        let result = service.monthly_pdf(2025, 3, &march_stats(), &[workday()]);

        assert!(matches!(result, Err(AppError::FontNotFound(_))));
    }
}
