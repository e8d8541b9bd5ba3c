//! Spreadsheet exports of KPI results.
//!
//! Builders only serialize what they are given; selecting and scoring the
//! rows happens in `pace-core`.

use pace_core::types::{DateRange, Score, Task, UserScore};
use rust_xlsxwriter::{Chart, ChartType, Workbook, Worksheet, XlsxError};
use thiserror::Error;

pub const COLUMN_WIDTH: f64 = 20.0;

const TASK_HEADERS: [&str; 6] = [
    "Title",
    "Description",
    "Priority",
    "Status",
    "Due date",
    "Difficulty",
];
const KPI_HEADERS: [&str; 2] = ["User", "KPI"];
const KPI_SHEET: &str = "KPIs";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to build workbook: {0}")]
    Workbook(#[from] XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// One user's tasks with the period score.
    Scoped,
    /// Every user's score with a chart.
    Organization,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scoped => "report",
            Self::Organization => "all_kpis",
        }
    }

    pub fn filename(self, range: &DateRange) -> String {
        format!("{}_{range}.xlsx", self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub filename: String,
    pub bytes: Vec<u8>,
}

pub fn build_scoped_report(
    tasks: &[Task],
    score: Score,
    range: &DateRange,
) -> Result<Report, ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Report")?;
    write_headers(sheet, &TASK_HEADERS)?;

    let mut row: u32 = 1;
    for task in tasks {
        sheet.write_string(row, 0, &task.title)?;
        sheet.write_string(row, 1, &task.description)?;
        sheet.write_string(row, 2, task.priority.as_str())?;
        sheet.write_string(row, 3, task.status.as_str())?;
        sheet.write_string(row, 4, task.due_at.format("%Y-%m-%d %H:%M").to_string())?;
        sheet.write_string(row, 5, task.difficulty.as_str())?;
        row += 1;
    }

    // One blank row, then the summary.
    row += 1;
    sheet.write_string(row, 0, "KPI for period")?;
    sheet.write_number(row, 1, score.value())?;

    let report = Report {
        filename: ReportKind::Scoped.filename(range),
        bytes: workbook.save_to_buffer()?,
    };
    tracing::debug!(file = %report.filename, tasks = tasks.len(), "built scoped report");
    Ok(report)
}

pub fn build_organization_report(
    breakdown: &[UserScore],
    range: &DateRange,
) -> Result<Report, ReportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(KPI_SHEET)?;
    write_headers(sheet, &KPI_HEADERS)?;

    for (index, entry) in breakdown.iter().enumerate() {
        let row = data_row(index);
        sheet.write_string(row, 0, &entry.username)?;
        sheet.write_number(row, 1, entry.score.value())?;
    }

    // A chart over zero rows would reference an empty range.
    if !breakdown.is_empty() {
        let last = data_row(breakdown.len() - 1);
        let mut chart = Chart::new(ChartType::Column);
        chart
            .add_series()
            .set_categories((KPI_SHEET, 1, 0, last, 0))
            .set_values((KPI_SHEET, 1, 1, last, 1));
        chart.title().set_name("KPI by user");
        chart.x_axis().set_name("User");
        chart.y_axis().set_name("KPI");
        sheet.insert_chart(3, 3, &chart)?;
    }

    let report = Report {
        filename: ReportKind::Organization.filename(range),
        bytes: workbook.save_to_buffer()?,
    };
    tracing::debug!(file = %report.filename, users = breakdown.len(), "built organization report");
    Ok(report)
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str]) -> Result<(), XlsxError> {
    for (col, header) in (0u16..).zip(headers) {
        sheet.write_string(0, col, *header)?;
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }
    Ok(())
}

fn data_row(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use pace_core::types::{Difficulty, Priority, TaskId, TaskStatus, UserId};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn range() -> DateRange {
        DateRange::parse("2024-03-01", "2024-03-31").unwrap()
    }

    fn task(title: &str) -> Task {
        let now: DateTime<Utc> = "2024-03-05T10:00:00Z".parse().unwrap();
        Task {
            id: TaskId::generate(),
            title: title.to_string(),
            description: "Reconcile vendor invoices".to_string(),
            priority: Priority::High,
            difficulty: Difficulty::Hard,
            status: TaskStatus::Completed,
            due_at: now,
            creator_id: UserId::generate(),
            assignee_id: None,
            parent_id: None,
            created_at: now,
            updated_at: now,
            completed_at: Some(now),
        }
    }

    /// Reads one part of the workbook package, `None` when it is absent.
    fn part(bytes: &[u8], name: &str) -> Option<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).ok()?;
        let mut xml = String::new();
        file.read_to_string(&mut xml).unwrap();
        Some(xml)
    }

    fn sheet(bytes: &[u8]) -> String {
        part(bytes, "xl/worksheets/sheet1.xml").unwrap()
    }

    fn strings(bytes: &[u8]) -> String {
        part(bytes, "xl/sharedStrings.xml").unwrap()
    }

    #[test]
    fn scoped_report_is_named_after_the_period() {
        let report =
            build_scoped_report(&[task("Close March books")], Score::from_ratio(1.0, 1.0), &range())
                .unwrap();
        assert_eq!(report.filename, "report_2024-03-01_to_2024-03-31.xlsx");
        assert!(report.bytes.starts_with(b"PK\x03\x04"));
    }

    #[test]
    fn scoped_report_lists_tasks_then_summary_after_a_blank_row() {
        let tasks = [task("Close March books"), task("File VAT return")];
        let report = build_scoped_report(&tasks, Score::from_ratio(4.0, 5.0), &range()).unwrap();

        let strings = strings(&report.bytes);
        for header in TASK_HEADERS {
            assert!(strings.contains(&format!("<t>{header}</t>")), "{header}");
        }
        for expected in [
            "Close March books",
            "File VAT return",
            "Reconcile vendor invoices",
            "High",
            "Hard",
            "Completed",
            "2024-03-05 10:00",
            "KPI for period",
        ] {
            assert!(strings.contains(&format!("<t>{expected}</t>")), "{expected}");
        }

        let sheet = sheet(&report.bytes);
        // Header, two tasks, a blank row, the summary.
        for row in ["<row r=\"1\"", "<row r=\"2\"", "<row r=\"3\"", "<row r=\"5\""] {
            assert!(sheet.contains(row), "{row}");
        }
        assert!(!sheet.contains("<row r=\"4\""));
        assert!(!sheet.contains("<row r=\"6\""));
        assert!(sheet.contains("<c r=\"F3\""));
        assert!(sheet.contains("<c r=\"A5\" t=\"s\""));
        assert!(sheet.contains("<c r=\"B5\"><v>80</v></c>"));
        assert!(sheet.contains("<cols>"));
        assert!(sheet.contains("width=\"20."));
        assert!(sheet.contains("customWidth=\"1\""));
        assert!(part(&report.bytes, "xl/charts/chart1.xml").is_none());
    }

    #[test]
    fn scoped_report_without_tasks_still_has_summary() {
        let report = build_scoped_report(&[], Score::ZERO, &range()).unwrap();
        let sheet = sheet(&report.bytes);
        assert!(sheet.contains("<row r=\"1\""));
        assert!(!sheet.contains("<row r=\"2\""));
        assert!(sheet.contains("<c r=\"A3\" t=\"s\""));
        assert!(sheet.contains("<c r=\"B3\"><v>0</v></c>"));
        assert!(strings(&report.bytes).contains("<t>KPI for period</t>"));
    }

    fn breakdown() -> Vec<UserScore> {
        vec![
            UserScore {
                user_id: UserId::generate(),
                username: "alice".to_string(),
                score: Score::from_ratio(3.0, 4.0),
            },
            UserScore {
                user_id: UserId::generate(),
                username: "bob".to_string(),
                score: Score::ZERO,
            },
        ]
    }

    #[test]
    fn organization_report_is_named_after_the_period() {
        let report = build_organization_report(&breakdown(), &range()).unwrap();
        assert_eq!(report.filename, "all_kpis_2024-03-01_to_2024-03-31.xlsx");
    }

    #[test]
    fn organization_report_has_a_row_per_user_and_a_column_chart() {
        let report = build_organization_report(&breakdown(), &range()).unwrap();

        let strings = strings(&report.bytes);
        for expected in ["User", "KPI", "alice", "bob"] {
            assert!(strings.contains(&format!("<t>{expected}</t>")), "{expected}");
        }
        let sheet = sheet(&report.bytes);
        assert!(sheet.contains("<c r=\"B2\"><v>75</v></c>"));
        assert!(sheet.contains("<c r=\"B3\"><v>0</v></c>"));
        assert!(!sheet.contains("<row r=\"4\""));

        let chart = part(&report.bytes, "xl/charts/chart1.xml").unwrap();
        assert!(chart.contains("<c:barDir val=\"col\"/>"));
        assert!(chart.contains("KPIs!$A$2:$A$3"));
        assert!(chart.contains("KPIs!$B$2:$B$3"));

        // Anchored at D4.
        let drawing = part(&report.bytes, "xl/drawings/drawing1.xml").unwrap();
        assert!(drawing.contains("<xdr:col>3</xdr:col>"));
        assert!(drawing.contains("<xdr:row>3</xdr:row>"));
    }

    #[test]
    fn organization_report_tolerates_no_users() {
        let report = build_organization_report(&[], &range()).unwrap();
        assert!(sheet(&report.bytes).contains("<row r=\"1\""));
        assert!(part(&report.bytes, "xl/charts/chart1.xml").is_none());
    }
}
