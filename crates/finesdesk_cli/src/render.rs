//! Plain-text rendering of list pages, pagers and the dashboard.

use finesdesk_core::dashboard::{ChartPoint, DashboardStats};
use finesdesk_core::models::{AbsenceSummary, Admin, Event, Fine, Secretary, Student};
use finesdesk_core::text::truncate_chars;
use finesdesk_core::{AppError, Paginator};
use serde::Serialize;
use serde_json::json;

const MAX_CELL_CHARS: usize = 32;
const BAR_WIDTH: f64 = 30.0;

/// A record that can be printed as one table row.
pub trait TableRow: Serialize {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

fn or_dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_string()
}

impl TableRow for Student {
    fn headers() -> &'static [&'static str] {
        &["ID", "STUDENT ID", "NAME", "EMAIL", "YEAR", "SECTION"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.student_id.clone(),
            self.full_name(),
            or_dash(self.email.as_deref()),
            self.year_level.clone(),
            or_dash(self.section.as_deref()),
        ]
    }
}

impl TableRow for Admin {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "EMAIL"]
    }

    fn cells(&self) -> Vec<String> {
        vec![self.id.to_string(), self.name.clone(), self.email.clone()]
    }
}

impl TableRow for Secretary {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "EMAIL", "ASSIGNED YEAR"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            or_dash(self.assigned_year.as_deref()),
        ]
    }
}

impl TableRow for Event {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "DATE", "LOCATION"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.date.format("%Y-%m-%d").to_string(),
            or_dash(self.location.as_deref()),
        ]
    }
}

impl TableRow for Fine {
    fn headers() -> &'static [&'static str] {
        &["ID", "STUDENT", "VIOLATION", "AMOUNT", "STATUS", "ISSUED"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            format!("{} ({})", self.student_name, self.student_id),
            self.violation.clone(),
            format!("{:.2}", self.amount),
            self.status.to_string(),
            self.issued_on.format("%Y-%m-%d").to_string(),
        ]
    }
}

impl TableRow for AbsenceSummary {
    fn headers() -> &'static [&'static str] {
        &["STUDENT ID", "NAME", "YEAR", "MONTH", "ABSENCES", "REASON"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.student_id.clone(),
            self.student_name.clone(),
            self.year_level.clone(),
            self.month.clone(),
            self.absences.to_string(),
            or_dash(self.reason.as_deref()),
        ]
    }
}

/// Left-aligned columns sized to their widest cell.
pub fn table<R: TableRow>(rows: &[&R]) -> String {
    let headers = R::headers();
    let body: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            row.cells()
                .into_iter()
                .map(|cell| truncate_chars(&cell, MAX_CELL_CHARS))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for cells in &body {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    let mut out = vec![line(&header_cells)];
    out.extend(body.iter().map(|cells| line(cells)));
    out.join("\n")
}

/// Pager button row: first/previous, numbered pages with `[n]` marking the
/// current one, next/last. Arrows are left out where they would be disabled.
pub fn pager_row(pager: &Paginator) -> String {
    let mut parts: Vec<String> = Vec::new();
    if pager.has_previous() {
        parts.push("<<".to_string());
        parts.push("<".to_string());
    }
    for page in pager.visible_pages() {
        if page == pager.page() {
            parts.push(format!("[{}]", page));
        } else {
            parts.push(page.to_string());
        }
    }
    if pager.has_next() {
        parts.push(">".to_string());
        parts.push(">>".to_string());
    }
    parts.join(" ")
}

/// Table, pager and display string for one page of a list.
pub fn list_page<R: TableRow>(title: &str, rows: &[&R], pager: &Paginator) -> String {
    let body = if rows.is_empty() {
        "No records found.".to_string()
    } else {
        table(rows)
    };
    format!(
        "{}\n\n{}\n\n{}\n{}",
        title,
        body,
        pager_row(pager),
        pager.summary()
    )
}

/// Machine-readable variant of [`list_page`].
pub fn list_page_json<R: TableRow>(rows: &[&R], pager: &Paginator) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&json!({
        "page": pager.page(),
        "total_pages": pager.total_pages(),
        "total_items": pager.total_items(),
        "summary": pager.summary(),
        "rows": rows,
    }))
}

fn chart(title: &str, points: &[ChartPoint], money: bool) -> String {
    let max = points.iter().map(|p| p.value).fold(0.0_f64, f64::max);
    let label_width = points
        .iter()
        .map(|p| p.label.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = vec![title.to_string()];
    for point in points {
        let bar_len = if max > 0.0 {
            ((point.value / max) * BAR_WIDTH).round() as usize
        } else {
            0
        };
        let value = if money {
            format!("{:.2}", point.value)
        } else {
            format!("{}", point.value)
        };
        out.push(format!(
            "  {:<width$}  {} {}",
            point.label,
            "#".repeat(bar_len),
            value,
            width = label_width
        ));
    }
    out.join("\n")
}

pub fn dashboard(stats: &DashboardStats) -> String {
    let totals = format!(
        "Students: {}\nEvents: {}\nUnpaid fines: {} ({:.2})\nCollected: {:.2}",
        stats.total_students,
        stats.total_events,
        stats.unpaid_fines,
        stats.unpaid_amount,
        stats.collected_amount
    );
    [
        totals,
        chart("Fines by status", &stats.fines_by_status, false),
        chart("Students per year level", &stats.students_by_year, false),
        chart("Absences per month", &stats.absences_by_month, false),
    ]
    .join("\n\n")
}

/// One-line error text for the terminal.
pub fn error(err: &AppError) -> String {
    match err {
        AppError::Validation(_) | AppError::MissingFields(_) => {
            format!("Could not save:\n{}", err.alert_message())
        }
        AppError::Transport(detail) => format!("Could not reach the server: {}", detail),
        AppError::Decode(detail) => format!("Unexpected response: {}", detail),
        _ => err.alert_message(),
    }
}
