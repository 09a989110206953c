//! Dashboard page loader.

use crate::api::{fetch_records, Backend};
use finesdesk_core::dashboard::DashboardStats;
use finesdesk_core::models::{AbsenceSummary, Event, Fine, Page, Session, Student};
use finesdesk_core::AppError;

/// Fetch the four collections the dashboard charts and aggregate them.
///
/// # Errors
/// Returns [`AppError::Forbidden`] for roles without dashboard access, or the
/// first fetch error.
pub async fn load_dashboard<B: Backend>(
    session: &Session,
    backend: &B,
) -> Result<DashboardStats, AppError> {
    session.require(Page::Dashboard)?;
    let (students, events, fines, absences) = tokio::join!(
        fetch_records::<Student, B>(backend),
        fetch_records::<Event, B>(backend),
        fetch_records::<Fine, B>(backend),
        fetch_records::<AbsenceSummary, B>(backend),
    );
    let stats = DashboardStats::compute(&students?, &events?, &fines?, &absences?);
    Ok(stats)
}
