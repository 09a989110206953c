//! Dashboard totals and chart series derived from the list collections.

use crate::models::{AbsenceSummary, Event, Fine, FineStatus, Student};
use serde::Serialize;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One labelled bar/slice in a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_events: usize,
    pub unpaid_fines: usize,
    pub unpaid_amount: f64,
    pub collected_amount: f64,
    pub fines_by_status: Vec<ChartPoint>,
    pub students_by_year: Vec<ChartPoint>,
    pub absences_by_month: Vec<ChartPoint>,
}

fn bump(points: &mut Vec<ChartPoint>, label: &str, by: f64) {
    match points.iter_mut().find(|point| point.label == label) {
        Some(point) => point.value += by,
        None => points.push(ChartPoint {
            label: label.to_string(),
            value: by,
        }),
    }
}

fn month_index(label: &str) -> usize {
    MONTHS
        .iter()
        .position(|month| month.eq_ignore_ascii_case(label.trim()))
        .unwrap_or(MONTHS.len())
}

impl DashboardStats {
    /// Aggregate the collections a dashboard page loads.
    ///
    /// Year levels keep first-seen order. Month labels are folded to their
    /// canonical spelling and sorted by calendar position, unrecognised
    /// labels last.
    pub fn compute(
        students: &[Student],
        events: &[Event],
        fines: &[Fine],
        absences: &[AbsenceSummary],
    ) -> Self {
        let mut stats = Self {
            total_students: students.len(),
            total_events: events.len(),
            fines_by_status: vec![
                ChartPoint {
                    label: FineStatus::Unpaid.to_string(),
                    value: 0.0,
                },
                ChartPoint {
                    label: FineStatus::Paid.to_string(),
                    value: 0.0,
                },
            ],
            ..Self::default()
        };

        for fine in fines {
            bump(&mut stats.fines_by_status, fine.status.as_str(), 1.0);
            match fine.status {
                FineStatus::Unpaid => {
                    stats.unpaid_fines += 1;
                    stats.unpaid_amount += fine.amount;
                }
                FineStatus::Paid => stats.collected_amount += fine.amount,
            }
        }

        for student in students {
            bump(&mut stats.students_by_year, &student.year_level, 1.0);
        }

        for absence in absences {
            let label = MONTHS
                .get(month_index(&absence.month))
                .copied()
                .unwrap_or(absence.month.as_str());
            bump(
                &mut stats.absences_by_month,
                label,
                f64::from(absence.absences),
            );
        }
        stats
            .absences_by_month
            .sort_by_key(|point| month_index(&point.label));
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fine(id: u64, amount: f64, status: FineStatus) -> Fine {
        Fine {
            id,
            student_id: "2024-0001".to_string(),
            student_name: "Luis Santos".to_string(),
            violation: "Late".to_string(),
            amount,
            status,
            issued_on: NaiveDate::from_ymd_opt(2024, 9, 2).expect("date"),
        }
    }

    fn absence(month: &str, absences: u32) -> AbsenceSummary {
        AbsenceSummary {
            student_id: "2024-0001".to_string(),
            student_name: "Luis Santos".to_string(),
            year_level: "1st Year".to_string(),
            month: month.to_string(),
            absences,
            reason: None,
        }
    }

    #[test]
    fn fine_totals_split_by_status() {
        let fines = [
            fine(1, 50.0, FineStatus::Unpaid),
            fine(2, 25.5, FineStatus::Paid),
            fine(3, 100.0, FineStatus::Unpaid),
        ];
        let stats = DashboardStats::compute(&[], &[], &fines, &[]);
        assert_eq!(stats.unpaid_fines, 2);
        assert_eq!(stats.unpaid_amount, 150.0);
        assert_eq!(stats.collected_amount, 25.5);
        assert_eq!(stats.fines_by_status[0].value, 2.0);
        assert_eq!(stats.fines_by_status[1].value, 1.0);
    }

    #[test]
    fn absences_are_summed_in_calendar_order() {
        let absences = [
            absence("October", 2),
            absence("August", 1),
            absence("october", 3),
            absence("Someday", 4),
        ];
        let stats = DashboardStats::compute(&[], &[], &[], &absences);
        let labels: Vec<&str> = stats
            .absences_by_month
            .iter()
            .map(|point| point.label.as_str())
            .collect();
        assert_eq!(labels, vec!["August", "October", "Someday"]);
        assert_eq!(stats.absences_by_month[1].value, 5.0);
    }

    #[test]
    fn empty_collections_yield_zeroed_stats() {
        let stats = DashboardStats::compute(&[], &[], &[], &[]);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.fines_by_status.len(), 2);
        assert!(stats.students_by_year.is_empty());
    }
}
