//! Deterministic demo data for the stub backend.

use crate::error::HttpError;
use crate::store::Store;
use chrono::{Duration, NaiveDate};
use finesdesk_core::models::{
    AbsenceSummary, AdminForm, EventForm, FineForm, SecretaryForm, StudentForm,
};
use rand::prelude::*;
use rand::rngs::StdRng;

/// Seed used by the server binary when `FINESDESK_SEED_DEMO` is set.
pub const DEMO_SEED: u64 = 0x00F1_7E5D;

const FIRST_NAMES: &[&str] = &[
    "Ana", "Ben", "Carla", "Diego", "Elena", "Felix", "Gia", "Hector", "Iris", "Jonas", "Kaye",
    "Leo", "Mina", "Noel", "Olga", "Paolo", "Queenie", "Rafael", "Sofia", "Tomas",
];
const LAST_NAMES: &[&str] = &[
    "Reyes", "Santos", "Cruz", "Bautista", "Garcia", "Mendoza", "Torres", "Flores", "Ramos",
    "Aquino",
];
const YEAR_LEVELS: &[&str] = &["1st Year", "2nd Year", "3rd Year", "4th Year"];
const SECTIONS: &[&str] = &["A", "B", "C"];
const VIOLATIONS: &[(&str, &str)] = &[
    ("Absent at flag ceremony", "50.00"),
    ("Late at general assembly", "20.00"),
    ("No uniform", "30.00"),
    ("Missed clean-up drive", "75.00"),
];
const EVENTS: &[(&str, &str, &str)] = &[
    ("Orientation", "2024-08-12", "Gymnasium"),
    ("General Assembly", "2024-08-30", "Auditorium"),
    ("Foundation Day", "2024-09-14", "Main Grounds"),
    ("Clean-up Drive", "2024-09-28", "Campus"),
    ("Intramurals", "2024-10-18", "Sports Complex"),
    ("Recognition Day", "2024-10-31", "Auditorium"),
];
const MONTHS: &[&str] = &["August", "September", "October"];
const REASONS: &[&str] = &["Sick", "Family emergency", "Transportation", "No reason given"];

const DEMO_STUDENTS: usize = 24;

fn pick<'a, T>(rng: &mut StdRng, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

/// Build a store filled with demo records.
///
/// Enough students are created to span several list pages, and roughly a
/// third of the fines are already paid.
///
/// # Errors
/// Returns the first store rejection; the fixed tables above never trigger one.
pub fn demo_store(seed: u64) -> Result<Store, HttpError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut store = Store::default();

    for (name, email) in [
        ("Principal Dela Cruz", "principal@school.edu"),
        ("Registrar Lim", "registrar@school.edu"),
    ] {
        store.create_admin(&AdminForm {
            name: name.to_string(),
            email: email.to_string(),
        })?;
    }
    for (index, year) in YEAR_LEVELS.iter().enumerate().take(2) {
        store.create_secretary(&SecretaryForm {
            name: format!("Secretary {}", index + 1),
            email: format!("secretary{}@school.edu", index + 1),
            assigned_year: year.to_string(),
        })?;
    }

    for &(name, date, location) in EVENTS {
        store.create_event(&EventForm {
            name: name.to_string(),
            date: date.to_string(),
            location: location.to_string(),
            description: String::new(),
        })?;
    }

    let mut students = Vec::with_capacity(DEMO_STUDENTS);
    for index in 0..DEMO_STUDENTS {
        let first = *pick(&mut rng, FIRST_NAMES);
        let last = *pick(&mut rng, LAST_NAMES);
        let student_id = format!("2024-{:04}", index + 1);
        let student = store.create_student(&StudentForm {
            email: format!(
                "{}.{}{}@school.edu",
                first.to_ascii_lowercase(),
                last.to_ascii_lowercase(),
                index + 1
            ),
            student_id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            year_level: pick(&mut rng, YEAR_LEVELS).to_string(),
            section: pick(&mut rng, SECTIONS).to_string(),
        })?;
        students.push(student);
    }

    let first_day = NaiveDate::from_ymd_opt(2024, 8, 12).unwrap_or_default();
    for student in &students {
        let fine_count = rng.gen_range(0..=2);
        for _ in 0..fine_count {
            let (violation, amount) = *pick(&mut rng, VIOLATIONS);
            let issued_on = first_day + Duration::days(rng.gen_range(0..80));
            let fine = store.create_fine(
                &FineForm {
                    student_id: student.student_id.clone(),
                    violation: violation.to_string(),
                    amount: amount.to_string(),
                },
                issued_on,
            )?;
            if rng.gen_range(0..3) == 0 {
                store.pay_fine(fine.id)?;
            }
        }

        for &month in MONTHS {
            let absences = rng.gen_range(0..=3);
            if absences == 0 {
                continue;
            }
            store.record_absences(AbsenceSummary {
                student_id: student.student_id.clone(),
                student_name: student.full_name(),
                year_level: student.year_level.clone(),
                month: month.to_string(),
                absences,
                reason: Some(pick(&mut rng, REASONS).to_string()),
            });
        }
    }

    Ok(store)
}
