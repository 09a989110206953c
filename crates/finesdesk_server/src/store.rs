//! In-memory record tables behind the stub API.
//!
//! Each mutation validates the whole payload first and only then touches the
//! tables, so a rejected request never leaves a partial write behind.

use crate::error::HttpError;
use chrono::NaiveDate;
use finesdesk_core::models::{
    AbsenceSummary, Admin, AdminForm, Event, EventForm, Fine, FineForm, FineStatus, Secretary,
    SecretaryForm, Student, StudentForm,
};
use finesdesk_core::text::normalize_optional_nonempty;
use finesdesk_core::validation::check_required;
use finesdesk_core::{FieldErrors, FormModel, Resource};

pub const TAKEN: &str = "already taken";
pub const BAD_EMAIL: &str = "must be a valid email address";
pub const BAD_DATE: &str = "must be a date in YYYY-MM-DD format";
pub const BAD_AMOUNT: &str = "must be a positive amount";
pub const UNKNOWN_STUDENT: &str = "does not match any student";

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    students: Vec<Student>,
    admins: Vec<Admin>,
    secretaries: Vec<Secretary>,
    events: Vec<Event>,
    fines: Vec<Fine>,
    absences: Vec<AbsenceSummary>,
}

fn optional(value: &str) -> Option<String> {
    normalize_optional_nonempty(Some(value.to_string()))
}

fn required<F: FormModel>(form: &F) -> FieldErrors {
    check_required(form).err().unwrap_or_default()
}

fn finish(errors: FieldErrors) -> Result<(), HttpError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(HttpError::Validation(errors))
    }
}

fn check_email(errors: &mut FieldErrors, value: &str, taken: bool) {
    let value = value.trim();
    if value.is_empty() {
        return;
    }
    if !value.contains('@') {
        errors.push("email", BAD_EMAIL);
    } else if taken {
        errors.push("email", TAKEN);
    }
}

fn same_email(existing: &str, candidate: &str) -> bool {
    existing.eq_ignore_ascii_case(candidate.trim())
}

fn position<T>(
    rows: &[T],
    id: u64,
    id_of: impl Fn(&T) -> u64,
    resource: Resource,
) -> Result<usize, HttpError> {
    rows.iter()
        .position(|row| id_of(row) == id)
        .ok_or_else(|| HttpError::NotFound(format!("No {} with id {}.", resource.singular(), id)))
}

fn parse_date(errors: &mut FieldErrors, value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push("date", BAD_DATE);
            None
        }
    }
}

fn parse_amount(errors: &mut FieldErrors, value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount > 0.0 => Some((amount * 100.0).round() / 100.0),
        _ => {
            errors.push("amount", BAD_AMOUNT);
            None
        }
    }
}

impl Store {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn admins(&self) -> &[Admin] {
        &self.admins
    }

    pub fn secretaries(&self) -> &[Secretary] {
        &self.secretaries
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn fines(&self) -> &[Fine] {
        &self.fines
    }

    pub fn absences(&self) -> &[AbsenceSummary] {
        &self.absences
    }

    /// Append an absence summary row. There is no API for this; summaries are
    /// produced by attendance taking, which the stub does not model.
    pub fn record_absences(&mut self, row: AbsenceSummary) {
        self.absences.push(row);
    }

    // Students

    fn validate_student(&self, form: &StudentForm, except: Option<u64>) -> Result<(), HttpError> {
        let mut errors = required(form);
        let others = || self.students.iter().filter(move |s| Some(s.id) != except);
        let student_id = form.student_id.trim();
        if !student_id.is_empty() && others().any(|s| s.student_id == student_id) {
            errors.push("student_id", TAKEN);
        }
        let email_taken = others().any(|s| {
            s.email
                .as_deref()
                .is_some_and(|email| same_email(email, &form.email))
        });
        check_email(&mut errors, &form.email, email_taken);
        finish(errors)
    }

    fn build_student(id: u64, form: &StudentForm) -> Student {
        Student {
            id,
            student_id: form.student_id.trim().to_string(),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: optional(&form.email),
            year_level: form.year_level.trim().to_string(),
            section: optional(&form.section),
        }
    }

    pub fn create_student(&mut self, form: &StudentForm) -> Result<Student, HttpError> {
        self.validate_student(form, None)?;
        let student = Self::build_student(self.allocate_id(), form);
        self.students.push(student.clone());
        Ok(student)
    }

    /// Update a student; fines and absence rows follow a changed name or id.
    pub fn update_student(&mut self, id: u64, form: &StudentForm) -> Result<Student, HttpError> {
        let index = position(&self.students, id, |s| s.id, Resource::Students)?;
        self.validate_student(form, Some(id))?;
        let updated = Self::build_student(id, form);
        let previous = std::mem::replace(&mut self.students[index], updated.clone());
        for fine in self
            .fines
            .iter_mut()
            .filter(|fine| fine.student_id == previous.student_id)
        {
            fine.student_id = updated.student_id.clone();
            fine.student_name = updated.full_name();
        }
        for row in self
            .absences
            .iter_mut()
            .filter(|row| row.student_id == previous.student_id)
        {
            row.student_id = updated.student_id.clone();
            row.student_name = updated.full_name();
            row.year_level = updated.year_level.clone();
        }
        Ok(updated)
    }

    /// Delete a student and their absence rows.
    ///
    /// # Errors
    /// Refuses with [`HttpError::Conflict`] while the student has unpaid fines.
    pub fn delete_student(&mut self, id: u64) -> Result<Student, HttpError> {
        let index = position(&self.students, id, |s| s.id, Resource::Students)?;
        let student_id = self.students[index].student_id.clone();
        if self
            .fines
            .iter()
            .any(|fine| fine.student_id == student_id && fine.status == FineStatus::Unpaid)
        {
            return Err(HttpError::Conflict(
                "Cannot delete a student with unpaid fines.".to_string(),
            ));
        }
        self.absences.retain(|row| row.student_id != student_id);
        Ok(self.students.remove(index))
    }

    // Admins

    fn validate_admin(&self, form: &AdminForm, except: Option<u64>) -> Result<(), HttpError> {
        let mut errors = required(form);
        let taken = self
            .admins
            .iter()
            .any(|a| Some(a.id) != except && same_email(&a.email, &form.email));
        check_email(&mut errors, &form.email, taken);
        finish(errors)
    }

    pub fn create_admin(&mut self, form: &AdminForm) -> Result<Admin, HttpError> {
        self.validate_admin(form, None)?;
        let admin = Admin {
            id: self.allocate_id(),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
        };
        self.admins.push(admin.clone());
        Ok(admin)
    }

    pub fn update_admin(&mut self, id: u64, form: &AdminForm) -> Result<Admin, HttpError> {
        let index = position(&self.admins, id, |a| a.id, Resource::Admins)?;
        self.validate_admin(form, Some(id))?;
        let admin = &mut self.admins[index];
        admin.name = form.name.trim().to_string();
        admin.email = form.email.trim().to_string();
        Ok(admin.clone())
    }

    /// # Errors
    /// Refuses to remove the last remaining admin.
    pub fn delete_admin(&mut self, id: u64) -> Result<Admin, HttpError> {
        let index = position(&self.admins, id, |a| a.id, Resource::Admins)?;
        if self.admins.len() == 1 {
            return Err(HttpError::Conflict(
                "Cannot delete the last admin account.".to_string(),
            ));
        }
        Ok(self.admins.remove(index))
    }

    // Secretaries

    fn validate_secretary(
        &self,
        form: &SecretaryForm,
        except: Option<u64>,
    ) -> Result<(), HttpError> {
        let mut errors = required(form);
        let taken = self
            .secretaries
            .iter()
            .any(|s| Some(s.id) != except && same_email(&s.email, &form.email));
        check_email(&mut errors, &form.email, taken);
        finish(errors)
    }

    pub fn create_secretary(&mut self, form: &SecretaryForm) -> Result<Secretary, HttpError> {
        self.validate_secretary(form, None)?;
        let secretary = Secretary {
            id: self.allocate_id(),
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            assigned_year: optional(&form.assigned_year),
        };
        self.secretaries.push(secretary.clone());
        Ok(secretary)
    }

    pub fn update_secretary(
        &mut self,
        id: u64,
        form: &SecretaryForm,
    ) -> Result<Secretary, HttpError> {
        let index = position(&self.secretaries, id, |s| s.id, Resource::Secretaries)?;
        self.validate_secretary(form, Some(id))?;
        let secretary = &mut self.secretaries[index];
        secretary.name = form.name.trim().to_string();
        secretary.email = form.email.trim().to_string();
        secretary.assigned_year = optional(&form.assigned_year);
        Ok(secretary.clone())
    }

    pub fn delete_secretary(&mut self, id: u64) -> Result<Secretary, HttpError> {
        let index = position(&self.secretaries, id, |s| s.id, Resource::Secretaries)?;
        Ok(self.secretaries.remove(index))
    }

    // Events

    fn parse_event(form: &EventForm) -> Result<NaiveDate, HttpError> {
        let mut errors = required(form);
        let date = parse_date(&mut errors, &form.date);
        match date {
            Some(date) if errors.is_empty() => Ok(date),
            _ => Err(HttpError::Validation(errors)),
        }
    }

    fn build_event(id: u64, date: NaiveDate, form: &EventForm) -> Event {
        Event {
            id,
            name: form.name.trim().to_string(),
            date,
            location: optional(&form.location),
            description: optional(&form.description),
        }
    }

    pub fn create_event(&mut self, form: &EventForm) -> Result<Event, HttpError> {
        let date = Self::parse_event(form)?;
        let event = Self::build_event(self.allocate_id(), date, form);
        self.events.push(event.clone());
        Ok(event)
    }

    pub fn update_event(&mut self, id: u64, form: &EventForm) -> Result<Event, HttpError> {
        let index = position(&self.events, id, |e| e.id, Resource::Events)?;
        let date = Self::parse_event(form)?;
        self.events[index] = Self::build_event(id, date, form);
        Ok(self.events[index].clone())
    }

    pub fn delete_event(&mut self, id: u64) -> Result<Event, HttpError> {
        let index = position(&self.events, id, |e| e.id, Resource::Events)?;
        Ok(self.events.remove(index))
    }

    // Fines

    /// Validate a fine form and resolve its student.
    fn parse_fine(&self, form: &FineForm) -> Result<(String, f64), HttpError> {
        let mut errors = required(form);
        let student_id = form.student_id.trim();
        let student_name = if student_id.is_empty() {
            None
        } else {
            let found = self
                .students
                .iter()
                .find(|s| s.student_id == student_id)
                .map(Student::full_name);
            if found.is_none() {
                errors.push("student_id", UNKNOWN_STUDENT);
            }
            found
        };
        let amount = parse_amount(&mut errors, &form.amount);
        match (student_name, amount) {
            (Some(name), Some(amount)) if errors.is_empty() => Ok((name, amount)),
            _ => Err(HttpError::Validation(errors)),
        }
    }

    /// Issue a new unpaid fine dated `issued_on`.
    pub fn create_fine(
        &mut self,
        form: &FineForm,
        issued_on: NaiveDate,
    ) -> Result<Fine, HttpError> {
        let (student_name, amount) = self.parse_fine(form)?;
        let fine = Fine {
            id: self.allocate_id(),
            student_id: form.student_id.trim().to_string(),
            student_name,
            violation: form.violation.trim().to_string(),
            amount,
            status: FineStatus::Unpaid,
            issued_on,
        };
        self.fines.push(fine.clone());
        Ok(fine)
    }

    /// Edit a fine's student, violation or amount; status and issue date stay.
    pub fn update_fine(&mut self, id: u64, form: &FineForm) -> Result<Fine, HttpError> {
        let index = position(&self.fines, id, |f| f.id, Resource::Fines)?;
        let (student_name, amount) = self.parse_fine(form)?;
        let fine = &mut self.fines[index];
        fine.student_id = form.student_id.trim().to_string();
        fine.student_name = student_name;
        fine.violation = form.violation.trim().to_string();
        fine.amount = amount;
        Ok(fine.clone())
    }

    pub fn delete_fine(&mut self, id: u64) -> Result<Fine, HttpError> {
        let index = position(&self.fines, id, |f| f.id, Resource::Fines)?;
        Ok(self.fines.remove(index))
    }

    /// # Errors
    /// Refuses with [`HttpError::Conflict`] when the fine is already paid.
    pub fn pay_fine(&mut self, id: u64) -> Result<Fine, HttpError> {
        let index = position(&self.fines, id, |f| f.id, Resource::Fines)?;
        let fine = &mut self.fines[index];
        if fine.status == FineStatus::Paid {
            return Err(HttpError::Conflict("Fine is already paid.".to_string()));
        }
        fine.status = FineStatus::Paid;
        Ok(fine.clone())
    }
}
