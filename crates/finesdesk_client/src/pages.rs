//! Role-scoped pages built from an explicit [`Session`].

use crate::api::{Backend, Mutation};
use crate::list_view::ListView;
use crate::mutation::{delete_record, run_mutation, MutationFlow};
use finesdesk_core::models::{
    AbsenceSummary, Admin, AdminForm, Event, EventForm, Fine, FineForm, Page, Secretary,
    SecretaryForm, Session, Student, StudentForm,
};
use finesdesk_core::{AppError, FormModel, InvalidationBus, Record};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Record types that have a create/update/delete page.
pub trait Managed: Record {
    type Form: FormModel + Serialize + DeserializeOwned + Send + 'static + for<'a> From<&'a Self>;
    const PAGE: Page;
}

impl Managed for Student {
    type Form = StudentForm;
    const PAGE: Page = Page::Students;
}

impl Managed for Admin {
    type Form = AdminForm;
    const PAGE: Page = Page::Admins;
}

impl Managed for Secretary {
    type Form = SecretaryForm;
    const PAGE: Page = Page::Secretaries;
}

impl Managed for Event {
    type Form = EventForm;
    const PAGE: Page = Page::Events;
}

impl Managed for Fine {
    type Form = FineForm;
    const PAGE: Page = Page::Fines;
}

/// List page with create and edit dialogs.
pub struct ManagePage<R: Managed, B: Backend> {
    pub list: ListView<R, B>,
    pub create: MutationFlow<R::Form, B>,
    pub edit: MutationFlow<R::Form, B>,
    backend: B,
    bus: InvalidationBus,
}

pub type StudentsPage<B> = ManagePage<Student, B>;
pub type AdminsPage<B> = ManagePage<Admin, B>;
pub type SecretariesPage<B> = ManagePage<Secretary, B>;
pub type EventsPage<B> = ManagePage<Event, B>;
pub type FinesPage<B> = ManagePage<Fine, B>;

impl<R: Managed, B: Backend> ManagePage<R, B> {
    /// Build the page for `session`.
    ///
    /// # Errors
    /// Returns [`AppError::Forbidden`] when the session role may not open it.
    pub fn open(session: &Session, backend: B, bus: &InvalidationBus) -> Result<Self, AppError> {
        session.require(R::PAGE)?;
        Ok(Self {
            list: ListView::new(backend.clone(), bus),
            create: MutationFlow::new(R::RESOURCE, backend.clone(), bus.clone()),
            edit: MutationFlow::new(R::RESOURCE, backend.clone(), bus.clone()),
            backend,
            bus: bus.clone(),
        })
    }

    /// Open the edit dialog for `record`.
    pub fn open_edit(&mut self, record: &R) {
        self.edit.open_update(record);
    }

    /// Delete `record`; the list refetches on its next [`ListView::sync`].
    ///
    /// # Errors
    /// Returns the backend error.
    pub async fn delete(&self, record: &R) -> Result<Option<String>, AppError> {
        delete_record(&self.backend, &self.bus, record).await
    }
}

impl<B: Backend> ManagePage<Fine, B> {
    /// Mark `fine` paid via `PATCH /api/fines/{id}/pay`.
    ///
    /// # Errors
    /// Returns the backend error.
    pub async fn pay(&self, fine: &Fine) -> Result<Option<String>, AppError> {
        let pay = Mutation::pay_fine(fine.record_id());
        let response = run_mutation(&self.backend, &self.bus, pay).await?;
        Ok(response.message)
    }
}

/// Read-only absence summaries.
pub struct AbsencesPage<B: Backend> {
    pub list: ListView<AbsenceSummary, B>,
}

impl<B: Backend> AbsencesPage<B> {
    /// # Errors
    /// Returns [`AppError::Forbidden`] for student sessions.
    pub fn open(session: &Session, backend: B, bus: &InvalidationBus) -> Result<Self, AppError> {
        session.require(Page::Absences)?;
        Ok(Self {
            list: ListView::new(backend, bus),
        })
    }
}

/// A student's own fines and absences.
pub struct MyRecordsPage<B: Backend> {
    pub fines: ListView<Fine, B>,
    pub absences: ListView<AbsenceSummary, B>,
}

impl<B: Backend> MyRecordsPage<B> {
    /// Build the page scoped to the session's student id.
    ///
    /// # Errors
    /// Returns [`AppError::Forbidden`] for non-student sessions or a student
    /// session without a student id.
    pub fn open(session: &Session, backend: B, bus: &InvalidationBus) -> Result<Self, AppError> {
        session.require(Page::MyRecords)?;
        let student_id = session.student_id().unwrap_or_default().to_string();
        let absence_owner = student_id.clone();
        Ok(Self {
            fines: ListView::new(backend.clone(), bus)
                .with_scope(move |fine: &Fine| fine.student_id == student_id),
            absences: ListView::new(backend, bus)
                .with_scope(move |row: &AbsenceSummary| row.student_id == absence_owner),
        })
    }

    /// Load both lists.
    ///
    /// # Errors
    /// Returns the first fetch error.
    pub async fn refresh(&mut self) -> Result<(), AppError> {
        self.fines.refresh().await?;
        self.absences.refresh().await?;
        Ok(())
    }
}
